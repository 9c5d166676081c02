//! Incremental evaluation of past-time temporal logic.
//!
//! A monitored [`Formula`] is compiled once into a network of operators which is then fed one
//! event at a time. Each event is any type implementing [`Record`], and every update returns the
//! value of the formula for the time covered by that event. Networks exist for two notions of
//! time and three value domains:
//!
//! | time     | boolean                           | robustness                            | data                            |
//! | -------- | --------------------------------- | ------------------------------------- | ------------------------------- |
//! | discrete | [`DiscreteBooleanNetwork`]        | [`DiscreteRobustnessNetwork`]         | [`DiscreteDataNetwork`]         |
//! | dense    | [`DenseBooleanNetwork`]           | [`DenseRobustnessNetwork`]            | [`DenseDataNetwork`]            |
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use pastel_core::{DiscreteRobustnessNetwork, Formula, Options};
//! use pastel_core::formula::{Comparison, TimeBound};
//!
//! // once[0:1] {speed > 10}
//! let phi = Formula::compare("speed", Comparison::Gt, 10.0).once_within(TimeBound::new(0.0, 1.0));
//! let mut network = DiscreteRobustnessNetwork::new(&phi, Options::default()).unwrap();
//!
//! assert_eq!(network.update(&HashMap::from([("speed", 12.0)])).unwrap(), 2.0);
//! assert_eq!(network.update(&HashMap::from([("speed", 4.0)])).unwrap(), 2.0);
//! assert_eq!(network.update(&HashMap::from([("speed", 7.0)])).unwrap(), -3.0);
//! ```

mod atom;
mod network;

pub mod dense;
pub mod discrete;
pub mod domain;
pub mod error;
pub mod formula;
pub mod interval_map;
pub mod metrics;
pub mod options;
pub mod record;
pub mod time;

pub use crate::dense::{DenseBooleanNetwork, DenseDataNetwork, DenseRobustnessNetwork};
pub use crate::discrete::{DiscreteBooleanNetwork, DiscreteDataNetwork, DiscreteRobustnessNetwork};
pub use crate::domain::{Boolean, Domain, Robustness, Set};
pub use crate::error::{EvaluationError, FormulaError};
pub use crate::formula::Formula;
pub use crate::interval_map::{IntervalMap, IntervalSet};
pub use crate::metrics::{Bottom, Join, Meet, Top};
pub use crate::network::NodeId;
pub use crate::options::{Interpolation, Options};
pub use crate::record::{Record, Value};
pub use crate::time::Interval;

pub use pastel_bdd::BindingManager;
