#![deny(clippy::all)]

//! Online monitoring of [past-time temporal logic] formulas over streams of events.
//!
//! A runtime monitor watches a running system and reports, as each new event arrives, whether a
//! behavioral requirement still holds. Requirements that only look backwards in time, such as
//! _every file that is read must have been opened before_ or _the brake has been pressed within
//! the last 3 seconds whenever the speed dropped below 5_, can be checked with a constant amount
//! of work per event because the monitor only needs a summary of the past. `Pastel` compiles a
//! [`Formula`] into a network of small stateful operators, one per subformula, and updates the
//! network in dependency order each time an event is observed.
//!
//! Networks come in two flavors of time. Discrete networks count events, so a bound such as
//! `[0:3]` means _within the last 3 events_. Dense networks read a timestamp from every event and
//! report a value for the whole interval of time between consecutive events. Both flavors can
//! compute boolean verdicts, [robustness] values measuring how far the system is from a violation,
//! or sets of variable bindings for first-order formulas over data carrying events.
//!
//! [past-time temporal logic]: https://en.wikipedia.org/wiki/Linear_temporal_logic
//! [robustness]: https://link.springer.com/chapter/10.1007/11940197_12
//!
//! # Examples
//!
//! A formula is either built with the [`Formula`] constructors or, with the `parser` feature,
//! parsed from a string.
//!
//! ```rust
//! use pastel::formula::{Comparison, TimeBound};
//! use pastel::Formula;
//!
//! // {brake} since[0:3] {speed < 5}
//! let phi = Formula::prop("brake").since_within(
//!     TimeBound::new(0.0, 3.0),
//!     Formula::compare("speed", Comparison::Lt, 5.0),
//! );
//! ```
//!
//! Events are any type implementing [`Record`]. Maps from names to values and positional lists of
//! values are supported out of the box.
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use pastel::{DenseBooleanNetwork, Formula, IntervalSet, Interval, Options};
//!
//! let phi = Formula::prop("door").once();
//! let mut network = DenseBooleanNetwork::new(&phi, Options::default()).unwrap();
//!
//! network.update(&HashMap::from([("time", 0.0), ("door", 0.0)])).unwrap();
//! network.update(&HashMap::from([("time", 2.0), ("door", 1.0)])).unwrap();
//!
//! let holds = network.update(&HashMap::from([("time", 5.0), ("door", 0.0)])).unwrap();
//! assert_eq!(holds, IntervalSet::from_interval(Interval::left_open(2.0, 5.0)));
//! ```
//!
//! Formulas with free variables are evaluated by data networks, which report the bindings of the
//! variables that satisfy the formula.
//!
//! ```rust
//! # #[cfg(feature = "parser")]
//! # {
//! use pastel::{parse_formula, DiscreteDataNetwork, Options, Value};
//!
//! let phi = parse_formula("once [login, *user]").unwrap();
//! let mut network = DiscreteDataNetwork::new(&phi, Options::default()).unwrap();
//!
//! network.update(&vec![Value::from("login"), Value::from("alice")]).unwrap();
//! network.update(&vec![Value::from("logout"), Value::from("bob")]).unwrap();
//!
//! assert_eq!(network.bindings("user"), vec!["alice"]);
//! # }
//! ```

pub use pastel_core::{
    dense, discrete, domain, error, formula, interval_map, metrics, options, record, time, BindingManager, Boolean,
    Bottom, DenseBooleanNetwork, DenseDataNetwork, DenseRobustnessNetwork, DiscreteBooleanNetwork,
    DiscreteDataNetwork, DiscreteRobustnessNetwork, Domain, EvaluationError, Formula, FormulaError, Interpolation,
    Interval, IntervalMap, IntervalSet, Join, Meet, NodeId, Options, Record, Robustness, Set, Top, Value,
};

#[cfg(feature = "parser")]
pub use pastel_parser::{parse_formula, ParseError};
