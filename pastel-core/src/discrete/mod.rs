//! Discrete-time monitors.
//!
//! In discrete time every event is one step. A network produces a single value per step, and
//! the bounds of temporal operators count steps rather than time units. Three networks are
//! provided, one per value domain:
//!
//! | network                       | output per event |
//! | ----------------------------- | ---------------- |
//! | [`DiscreteBooleanNetwork`]    | `bool`           |
//! | [`DiscreteRobustnessNetwork`] | `f64`            |
//! | [`DiscreteDataNetwork`]       | [`Set`]          |
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use pastel_core::discrete::DiscreteBooleanNetwork;
//! use pastel_core::formula::Formula;
//! use pastel_core::options::Options;
//!
//! // p since q
//! let phi = Formula::prop("p").since(Formula::prop("q"));
//! let mut network = DiscreteBooleanNetwork::new(&phi, Options::default()).unwrap();
//!
//! assert!(!network.update(&HashMap::from([("p", true), ("q", false)])).unwrap());
//! assert!(network.update(&HashMap::from([("p", false), ("q", true)])).unwrap());
//! assert!(network.update(&HashMap::from([("p", true), ("q", false)])).unwrap());
//! assert!(!network.update(&HashMap::from([("p", false), ("q", false)])).unwrap());
//! ```

mod operator;

use log::trace;
use pastel_bdd::BindingManager;

use crate::atom::Tests;
use crate::domain::{Boolean, Domain, Robustness, Set};
use crate::error::{EvaluationError, FormulaError};
use crate::formula::Formula;
use crate::network::{self, connective, discrete_bound, Arena, Connective, NodeId, Setting, Slot};
use crate::options::Options;
use crate::record::Record;

use operator::Operator;

type DiscreteArena<D> = Arena<Connective<<D as Domain>::Projection>, Operator<<D as Domain>::Value>>;

struct Builder<'a, D> {
    domain: &'a mut D,
}

impl<'a, D: Domain> Setting for Builder<'a, D> {
    type Node = Connective<D::Projection>;
    type State = Operator<D::Value>;

    fn build(&mut self, formula: &Formula, _: &[NodeId]) -> Result<Slot<Self::Node, Self::State>, FormulaError> {
        let domain = &mut *self.domain;

        if let Some(connective) = connective(formula, |quantifier, variables| domain.projection(quantifier, variables))? {
            return Ok(Slot::Node(connective));
        }

        let state = match formula {
            Formula::Atom(atom) => Operator::atom(&*domain, Tests::new(&*domain, atom)?),
            Formula::Previous(_) => Operator::previous(&*domain),
            Formula::Once(None, _) => Operator::Once(domain.bottom()),
            Formula::Historically(None, _) => Operator::Historically(domain.top()),
            Formula::Since(None, ..) => Operator::Since(domain.bottom()),
            Formula::Once(Some(bound), _) => {
                let (lower, upper) = discrete_bound(bound)?;
                Operator::once_within(lower, upper, domain.bottom())
            }
            Formula::Historically(Some(bound), _) => {
                let (lower, upper) = discrete_bound(bound)?;
                Operator::historically_within(lower, upper, domain.top())
            }
            Formula::Since(Some(bound), ..) => {
                let (lower, upper) = discrete_bound(bound)?;
                Operator::since_within(lower, upper, domain.bottom())
            }
            other => return Err(FormulaError::malformed(format!("unexpected {}", other.kind()))),
        };

        Ok(Slot::State(state))
    }
}

fn value<D: Domain>(arena: &DiscreteArena<D>, domain: &mut D, id: NodeId) -> D::Value {
    let entry = arena.entry(id);

    match &entry.slot {
        Slot::State(state) => state.output().clone(),
        Slot::Node(connective) => {
            let args = entry
                .children
                .iter()
                .map(|&child| value(arena, domain, child))
                .collect::<Vec<_>>();

            connective.apply(domain, &args)
        }
    }
}

/// Discrete-time network over the value domain `D`.
pub struct Network<D: Domain> {
    domain: D,
    arena: DiscreteArena<D>,
    root: NodeId,
    states: Vec<NodeId>,
    now: i64,
    output: D::Value,
}

/// Discrete-time network with boolean semantics.
pub type DiscreteBooleanNetwork = Network<Boolean>;

/// Discrete-time network with robustness semantics.
pub type DiscreteRobustnessNetwork = Network<Robustness>;

/// Discrete-time network computing sets of variable bindings.
pub type DiscreteDataNetwork = Network<BindingManager>;

impl<D: Domain> Network<D> {
    pub fn new(formula: &Formula, options: Options) -> Result<Self, FormulaError> {
        Self::with_domain(D::from_options(&options), formula)
    }

    /// Build a network evaluating `formula` in `domain`.
    pub fn with_domain(mut domain: D, formula: &Formula) -> Result<Self, FormulaError> {
        let (arena, root, states) = network::build(&mut Builder { domain: &mut domain }, formula)?;
        let output = domain.bottom();

        Ok(Self {
            domain,
            arena,
            root,
            states,
            now: -1,
            output,
        })
    }

    /// Evaluate the next event, returning the output of the formula for it.
    pub fn update<R>(&mut self, record: &R) -> Result<D::Value, EvaluationError>
    where
        R: Record + ?Sized,
    {
        self.now += 1;
        trace!("update({} step = {})", D::NAME, self.now);

        for &id in &self.states {
            let inputs = self
                .arena
                .entry(id)
                .children
                .iter()
                .map(|&child| value(&self.arena, &mut self.domain, child))
                .collect::<Vec<_>>();

            if let Some(state) = self.arena.state_mut(id) {
                state.update(&mut self.domain, record, &inputs, self.now)?;
            }
        }

        self.output = value(&self.arena, &mut self.domain, self.root);
        Ok(self.output.clone())
    }

    /// Output for the last event, or the bottom of the domain before the first event.
    pub fn output(&self) -> &D::Value {
        &self.output
    }

    /// Index of the last evaluated event, `-1` before the first event.
    pub fn now(&self) -> i64 {
        self.now
    }

    /// Stateful operators in the order in which they are updated.
    pub fn states(&self) -> &[NodeId] {
        &self.states
    }

    /// Operator name of an entry of the network.
    pub fn kind(&self, id: NodeId) -> Option<&'static str> {
        self.arena.kind(id)
    }

    pub fn domain(&self) -> &D {
        &self.domain
    }
}

impl Network<BindingManager> {
    /// Whether some binding of the variables satisfies the formula at the last event.
    pub fn holds(&self) -> bool {
        self.output != self.domain.zero()
    }

    /// Values of `variable` appearing in the satisfying bindings of the last event.
    pub fn bindings(&mut self, variable: &str) -> Vec<String> {
        let output: Set = self.output;
        self.domain.values(output, variable)
    }
}
