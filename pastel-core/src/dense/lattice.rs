use log::trace;
use pastel_bdd::BindingManager;

use crate::atom::Tests;
use crate::domain::{Domain, Robustness, Set};
use crate::error::{EvaluationError, FormulaError};
use crate::formula::Formula;
use crate::interval_map::{IntervalMap, IntervalSet, Opaque};
use crate::network::{self, connective, dense_bound, Arena, Connective, NodeId, Setting, Slot};
use crate::options::{Interpolation, Options};
use crate::record::Record;
use crate::time::{Endpoint, Interval};

use super::{horizon, tail_horizon, Clock};

type Signal<V> = IntervalMap<f64, V>;

/// Window of a bounded operator, covering every time after the previous event.
#[derive(Debug, Clone)]
pub(crate) struct Window<V> {
    lower: f64,
    upper: Option<f64>,
    map: Signal<V>,
}

impl<V: Clone + PartialEq> Window<V> {
    fn new(lower: f64, upper: Option<f64>, initial: V) -> Self {
        Self {
            lower,
            upper,
            map: IntervalMap::singleton(Interval::unbounded(), initial),
        }
    }

    fn output(&mut self, segment: Interval<f64>) -> Signal<V> {
        self.map.subtract(Interval::up_to(segment.lower()));
        self.map.restricted(segment)
    }
}

/// Stateful operator of a dense-time network over a lattice domain.
#[derive(Debug, Clone)]
pub(crate) enum Operator<V> {
    Atom { tests: Tests<V>, previous: V, value: Signal<V> },
    Once { last: V, value: Signal<V> },
    Historically { last: V, value: Signal<V> },
    Since { last: V, value: Signal<V> },
    OnceWithin { window: Window<V>, value: Signal<V> },
    HistoricallyWithin { window: Window<V>, value: Signal<V> },
    SinceWithin { window: Window<V>, value: Signal<V> },
}

impl<V: Clone + PartialEq> Operator<V> {
    fn output(&self) -> &Signal<V> {
        match self {
            Self::Atom { value, .. }
            | Self::Once { value, .. }
            | Self::Historically { value, .. }
            | Self::Since { value, .. }
            | Self::OnceWithin { value, .. }
            | Self::HistoricallyWithin { value, .. }
            | Self::SinceWithin { value, .. } => value,
        }
    }

    fn update<D, R>(&mut self, domain: &mut D, record: &R, inputs: &[Signal<V>], segment: Interval<f64>) -> Result<(), EvaluationError>
    where
        D: Domain<Value = V>,
        R: Record + ?Sized,
    {
        match self {
            Self::Atom { tests, previous, value } => {
                *value = IntervalMap::singleton(segment, previous.clone());
                *previous = tests.evaluate(domain, record)?;
            }
            Self::Once { last, value } => {
                value.clear();

                for (interval, input) in inputs[0].iter() {
                    *last = domain.join(last, input);
                    value.insert(interval, last.clone());
                }
            }
            Self::Historically { last, value } => {
                value.clear();

                for (interval, input) in inputs[0].iter() {
                    *last = domain.meet(last, input);
                    value.insert(interval, last.clone());
                }
            }
            Self::Since { last, value } => {
                value.clear();

                for (interval, p, q) in inputs[0].sweep(&inputs[1]) {
                    let kept = domain.meet(last, p);
                    *last = domain.join(q, &kept);
                    value.insert(interval, last.clone());
                }
            }
            Self::OnceWithin { window, value } => {
                for (interval, input) in inputs[0].iter() {
                    let reach = horizon(interval, window.lower, window.upper);
                    window.map.add_with(reach, input.clone(), |a, b| domain.join(a, b));
                }

                *value = window.output(segment);
            }
            Self::HistoricallyWithin { window, value } => {
                for (interval, input) in inputs[0].iter() {
                    let reach = horizon(interval, window.lower, window.upper);
                    window.map.add_with(reach, input.clone(), |a, b| domain.meet(a, b));
                }

                *value = window.output(segment);
            }
            Self::SinceWithin { window, value } => {
                let (lower, upper) = (window.lower, window.upper);

                for (interval, p, q) in inputs[0].sweep(&inputs[1]) {
                    let ahead = Interval::new(interval.start(), Endpoint::Open(f64::INFINITY));
                    window.map.add_with(ahead, p.clone(), |a, b| domain.meet(a, b));

                    let both = domain.meet(p, q);
                    window.map.add_with(horizon(interval, lower, upper), both, |a, b| domain.join(a, b));

                    if lower == 0.0 {
                        window.map.add_with(interval, q.clone(), |a, b| domain.join(a, b));
                    }

                    if interval.end().is_closed() {
                        let tail = tail_horizon(interval, lower, upper);
                        window.map.add_with(tail, q.clone(), |a, b| domain.join(a, b));
                    }
                }

                *value = window.output(segment);
            }
        }

        Ok(())
    }
}

type LatticeArena<D> = Arena<Connective<<D as Domain>::Projection>, Operator<<D as Domain>::Value>>;

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
            Formula::Atom(atom) => Operator::Atom {
                tests: Tests::new(&*domain, atom)?,
                previous: domain.bottom(),
                value: Signal::new(),
            },
            Formula::Previous(_) => {
                return Err(FormulaError::unsupported("previous has no dense-time semantics"));
            }
            Formula::Once(None, _) => Operator::Once {
                last: domain.bottom(),
                value: Signal::new(),
            },
            Formula::Historically(None, _) => Operator::Historically {
                last: domain.top(),
                value: Signal::new(),
            },
            Formula::Since(None, ..) => Operator::Since {
                last: domain.bottom(),
                value: Signal::new(),
            },
            Formula::Once(Some(bound), _) => {
                let (lower, upper) = dense_bound(bound)?;

                Operator::OnceWithin {
                    window: Window::new(lower, upper, domain.bottom()),
                    value: Signal::new(),
                }
            }
            Formula::Historically(Some(bound), _) => {
                let (lower, upper) = dense_bound(bound)?;

                Operator::HistoricallyWithin {
                    window: Window::new(lower, upper, domain.top()),
                    value: Signal::new(),
                }
            }
            Formula::Since(Some(bound), ..) => {
                let (lower, upper) = dense_bound(bound)?;

                Operator::SinceWithin {
                    window: Window::new(lower, upper, domain.bottom()),
                    value: Signal::new(),
                }
            }
            other => return Err(FormulaError::malformed(format!("unexpected {}", other.kind()))),
        };

        Ok(Slot::State(state))
    }
}

fn value<D: Domain>(arena: &LatticeArena<D>, domain: &mut D, id: NodeId) -> Signal<D::Value> {
    let entry = arena.entry(id);

    match &entry.slot {
        Slot::State(state) => state.output().clone(),
        Slot::Node(connective) => match entry.children.as_slice() {
            &[child] => value(arena, domain, child)
                .map_values::<D::Value, Opaque, _>(|input| connective.apply(domain, std::slice::from_ref(input))),
            &[left, right] => {
                let left = value(arena, domain, left);
                let right = value(arena, domain, right);

                left.sweep(&right)
                    .map(|(interval, a, b)| (interval, connective.apply(domain, &[a.clone(), b.clone()])))
                    .collect()
            }
            _ => Signal::new(),
        },
    }
}

/// Dense-time network over the value domain `D`.
///
/// After every event the network reports a signal covering `(previous, now]`.
pub struct Network<D: Domain> {
    domain: D,
    arena: LatticeArena<D>,
    root: NodeId,
    states: Vec<NodeId>,
    clock: Clock,
    output: Signal<D::Value>,
}

/// Dense-time network with robustness semantics.
pub type DenseRobustnessNetwork = Network<Robustness>;

/// Dense-time network computing sets of variable bindings.
pub type DenseDataNetwork = Network<BindingManager>;

impl<D: Domain> Network<D> {
    pub fn new(formula: &Formula, options: Options) -> Result<Self, FormulaError> {
        Self::with_domain(D::from_options(&options), formula, options)
    }

    /// Build a network evaluating `formula` in `domain`.
    pub fn with_domain(mut domain: D, formula: &Formula, options: Options) -> Result<Self, FormulaError> {
        if options.interpolation() == Interpolation::Linear {
            return Err(FormulaError::unsupported(format!(
                "linear interpolation is not available in the {} setting",
                D::NAME
            )));
        }

        let clock = Clock::new(&options)?;
        let (arena, root, states) = network::build(&mut Builder { domain: &mut domain }, formula)?;

        Ok(Self {
            domain,
            arena,
            root,
            states,
            clock,
            output: Signal::new(),
        })
    }

    /// Evaluate an event, reading its timestamp from the configured time field.
    pub fn update<R>(&mut self, record: &R) -> Result<Signal<D::Value>, EvaluationError>
    where
        R: Record + ?Sized,
    {
        let time = self.clock.read(record)?;
        self.update_at(time, record)
    }

    /// Evaluate an event observed at `time`.
    pub fn update_at<R>(&mut self, time: f64, record: &R) -> Result<Signal<D::Value>, EvaluationError>
    where
        R: Record + ?Sized,
    {
        self.clock.advance(time)?;

        let segment = self.clock.segment();

        for &id in &self.states {
            let inputs = self
                .arena
                .entry(id)
                .children
                .iter()
                .map(|&child| value(&self.arena, &mut self.domain, child))
                .collect::<Vec<_>>();

            if let Some(state) = self.arena.state_mut(id) {
                state.update(&mut self.domain, record, &inputs, segment)?;
            }
        }

        self.output = value(&self.arena, &mut self.domain, self.root);
        trace!("output({} {}) = {}", D::NAME, segment, self.output);

        Ok(self.output.clone())
    }

    /// Output for the last event.
    pub fn output(&self) -> &Signal<D::Value> {
        &self.output
    }

    /// Timestamp of the last event.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn previous(&self) -> f64 {
        self.clock.previous()
    }

    /// Stateful operators in the order in which they are updated.
    pub fn states(&self) -> &[NodeId] {
        &self.states
    }

    pub fn kind(&self, id: NodeId) -> Option<&'static str> {
        self.arena.kind(id)
    }

    pub fn domain(&self) -> &D {
        &self.domain
    }
}

impl Network<BindingManager> {
    /// Times of the last segment at which some binding satisfies the formula.
    pub fn holds(&self) -> IntervalSet<f64> {
        let zero = self.domain.zero();

        self.output
            .iter()
            .filter(|(_, set)| **set != zero)
            .map(|(interval, _)| interval)
            .collect()
    }

    /// Values of `variable` appearing in a satisfying binding at some time of the last segment.
    pub fn bindings(&mut self, variable: &str) -> Vec<String> {
        let mut union: Set = self.domain.zero();

        for (_, set) in self.output.iter() {
            union = self.domain.or(union, *set);
        }

        self.domain.values(union, variable)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use approx::assert_relative_eq;
    use test_log::test;

    use super::*;
    use crate::formula::{Comparison, FieldTest, TimeBound};
    use crate::record::Value;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn collect<D: Domain>(network: &mut Network<D>, events: &[(f64, f64)]) -> Result<Signal<D::Value>, EvaluationError> {
        let mut result = Signal::new();

        for &(time, x) in events {
            for (interval, value) in network.update(&HashMap::from([("time", time), ("x", x)]))?.iter() {
                result.insert(interval, value.clone());
            }
        }

        Ok(result)
    }

    #[test]
    fn atoms_hold_the_previous_sample() -> TestResult {
        let mut network = DenseRobustnessNetwork::new(&Formula::prop("x"), Options::default())?;
        let result = collect(&mut network, &[(0.0, 2.0), (1.0, -1.0), (3.0, 5.0)])?;

        let expected = [(Interval::left_open(0.0, 1.0), 2.0), (Interval::left_open(1.0, 3.0), -1.0)]
            .into_iter()
            .collect::<Signal<f64>>();

        assert_eq!(result, expected);

        Ok(())
    }

    #[test]
    fn bounded_once_robustness() -> TestResult {
        let phi = Formula::prop("x").once_within(TimeBound::new(1.0, 2.0));
        let mut network = DenseRobustnessNetwork::new(&phi, Options::default())?;
        let result = collect(&mut network, &[(0.0, 3.0), (1.0, -1.0), (5.0, 0.0)])?;

        assert_eq!(result.value_at(0.5), Some(&f64::NEG_INFINITY));
        assert_eq!(result.value_at(2.0), Some(&3.0));
        assert_eq!(result.value_at(3.0), Some(&3.0));
        assert_eq!(result.value_at(4.0), Some(&-1.0));
        assert_eq!(result.value_at(5.0), Some(&-1.0));

        Ok(())
    }

    #[test]
    fn unbounded_since_robustness() -> TestResult {
        let p = Formula::compare("x", Comparison::Gt, 0.0);
        let q = Formula::compare("x", Comparison::Gt, 4.0);
        let mut network = DenseRobustnessNetwork::new(&p.since(q), Options::default())?;
        let result = collect(&mut network, &[(0.0, 6.0), (1.0, 3.0), (2.0, -1.0), (3.0, 0.0)])?;

        assert_relative_eq!(*result.value_at(0.5).ok_or("uncovered")?, 2.0);
        assert_relative_eq!(*result.value_at(1.5).ok_or("uncovered")?, 2.0);
        assert_relative_eq!(*result.value_at(2.5).ok_or("uncovered")?, -1.0);

        Ok(())
    }

    #[test]
    fn bounded_since_robustness() -> TestResult {
        let p = Formula::compare("x", Comparison::Gt, 0.0);
        let q = Formula::compare("x", Comparison::Gt, 4.0);
        let phi = p.since_within(TimeBound::new(0.0, 1.0), q);
        let mut network = DenseRobustnessNetwork::new(&phi, Options::default())?;
        let result = collect(&mut network, &[(0.0, 6.0), (1.0, 3.0), (4.0, 3.0)])?;

        assert_relative_eq!(*result.value_at(0.5).ok_or("uncovered")?, 2.0);
        assert_relative_eq!(*result.value_at(1.5).ok_or("uncovered")?, 2.0);
        assert_relative_eq!(*result.value_at(2.0).ok_or("uncovered")?, 2.0);
        assert_relative_eq!(*result.value_at(3.0).ok_or("uncovered")?, -1.0);

        Ok(())
    }

    #[test]
    fn rejects_linear_interpolation() {
        let options = Options::default().with_interpolation(Interpolation::Linear);
        let result = DenseRobustnessNetwork::new(&Formula::prop("x"), options);

        assert!(result.is_err_and(|err| err.is_unsupported()));
    }

    #[test]
    fn rejects_previous() {
        let phi = Formula::prop("x").previous();
        assert!(DenseRobustnessNetwork::new(&phi, Options::default()).is_err_and(|err| err.is_unsupported()));
    }

    #[test]
    fn data_bindings_over_time() -> TestResult {
        let phi = Formula::record([("user", FieldTest::Bind("u".into())), ("action", FieldTest::String("login".into()))])
            .once_within(TimeBound::at_most(5.0));

        let mut network = DenseDataNetwork::new(&phi, Options::default())?;
        let event = |time: f64, user: &str, action: &str| {
            HashMap::from([
                ("time", Value::from(time)),
                ("user", Value::from(user)),
                ("action", Value::from(action)),
            ])
        };

        network.update(&event(0.0, "alice", "login"))?;
        network.update(&event(2.0, "bob", "logout"))?;

        assert_eq!(network.holds(), IntervalSet::from_interval(Interval::left_open(0.0, 2.0)));
        assert_eq!(network.bindings("u"), vec!["alice"]);

        network.update(&event(10.0, "bob", "logout"))?;

        assert_eq!(network.holds(), IntervalSet::from_interval(Interval::left_open(2.0, 7.0)));
        assert!(network.output().value_at(8.0).is_some());

        Ok(())
    }
}
