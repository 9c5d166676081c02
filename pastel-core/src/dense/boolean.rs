use std::convert::Infallible;

use log::trace;

use crate::atom::Tests;
use crate::domain::{Boolean, Domain};
use crate::error::{EvaluationError, FormulaError};
use crate::formula::{Comparison, FieldTest, Formula};
use crate::interval_map::IntervalSet;
use crate::network::{self, connective, dense_bound, Arena, Connective, NodeId, Setting, Slot};
use crate::options::{Interpolation, Options};
use crate::record::Record;
use crate::time::{Endpoint, Interval};

use super::{horizon, tail_horizon, Clock};

/// Set of times at which a linearly interpolated comparison holds between two samples.
///
/// The line from `(t0, y0)` to `(t1, y1)` crosses the constant at most once. Off a flat segment,
/// equality holds only at the crossing point.
pub(crate) fn crossing(comparison: Comparison, constant: f64, (t0, y0): (f64, f64), (t1, y1): (f64, f64)) -> IntervalSet<f64> {
    let segment = Interval::left_open(t0, t1);

    if y0 == y1 || t1 <= t0 {
        return if comparison.holds(y1, constant) {
            IntervalSet::from_interval(segment)
        } else {
            IntervalSet::new()
        };
    }

    let time = t0 + (t1 - t0) * (constant - y0) / (y1 - y0);
    let rising = y1 > y0;

    let half = match (comparison, rising) {
        (Comparison::Gt, true) | (Comparison::Lt, false) => Interval::after(time),
        (Comparison::Ge, true) | (Comparison::Le, false) => Interval::starting_at(time),
        (Comparison::Lt, true) | (Comparison::Gt, false) => Interval::before(time),
        (Comparison::Le, true) | (Comparison::Ge, false) => Interval::up_to(time),
        (Comparison::Eq, _) | (Comparison::Ne, _) => Interval::closed(time, time),
    };

    let mut set = IntervalSet::from_interval(half);
    set.restrict(segment);

    if comparison == Comparison::Ne {
        IntervalSet::from_interval(segment).difference(&set)
    } else {
        set
    }
}

/// Record atom whose numeric comparisons are linearly interpolated.
#[derive(Debug, Clone)]
pub(crate) struct Linear {
    tests: Tests<bool>,
    samples: Vec<Option<(f64, f64)>>,
    shape: bool,
}

impl Linear {
    fn new(tests: Tests<bool>) -> Self {
        let samples = vec![None; tests.fields().len()];

        Self {
            tests,
            samples,
            shape: false,
        }
    }

    fn update<R: Record + ?Sized>(&mut self, record: &R, segment: Interval<f64>) -> Result<IntervalSet<f64>, EvaluationError> {
        let shape = self.tests.matches_shape(record);
        let previous_shape = std::mem::replace(&mut self.shape, shape);

        if !shape {
            return Ok(IntervalSet::new());
        }

        let now = segment.upper();
        let mut value = if previous_shape {
            IntervalSet::from_interval(segment)
        } else {
            IntervalSet::new()
        };

        for (field, sample) in self.tests.fields().iter().zip(self.samples.iter_mut()) {
            let part = match field.test {
                FieldTest::Compare(comparison, constant) => {
                    let datum = field
                        .lookup(record)
                        .ok_or_else(|| EvaluationError::missing(field.name()))?;

                    let y = datum
                        .as_float()
                        .ok_or_else(|| EvaluationError::mismatch(field.name(), "number", datum.kind()))?;

                    match sample.replace((now, y)) {
                        Some(last) => crossing(comparison, constant, last, (now, y)),
                        None => IntervalSet::new(),
                    }
                }
                _ if *field.held() => IntervalSet::from_interval(segment),
                _ => IntervalSet::new(),
            };

            value = value.intersection(&part);
        }

        self.tests.refresh(&mut Boolean, record)?;

        Ok(value)
    }
}

/// Stateful operator of a dense-time boolean network.
#[derive(Debug, Clone)]
pub(crate) enum Operator {
    Atom {
        tests: Tests<bool>,
        previous: bool,
        value: IntervalSet<f64>,
    },
    Linear {
        atom: Linear,
        value: IntervalSet<f64>,
    },
    Once {
        start: Option<Endpoint<f64>>,
        value: IntervalSet<f64>,
    },
    Historically {
        violation: Option<Endpoint<f64>>,
        value: IntervalSet<f64>,
    },
    Since {
        last: bool,
        value: IntervalSet<f64>,
    },
    OnceWithin {
        lower: f64,
        upper: Option<f64>,
        window: IntervalSet<f64>,
        value: IntervalSet<f64>,
    },
    HistoricallyWithin {
        lower: f64,
        upper: Option<f64>,
        violations: IntervalSet<f64>,
        value: IntervalSet<f64>,
    },
    SinceWithin {
        lower: f64,
        upper: Option<f64>,
        window: IntervalSet<f64>,
        value: IntervalSet<f64>,
    },
}

impl Operator {
    fn output(&self) -> &IntervalSet<f64> {
        match self {
            Self::Atom { value, .. }
            | Self::Linear { value, .. }
            | Self::Once { value, .. }
            | Self::Historically { value, .. }
            | Self::Since { value, .. }
            | Self::OnceWithin { value, .. }
            | Self::HistoricallyWithin { value, .. }
            | Self::SinceWithin { value, .. } => value,
        }
    }

    fn update<R>(&mut self, record: &R, inputs: &[IntervalSet<f64>], segment: Interval<f64>) -> Result<(), EvaluationError>
    where
        R: Record + ?Sized,
    {
        let past = Interval::up_to(segment.lower());

        match self {
            Self::Atom { tests, previous, value } => {
                *value = if *previous {
                    IntervalSet::from_interval(segment)
                } else {
                    IntervalSet::new()
                };

                *previous = tests.evaluate(&mut Boolean, record)?;
            }
            Self::Linear { atom, value } => {
                *value = atom.update(record, segment)?;
            }
            Self::Once { start, value } => {
                if start.is_none() {
                    *start = inputs[0].intervals().next().map(|interval| interval.start());
                }

                *value = match start {
                    Some(start) => {
                        let mut value = IntervalSet::from_interval(Interval::new(*start, Endpoint::Open(f64::INFINITY)));
                        value.restrict(segment);
                        value
                    }
                    None => IntervalSet::new(),
                };
            }
            Self::Historically { violation, value } => {
                if violation.is_none() {
                    *violation = inputs[0].complement(segment).intervals().next().map(|interval| interval.start());
                }

                *value = match violation {
                    Some(violation) => IntervalSet::from_interval(segment)
                        .difference(&IntervalSet::from_interval(Interval::new(*violation, Endpoint::Open(f64::INFINITY)))),
                    None => IntervalSet::from_interval(segment),
                };
            }
            Self::Since { last, value } => {
                let left = inputs[0].indicator(segment);
                let right = inputs[1].indicator(segment);

                value.clear();

                for (interval, &p, &q) in left.sweep(&right) {
                    if q || (p && *last) {
                        value.add_interval(interval);
                    }

                    // a witness where `p` fails only carries over from its closed right end
                    *last = match (p, q) {
                        (true, true) => true,
                        (false, true) => interval.end().is_closed(),
                        (true, false) => *last,
                        (false, false) => false,
                    };
                }
            }
            Self::OnceWithin {
                lower,
                upper,
                window,
                value,
            } => {
                for interval in inputs[0].intervals() {
                    window.add_interval(horizon(interval, *lower, *upper));
                }

                window.subtract(past);
                *value = window.restricted(segment);
            }
            Self::HistoricallyWithin {
                lower,
                upper,
                violations,
                value,
            } => {
                for interval in inputs[0].complement(segment).intervals() {
                    violations.add_interval(horizon(interval, *lower, *upper));
                }

                violations.subtract(past);
                *value = IntervalSet::from_interval(segment).difference(violations);
            }
            Self::SinceWithin {
                lower,
                upper,
                window,
                value,
            } => {
                let left = inputs[0].indicator(segment);
                let right = inputs[1].indicator(segment);

                window.subtract(past);

                for (interval, &p, &q) in left.sweep(&right) {
                    let before = Interval::new(Endpoint::Open(f64::NEG_INFINITY), start_as_end(interval.start()));

                    match (p, q) {
                        (true, true) => window.add_interval(horizon(interval, *lower, *upper)),
                        (false, true) => {
                            window.restrict(before);

                            if *lower == 0.0 {
                                window.add_interval(interval);
                            }

                            if interval.end().is_closed() {
                                window.add_interval(tail_horizon(interval, *lower, *upper));
                            }
                        }
                        (true, false) => (),
                        (false, false) => window.restrict(before),
                    }
                }

                *value = window.restricted(segment);
            }
        }

        Ok(())
    }
}

/// End endpoint keeping exactly the times before an interval starting at `endpoint`.
fn start_as_end(endpoint: Endpoint<f64>) -> Endpoint<f64> {
    match endpoint {
        Endpoint::Open(time) => Endpoint::Closed(time),
        Endpoint::Closed(time) => Endpoint::Open(time),
    }
}

type BooleanArena = Arena<Connective<Infallible>, Operator>;

struct Builder {
    interpolation: Interpolation,
}

impl Setting for Builder {
    type Node = Connective<Infallible>;
    type State = Operator;

    fn build(&mut self, formula: &Formula, _: &[NodeId]) -> Result<Slot<Self::Node, Self::State>, FormulaError> {
        let mut domain = Boolean;

        if let Some(connective) = connective(formula, |quantifier, variables| domain.projection(quantifier, variables))? {
            return Ok(Slot::Node(connective));
        }

        let empty = IntervalSet::new();

        let state = match formula {
            Formula::Atom(atom) => {
                let tests = Tests::new(&domain, atom)?;
                let linear = tests
                    .fields()
                    .iter()
                    .any(|field| matches!(field.test, FieldTest::Compare(..)));

                if self.interpolation == Interpolation::Linear && linear {
                    Operator::Linear {
                        atom: Linear::new(tests),
                        value: empty,
                    }
                } else {
                    Operator::Atom {
                        tests,
                        previous: false,
                        value: empty,
                    }
                }
            }
            Formula::Previous(_) => {
                return Err(FormulaError::unsupported("previous has no dense-time semantics"));
            }
            Formula::Once(None, _) => Operator::Once {
                start: None,
                value: empty,
            },
            Formula::Historically(None, _) => Operator::Historically {
                violation: None,
                value: empty,
            },
            Formula::Since(None, ..) => Operator::Since {
                last: false,
                value: empty,
            },
            Formula::Once(Some(bound), _) => {
                let (lower, upper) = dense_bound(bound)?;

                Operator::OnceWithin {
                    lower,
                    upper,
                    window: IntervalSet::new(),
                    value: empty,
                }
            }
            Formula::Historically(Some(bound), _) => {
                let (lower, upper) = dense_bound(bound)?;

                Operator::HistoricallyWithin {
                    lower,
                    upper,
                    violations: IntervalSet::new(),
                    value: empty,
                }
            }
            Formula::Since(Some(bound), ..) => {
                let (lower, upper) = dense_bound(bound)?;

                Operator::SinceWithin {
                    lower,
                    upper,
                    window: IntervalSet::new(),
                    value: empty,
                }
            }
            other => return Err(FormulaError::malformed(format!("unexpected {}", other.kind()))),
        };

        Ok(Slot::State(state))
    }
}

fn value(arena: &BooleanArena, id: NodeId, segment: Interval<f64>) -> IntervalSet<f64> {
    let entry = arena.entry(id);

    match &entry.slot {
        Slot::State(state) => state.output().clone(),
        Slot::Node(connective) => {
            let mut args = entry.children.iter().map(|&child| value(arena, child, segment));
            let mut next = || args.next().unwrap_or_default();

            match connective {
                Connective::Not => next().complement(segment),
                Connective::And => next().intersection(&next()),
                Connective::Or => next().union(&next()),
                Connective::Implies => next().complement(segment).union(&next()),
                Connective::Project(projection) => match *projection {},
            }
        }
    }
}

/// Dense-time network with boolean semantics.
///
/// After every event the network reports the set of times in `(previous, now]` at which the
/// formula holds.
#[derive(Debug, Clone)]
pub struct DenseBooleanNetwork {
    arena: BooleanArena,
    root: NodeId,
    states: Vec<NodeId>,
    clock: Clock,
    output: IntervalSet<f64>,
}

impl DenseBooleanNetwork {
    pub fn new(formula: &Formula, options: Options) -> Result<Self, FormulaError> {
        let clock = Clock::new(&options)?;
        let mut builder = Builder {
            interpolation: options.interpolation(),
        };

        let (arena, root, states) = network::build(&mut builder, formula)?;

        Ok(Self {
            arena,
            root,
            states,
            clock,
            output: IntervalSet::new(),
        })
    }

    /// Evaluate an event, reading its timestamp from the configured time field.
    pub fn update<R>(&mut self, record: &R) -> Result<IntervalSet<f64>, EvaluationError>
    where
        R: Record + ?Sized,
    {
        let time = self.clock.read(record)?;
        self.update_at(time, record)
    }

    /// Evaluate an event observed at `time`.
    pub fn update_at<R>(&mut self, time: f64, record: &R) -> Result<IntervalSet<f64>, EvaluationError>
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
                .map(|&child| value(&self.arena, child, segment))
                .collect::<Vec<_>>();

            if let Some(state) = self.arena.state_mut(id) {
                state.update(record, &inputs, segment)?;
            }
        }

        self.output = value(&self.arena, self.root, segment);
        trace!("output({}) = {}", segment, self.output);

        Ok(self.output.clone())
    }

    /// Output for the last event.
    pub fn output(&self) -> &IntervalSet<f64> {
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
}
