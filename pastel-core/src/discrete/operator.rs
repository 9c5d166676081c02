use crate::atom::Tests;
use crate::domain::Domain;
use crate::error::EvaluationError;
use crate::interval_map::IntervalMap;
use crate::record::Record;
use crate::time::{Interval, Time};

/// Values of a bounded operator keyed by the step at which they become the output.
///
/// The map always covers every step from the current one onwards. Each step the operator
/// merges the contribution of the current event into the steps `[now + lower, now + upper]`
/// and forgets every step before `now`.
#[derive(Debug, Clone)]
pub(crate) struct Window<V> {
    lower: i64,
    upper: Option<i64>,
    map: IntervalMap<i64, V>,
    value: V,
}

impl<V: Clone + PartialEq> Window<V> {
    fn new(lower: i64, upper: Option<i64>, initial: V) -> Self {
        Self {
            lower,
            upper,
            map: IntervalMap::singleton(Interval::unbounded(), initial.clone()),
            value: initial,
        }
    }

    fn horizon(&self, now: i64) -> Interval<i64> {
        let start = now.shift(self.lower);

        match self.upper {
            Some(upper) => Interval::closed(start, now.shift(upper)),
            None => Interval::starting_at(start),
        }
    }

    fn settle(&mut self, now: i64) {
        self.map.subtract(Interval::before(now));

        if let Some(value) = self.map.value_at(now) {
            self.value = value.clone();
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }
}

/// Stateful operator of a discrete-time network.
#[derive(Debug, Clone)]
pub(crate) enum Operator<V> {
    Atom { tests: Tests<V>, value: V },
    Previous { last: V, value: V },
    Once(V),
    Historically(V),
    Since(V),
    OnceWithin(Window<V>),
    HistoricallyWithin(Window<V>),
    SinceWithin(Window<V>),
}

impl<V: Clone + PartialEq> Operator<V> {
    pub(crate) fn atom<D: Domain<Value = V>>(domain: &D, tests: Tests<V>) -> Self {
        Self::Atom {
            tests,
            value: domain.bottom(),
        }
    }

    pub(crate) fn previous<D: Domain<Value = V>>(domain: &D) -> Self {
        Self::Previous {
            last: domain.bottom(),
            value: domain.bottom(),
        }
    }

    pub(crate) fn once_within(lower: i64, upper: Option<i64>, bottom: V) -> Self {
        Self::OnceWithin(Window::new(lower, upper, bottom))
    }

    pub(crate) fn historically_within(lower: i64, upper: Option<i64>, top: V) -> Self {
        Self::HistoricallyWithin(Window::new(lower, upper, top))
    }

    pub(crate) fn since_within(lower: i64, upper: Option<i64>, bottom: V) -> Self {
        Self::SinceWithin(Window::new(lower, upper, bottom))
    }

    pub(crate) fn output(&self) -> &V {
        match self {
            Self::Atom { value, .. } | Self::Previous { value, .. } => value,
            Self::Once(value) | Self::Historically(value) | Self::Since(value) => value,
            Self::OnceWithin(window) | Self::HistoricallyWithin(window) | Self::SinceWithin(window) => &window.value,
        }
    }

    /// Advance the operator to step `now`, given the current values of its children.
    pub(crate) fn update<D, R>(&mut self, domain: &mut D, record: &R, inputs: &[V], now: i64) -> Result<(), EvaluationError>
    where
        D: Domain<Value = V>,
        R: Record + ?Sized,
    {
        match self {
            Self::Atom { tests, value } => {
                *value = tests.evaluate(domain, record)?;
            }
            Self::Previous { last, value } => {
                *value = std::mem::replace(last, inputs[0].clone());
            }
            Self::Once(value) => {
                *value = domain.join(value, &inputs[0]);
            }
            Self::Historically(value) => {
                *value = domain.meet(value, &inputs[0]);
            }
            Self::Since(value) => {
                let kept = domain.meet(value, &inputs[0]);
                *value = domain.join(&inputs[1], &kept);
            }
            Self::OnceWithin(window) => {
                let horizon = window.horizon(now);
                window.map.add_with(horizon, inputs[0].clone(), |a, b| domain.join(a, b));
                window.settle(now);
            }
            Self::HistoricallyWithin(window) => {
                let horizon = window.horizon(now);
                window.map.add_with(horizon, inputs[0].clone(), |a, b| domain.meet(a, b));
                window.settle(now);
            }
            Self::SinceWithin(window) => {
                let horizon = window.horizon(now);
                window.map.add_with(Interval::starting_at(now), inputs[0].clone(), |a, b| domain.meet(a, b));
                window.map.add_with(horizon, inputs[1].clone(), |a, b| domain.join(a, b));
                window.settle(now);
            }
        }

        Ok(())
    }
}
