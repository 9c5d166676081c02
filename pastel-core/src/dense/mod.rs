//! Dense-time monitors.
//!
//! In dense time every event carries a timestamp, and the output of a network after an event is
//! a signal covering the time elapsed since the previous event, `(previous, now]`. Between two
//! events the fields of the earlier event are held, so the value reported for `(previous, now]`
//! is the one observed at `previous`. Under [`Interpolation::Linear`](crate::options::Interpolation)
//! numeric comparisons of the boolean network instead follow the straight line between the two
//! samples, which can change the verdict in the middle of the segment.
//!
//! | network                    | output per event                       |
//! | -------------------------- | -------------------------------------- |
//! | [`DenseBooleanNetwork`]    | [`IntervalSet<f64>`](crate::interval_map::IntervalSet) |
//! | [`DenseRobustnessNetwork`] | [`IntervalMap<f64, f64>`](crate::interval_map::IntervalMap) |
//! | [`DenseDataNetwork`]       | [`IntervalMap<f64, Set>`](crate::interval_map::IntervalMap) |
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use pastel_core::dense::DenseBooleanNetwork;
//! use pastel_core::formula::{Formula, TimeBound};
//! use pastel_core::options::Options;
//! use pastel_core::time::Interval;
//!
//! // once[0:2] p
//! let phi = Formula::prop("p").once_within(TimeBound::new(0.0, 2.0));
//! let mut network = DenseBooleanNetwork::new(&phi, Options::default()).unwrap();
//!
//! network.update(&HashMap::from([("time", 0.0), ("p", 1.0)])).unwrap();
//! let output = network.update(&HashMap::from([("time", 1.0), ("p", 0.0)])).unwrap();
//! assert!(output.contains(1.0));
//!
//! let output = network.update(&HashMap::from([("time", 5.0), ("p", 0.0)])).unwrap();
//! assert_eq!(output.intervals().collect::<Vec<_>>(), vec![Interval::left_open(1.0, 3.0)]);
//! ```

mod boolean;
mod lattice;

use log::trace;
use ordered_float::NotNan;

use crate::error::{EvaluationError, FormulaError};
use crate::options::Options;
use crate::record::Record;
use crate::time::{Endpoint, Interval};

pub use boolean::DenseBooleanNetwork;
pub use lattice::{DenseDataNetwork, DenseRobustnessNetwork, Network};

/// Timestamps of the two most recent events.
#[derive(Debug, Clone)]
pub(crate) struct Clock {
    field: String,
    previous: NotNan<f64>,
    current: NotNan<f64>,
}

impl Clock {
    pub(crate) fn new(options: &Options) -> Result<Self, FormulaError> {
        let start = NotNan::new(options.start())
            .ok()
            .filter(|start| start.is_finite())
            .ok_or_else(|| FormulaError::malformed(format!("start time {} is not finite", options.start())))?;

        Ok(Self {
            field: options.time_field().to_string(),
            previous: start,
            current: start,
        })
    }

    /// Timestamp of an event.
    pub(crate) fn read<R: Record + ?Sized>(&self, record: &R) -> Result<f64, EvaluationError> {
        let datum = record
            .field(&self.field)
            .ok_or_else(|| EvaluationError::missing(&self.field))?;

        datum
            .as_float()
            .ok_or_else(|| EvaluationError::mismatch(&self.field, "number", datum.kind()))
    }

    /// Move the clock to `time`, which may not precede the current time.
    pub(crate) fn advance(&mut self, time: f64) -> Result<(), EvaluationError> {
        let time = NotNan::new(time).map_err(|_| EvaluationError::invalid_time(time, "not a number"))?;

        if !time.is_finite() {
            return Err(EvaluationError::invalid_time(*time, "not finite"));
        }

        if time < self.current {
            return Err(EvaluationError::invalid_time(*time, "earlier than the previous event"));
        }

        self.previous = self.current;
        self.current = time;

        trace!("advance(previous = {}, now = {})", self.previous, self.current);

        Ok(())
    }

    pub(crate) fn previous(&self) -> f64 {
        *self.previous
    }

    pub(crate) fn now(&self) -> f64 {
        *self.current
    }

    /// The segment `(previous, now]` covered by the latest update.
    pub(crate) fn segment(&self) -> Interval<f64> {
        Interval::left_open(*self.previous, *self.current)
    }
}

/// Times at which a value observed over `interval` affects a bounded operator with window
/// `[lower, upper]`.
pub(crate) fn horizon(interval: Interval<f64>, lower: f64, upper: Option<f64>) -> Interval<f64> {
    match upper {
        Some(upper) => interval.shift(lower, upper),
        None => interval.shift(lower, lower).unbounded_above(),
    }
}

/// Times at which a value observed at the right end of `interval` affects a bounded operator
/// with window `[lower, upper]`.
pub(crate) fn tail_horizon(interval: Interval<f64>, lower: f64, upper: Option<f64>) -> Interval<f64> {
    let end = interval.end();
    let start = end.map(|time| time + lower);

    match upper {
        Some(upper) => Interval::new(start, end.map(|time| time + upper)),
        None => Interval::new(start, Endpoint::Open(f64::INFINITY)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn clock_rejects_time_travel() -> Result<(), Box<dyn std::error::Error>> {
        let mut clock = Clock::new(&Options::default())?;

        clock.advance(1.0)?;
        clock.advance(1.0)?;
        assert_eq!(clock.segment(), Interval::left_open(1.0, 1.0));

        assert!(clock.advance(0.5).is_err_and(|err| err.is_invalid_time()));
        assert!(clock.advance(f64::NAN).is_err_and(|err| err.is_invalid_time()));
        assert!(clock.advance(f64::INFINITY).is_err());

        clock.advance(2.5)?;
        assert_eq!((clock.previous(), clock.now()), (1.0, 2.5));

        Ok(())
    }

    #[test]
    fn clock_reads_configured_field() -> Result<(), Box<dyn std::error::Error>> {
        let clock = Clock::new(&Options::default().with_time_field("t"))?;

        assert_eq!(clock.read(&HashMap::from([("t", 3.0)]))?, 3.0);
        assert!(clock.read(&HashMap::from([("time", 3.0)])).is_err_and(|err| err.is_field_missing()));

        Ok(())
    }

    #[test]
    fn horizons() {
        let segment = Interval::left_open(1.0, 2.0);

        assert_eq!(horizon(segment, 1.0, Some(3.0)), Interval::left_open(2.0, 5.0));
        assert_eq!(horizon(segment, 1.0, None), Interval::open(2.0, f64::INFINITY));
        assert_eq!(tail_horizon(segment, 1.0, Some(3.0)), Interval::closed(3.0, 5.0));
    }
}
