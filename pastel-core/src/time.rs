//! Time values and intervals.
//!
//! Monitors are driven either by integer steps (discrete time) or by real-valued timestamps
//! (dense time). Both are abstracted by the [`Time`] trait, which supplies a total order and the
//! `±∞` sentinels used as the open boundaries of "forever" segments.
//!
//! An [`Interval`] is a pair of [`Endpoint`]s, each of which may be open or closed. Dense
//! monitors almost always report left-open, right-closed intervals since a value computed at
//! time `now` holds on `(previous, now]`.
//!
//! ```rust
//! use pastel_core::time::Interval;
//!
//! let segment = Interval::left_open(0.0, 10.0);
//!
//! assert!(!segment.contains(0.0));
//! assert!(segment.contains(10.0));
//! assert_eq!(segment.to_string(), "(0,10]");
//! ```

use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};

/// Totally ordered time value with unbounded sentinels.
pub trait Time: Copy + Debug + Display + PartialOrd + 'static {
    /// Sentinel later than every real time.
    const INFINITY: Self;

    /// Sentinel earlier than every real time.
    const NEG_INFINITY: Self;

    /// Total order over time values.
    fn order(&self, other: &Self) -> Ordering;

    /// Offset a time value, saturating at the sentinels.
    fn shift(self, amount: Self) -> Self;

    /// The smallest time value strictly greater than `self`, if time is discrete.
    fn successor(self) -> Option<Self>;
}

impl Time for i64 {
    const INFINITY: Self = i64::MAX;
    const NEG_INFINITY: Self = i64::MIN;

    fn order(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn shift(self, amount: Self) -> Self {
        if self == Self::INFINITY || self == Self::NEG_INFINITY {
            self
        } else {
            self.saturating_add(amount)
        }
    }

    fn successor(self) -> Option<Self> {
        self.checked_add(1)
    }
}

impl Time for f64 {
    const INFINITY: Self = f64::INFINITY;
    const NEG_INFINITY: Self = f64::NEG_INFINITY;

    fn order(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or_else(|| self.total_cmp(other))
    }

    fn shift(self, amount: Self) -> Self {
        self + amount
    }

    fn successor(self) -> Option<Self> {
        None
    }
}

/// Boundary of an [`Interval`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum Endpoint<T> {
    Open(T),
    Closed(T),
}

impl<T: Copy> Endpoint<T> {
    pub fn value(&self) -> T {
        match self {
            Self::Open(value) => *value,
            Self::Closed(value) => *value,
        }
    }

    pub fn map<F>(self, f: F) -> Endpoint<T>
    where
        F: Fn(T) -> T,
    {
        match self {
            Self::Open(value) => Self::Open(f(value)),
            Self::Closed(value) => Self::Closed(f(value)),
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(_))
    }
}

/// A set of time values between two endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval<T> {
    start: Endpoint<T>,
    end: Endpoint<T>,
}

impl<T: Time> Interval<T> {
    pub fn new(start: Endpoint<T>, end: Endpoint<T>) -> Self {
        Self { start, end }
    }

    /// The interval `(start, end]`.
    pub fn left_open(start: T, end: T) -> Self {
        Self::new(Endpoint::Open(start), Endpoint::Closed(end))
    }

    /// The interval `[start, end)`.
    pub fn right_open(start: T, end: T) -> Self {
        Self::new(Endpoint::Closed(start), Endpoint::Open(end))
    }

    /// The interval `[start, end]`.
    pub fn closed(start: T, end: T) -> Self {
        Self::new(Endpoint::Closed(start), Endpoint::Closed(end))
    }

    /// The interval `(start, end)`.
    pub fn open(start: T, end: T) -> Self {
        Self::new(Endpoint::Open(start), Endpoint::Open(end))
    }

    /// The interval `(-∞, ∞)`.
    pub fn unbounded() -> Self {
        Self::open(T::NEG_INFINITY, T::INFINITY)
    }

    /// The interval `(-∞, end]`.
    pub fn up_to(end: T) -> Self {
        Self::left_open(T::NEG_INFINITY, end)
    }

    /// The interval `(-∞, end)`.
    pub fn before(end: T) -> Self {
        Self::open(T::NEG_INFINITY, end)
    }

    /// The interval `(start, ∞)`.
    pub fn after(start: T) -> Self {
        Self::open(start, T::INFINITY)
    }

    /// The interval `[start, ∞)`.
    pub fn starting_at(start: T) -> Self {
        Self::right_open(start, T::INFINITY)
    }

    pub fn start(&self) -> Endpoint<T> {
        self.start
    }

    pub fn end(&self) -> Endpoint<T> {
        self.end
    }

    pub fn lower(&self) -> T {
        self.start.value()
    }

    pub fn upper(&self) -> T {
        self.end.value()
    }

    /// Shift the start of the interval by `start` and the end of the interval by `end`,
    /// keeping the kind of each endpoint.
    pub fn shift(&self, start: T, end: T) -> Self {
        Self {
            start: self.start.map(|value| value.shift(start)),
            end: self.end.map(|value| value.shift(end)),
        }
    }

    /// Replace the end of the interval with an open `∞` endpoint.
    pub fn unbounded_above(&self) -> Self {
        Self {
            start: self.start,
            end: Endpoint::Open(T::INFINITY),
        }
    }

    pub fn contains(&self, time: T) -> bool {
        let within_lower = match self.start {
            Endpoint::Open(lower) => time.order(&lower).is_gt(),
            Endpoint::Closed(lower) => time.order(&lower).is_ge(),
        };

        let within_upper = match self.end {
            Endpoint::Open(upper) => time.order(&upper).is_lt(),
            Endpoint::Closed(upper) => time.order(&upper).is_le(),
        };

        within_lower && within_upper
    }

    pub fn is_empty(&self) -> bool {
        match self.lower().order(&self.upper()) {
            Ordering::Less => false,
            Ordering::Equal => !(self.start.is_closed() && self.end.is_closed()),
            Ordering::Greater => true,
        }
    }
}

impl<T: Display + Copy> Display for Interval<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let opening = match &self.start {
            Endpoint::Open(_) => '(',
            Endpoint::Closed(_) => '[',
        };

        let closing = match &self.end {
            Endpoint::Open(_) => ')',
            Endpoint::Closed(_) => ']',
        };

        write!(f, "{}{},{}{}", opening, self.start.value(), self.end.value(), closing)
    }
}

impl<T: Time> From<std::ops::Range<T>> for Interval<T> {
    fn from(std::ops::Range { start, end }: std::ops::Range<T>) -> Self {
        Self::right_open(start, end)
    }
}

impl<T: Time> From<std::ops::RangeInclusive<T>> for Interval<T> {
    fn from(range: std::ops::RangeInclusive<T>) -> Self {
        let (start, end) = range.into_inner();
        Self::closed(start, end)
    }
}

/// Position between time values used to order interval boundaries.
///
/// `Below(t)` sits immediately before `t` and `Above(t)` immediately after it, so that
/// `Below(t) < Above(t) < Below(u)` whenever `t < u`. Every interval maps to a half-open range
/// of cuts, which makes adjacency of `(a, b]` and `(b, c]` a plain equality test.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Cut<T> {
    Below(T),
    Above(T),
}

impl<T: Time> Cut<T> {
    fn time(&self) -> T {
        match self {
            Self::Below(t) | Self::Above(t) => *t,
        }
    }

    /// Rewrite `Above(t)` as `Below(t + 1)` when time is discrete.
    pub(crate) fn normalize(self) -> Self {
        match self {
            Self::Above(t) => t.successor().map_or(self, Self::Below),
            below => below,
        }
    }

    pub(crate) fn start_of(endpoint: Endpoint<T>) -> Self {
        match endpoint {
            Endpoint::Closed(t) => Self::Below(t),
            Endpoint::Open(t) => Self::Above(t),
        }
        .normalize()
    }

    pub(crate) fn end_of(endpoint: Endpoint<T>) -> Self {
        match endpoint {
            Endpoint::Closed(t) => Self::Above(t),
            Endpoint::Open(t) => Self::Below(t),
        }
        .normalize()
    }

    pub(crate) fn as_start(&self) -> Endpoint<T> {
        match *self {
            Self::Below(t) => Endpoint::Closed(t),
            Self::Above(t) => Endpoint::Open(t),
        }
    }

    pub(crate) fn as_end(&self) -> Endpoint<T> {
        match *self {
            Self::Below(t) => Endpoint::Open(t),
            Self::Above(t) => Endpoint::Closed(t),
        }
    }
}

impl<T: Time> Ord for Cut<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        let rank = |cut: &Self| match cut {
            Self::Below(_) => 0,
            Self::Above(_) => 1,
        };

        self.time()
            .order(&other.time())
            .then_with(|| rank(self).cmp(&rank(other)))
    }
}

impl<T: Time> PartialOrd for Cut<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Time> PartialEq for Cut<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl<T: Time> Eq for Cut<T> {}
