//! Canonical mappings from time intervals to values.
//!
//! An [`IntervalMap`] is an ordered sequence of disjoint segments, each carrying a value. After
//! every mutation the map is compressed so that no two touching segments carry equal values.
//! This canonical form is what allows two maps to be compared structurally: two maps describing
//! the same signal always have the same segments.
//!
//! Values added over an already covered region are merged with the existing value using a
//! combine operator. The operator is either chosen statically through the `C` type parameter
//! (see [`Combine`]) or supplied per call with [`IntervalMap::add_with`], which is how opaque
//! domains without an identity element are handled.
//!
//! ```rust
//! use pastel_core::interval_map::RobustnessMap;
//! use pastel_core::time::Interval;
//!
//! let mut map = RobustnessMap::<f64>::new();
//! map.add(Interval::left_open(0.0, 10.0), 1.0);
//! map.add(Interval::left_open(5.0, 15.0), 3.0);
//!
//! assert_eq!(map.value_at(2.0), Some(&1.0));
//! assert_eq!(map.value_at(7.0), Some(&3.0));
//! assert_eq!(map.len(), 2);
//! ```
//!
//! Three closures of the abstraction are used by the monitors: [`IntervalSet`] for boolean
//! signals, where only the intervals on which the signal holds are stored, [`RobustnessMap`]
//! for quantitative signals and [`DataMap`] for finite-domain sets.

use std::fmt::{Debug, Display, Formatter};
use std::marker::PhantomData;

use crate::metrics::{Join, Meet};
use crate::time::{Cut, Interval, Time};

/// Statically chosen operator used to merge overlapping values.
///
/// Implementations are expected to be commutative and associative, which makes the final
/// content of a map independent of the order in which segments were added.
pub trait Combine<V> {
    fn combine(existing: &V, added: &V) -> V;
}

/// Presence combine for interval sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct Union;

/// Combine with the [`Join`] of the values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Max;

/// Combine with the [`Meet`] of the values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Min;

/// Marker for maps whose values have no static combine operator.
///
/// Maps with this marker can only be extended using [`IntervalMap::add_with`] and
/// [`IntervalMap::insert`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Opaque;

impl Combine<()> for Union {
    fn combine(_: &(), _: &()) {}
}

impl<V: Join> Combine<V> for Max {
    fn combine(existing: &V, added: &V) -> V {
        existing.max(added)
    }
}

impl<V: Meet> Combine<V> for Min {
    fn combine(existing: &V, added: &V) -> V {
        existing.min(added)
    }
}

/// Boolean signal, storing the intervals on which the signal holds.
pub type IntervalSet<T> = IntervalMap<T, (), Union>;

/// Quantitative signal merged with the maximum of overlapping values.
pub type RobustnessMap<T, V = f64> = IntervalMap<T, V, Max>;

/// Signal over finite-domain sets.
pub type DataMap<T, S> = IntervalMap<T, S, Opaque>;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Segment<T: Time, V> {
    pub(crate) start: Cut<T>,
    pub(crate) end: Cut<T>,
    pub(crate) value: V,
}

impl<T: Time, V> Segment<T, V> {
    fn interval(&self) -> Interval<T> {
        Interval::new(self.start.as_start(), self.end.as_end())
    }
}

/// Ordered, disjoint and compressed mapping from time intervals to values.
pub struct IntervalMap<T: Time, V, C = Opaque> {
    segments: Vec<Segment<T, V>>,
    combine: PhantomData<C>,
}

fn bounds<T: Time>(interval: &Interval<T>) -> (Cut<T>, Cut<T>) {
    (Cut::start_of(interval.start()), Cut::end_of(interval.end()))
}

impl<T: Time, V, C> IntervalMap<T, V, C> {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            combine: PhantomData,
        }
    }

    /// Number of segments in the map.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Iterate over the segments of the map in ascending order.
    pub fn iter(&self) -> Iter<'_, T, V> {
        Iter(self.segments.iter())
    }

    /// Iterate over the intervals covered by the map in ascending order.
    pub fn intervals(&self) -> impl Iterator<Item = Interval<T>> + '_ {
        self.segments.iter().map(Segment::interval)
    }

    /// The value of the segment containing `time`, if any.
    pub fn value_at(&self, time: T) -> Option<&V> {
        let point_start = Cut::Below(time);
        let point_end = Cut::Above(time).normalize();
        let index = self.segments.partition_point(|seg| seg.end <= point_start);

        self.segments
            .get(index)
            .filter(|seg| seg.start <= point_start && point_end <= seg.end)
            .map(|seg| &seg.value)
    }

    /// The smallest interval spanning every segment of the map.
    pub fn span(&self) -> Option<Interval<T>> {
        let first = self.segments.first()?;
        let last = self.segments.last()?;

        Some(Interval::new(first.start.as_start(), last.end.as_end()))
    }

    /// Keep only the values inside `interval`.
    pub fn restrict(&mut self, interval: Interval<T>) {
        let (start, end) = bounds(&interval);

        self.segments.retain(|seg| seg.end > start && seg.start < end);

        if let Some(first) = self.segments.first_mut() {
            first.start = first.start.max(start);
        }

        if let Some(last) = self.segments.last_mut() {
            last.end = last.end.min(end);
        }

        self.segments.retain(|seg| seg.start < seg.end);
    }
}

impl<T: Time, V: Clone + PartialEq, C> IntervalMap<T, V, C> {
    /// Create a map holding `value` over `interval`.
    pub fn singleton(interval: Interval<T>, value: V) -> Self {
        let mut map = Self::new();
        map.insert(interval, value);
        map
    }

    /// Merge `value` into the map over `interval`.
    ///
    /// Uncovered parts of `interval` receive `value`, covered parts receive
    /// `combine(existing, value)`. Existing segments are split at the boundaries of `interval`
    /// as needed and equal neighbors are merged afterwards.
    pub fn add_with<F>(&mut self, interval: Interval<T>, value: V, mut combine: F)
    where
        F: FnMut(&V, &V) -> V,
    {
        let (start, end) = bounds(&interval);

        if start >= end {
            return;
        }

        let first = self.segments.partition_point(|seg| seg.end <= start);
        let last = self.segments.partition_point(|seg| seg.start < end);
        let affected = self.segments.drain(first..last).collect::<Vec<_>>();
        let mut replacement = Vec::with_capacity(affected.len() * 2 + 1);
        let mut cursor = start;

        for seg in affected {
            if seg.start < start {
                replacement.push(Segment {
                    start: seg.start,
                    end: start,
                    value: seg.value.clone(),
                });
            }

            let overlap_start = seg.start.max(start);
            let overlap_end = seg.end.min(end);

            if cursor < overlap_start {
                replacement.push(Segment {
                    start: cursor,
                    end: overlap_start,
                    value: value.clone(),
                });
            }

            replacement.push(Segment {
                start: overlap_start,
                end: overlap_end,
                value: combine(&seg.value, &value),
            });

            cursor = overlap_end;

            if seg.end > end {
                replacement.push(Segment {
                    start: end,
                    end: seg.end,
                    value: seg.value,
                });
            }
        }

        if cursor < end {
            replacement.push(Segment {
                start: cursor,
                end,
                value,
            });
        }

        let count = replacement.len();
        self.segments.splice(first..first, replacement);
        self.compress(first.saturating_sub(1), first + count + 1);
    }

    /// Remove every value inside `interval`.
    pub fn subtract(&mut self, interval: Interval<T>) {
        let (start, end) = bounds(&interval);

        if start >= end {
            return;
        }

        let first = self.segments.partition_point(|seg| seg.end <= start);
        let last = self.segments.partition_point(|seg| seg.start < end);

        if first >= last {
            return;
        }

        let mut remnants = Vec::with_capacity(2);

        for seg in self.segments.drain(first..last) {
            if seg.start < start {
                remnants.push(Segment {
                    start: seg.start,
                    end: start,
                    value: seg.value.clone(),
                });
            }

            if seg.end > end {
                remnants.push(Segment {
                    start: end,
                    end: seg.end,
                    value: seg.value,
                });
            }
        }

        self.segments.splice(first..first, remnants);
    }

    /// Assign `value` over `interval`, replacing whatever was there.
    pub fn insert(&mut self, interval: Interval<T>, value: V) {
        self.add_with(interval, value, |_, added| added.clone());
    }

    /// Copy of the map restricted to `interval`.
    pub fn restricted(&self, interval: Interval<T>) -> Self {
        let (start, end) = bounds(&interval);
        let first = self.segments.partition_point(|seg| seg.end <= start);
        let segments = self.segments[first..]
            .iter()
            .take_while(|seg| seg.start < end)
            .map(|seg| Segment {
                start: seg.start.max(start),
                end: seg.end.min(end),
                value: seg.value.clone(),
            })
            .collect();

        Self {
            segments,
            combine: PhantomData,
        }
    }

    /// Apply `f` to every value, recompressing the result.
    pub fn map_values<W, D, F>(&self, mut f: F) -> IntervalMap<T, W, D>
    where
        W: Clone + PartialEq,
        F: FnMut(&V) -> W,
    {
        let mut mapped = IntervalMap::<T, W, D> {
            segments: self
                .segments
                .iter()
                .map(|seg| Segment {
                    start: seg.start,
                    end: seg.end,
                    value: f(&seg.value),
                })
                .collect(),
            combine: PhantomData,
        };

        let len = mapped.segments.len();
        mapped.compress(0, len);
        mapped
    }

    /// Fill the parts of `within` not covered by the map with `value`, discarding segments
    /// outside of `within`.
    pub fn fill(&self, within: Interval<T>, value: V) -> Self {
        let mut filled = self.restricted(within);
        filled.add_with(within, value, |existing, _| existing.clone());
        filled
    }

    fn compress(&mut self, from: usize, to: usize) {
        let to = to.min(self.segments.len());
        let mut index = from.max(1);

        while index < to.min(self.segments.len()) {
            let (left, right) = self.segments.split_at_mut(index);
            let previous = &mut left[index - 1];
            let current = &right[0];

            if previous.end == current.start && previous.value == current.value {
                previous.end = current.end;
                self.segments.remove(index);
            } else {
                index += 1;
            }
        }
    }
}

impl<T: Time, V: Clone + PartialEq, C: Combine<V>> IntervalMap<T, V, C> {
    /// Merge `value` into the map over `interval` using the static combine operator.
    pub fn add(&mut self, interval: Interval<T>, value: V) {
        self.add_with(interval, value, C::combine);
    }
}

impl<T: Time> IntervalSet<T> {
    /// Mark every time in `interval` as belonging to the set.
    pub fn add_interval(&mut self, interval: Interval<T>) {
        self.add(interval, ());
    }

    pub fn from_interval(interval: Interval<T>) -> Self {
        let mut set = Self::new();
        set.add_interval(interval);
        set
    }

    pub fn contains(&self, time: T) -> bool {
        self.value_at(time).is_some()
    }

    pub fn union(&self, other: &Self) -> Self {
        let mut result = self.clone();

        for interval in other.intervals() {
            result.add_interval(interval);
        }

        result
    }

    pub fn difference(&self, other: &Self) -> Self {
        let mut result = self.clone();

        for interval in other.intervals() {
            result.subtract(interval);
        }

        result
    }

    pub fn intersection(&self, other: &Self) -> Self {
        let segments = Sweep::new(&self.segments, &other.segments)
            .map(|(start, end, _, _)| Segment {
                start,
                end,
                value: (),
            })
            .collect::<Vec<_>>();

        let mut result = Self {
            segments,
            combine: PhantomData,
        };

        let len = result.segments.len();
        result.compress(0, len);
        result
    }

    /// The parts of `within` not in the set.
    pub fn complement(&self, within: Interval<T>) -> Self {
        Self::from_interval(within).difference(self)
    }

    /// Boolean indicator of the set over `within`, true inside the set and false elsewhere.
    pub fn indicator(&self, within: Interval<T>) -> IntervalMap<T, bool> {
        self.map_values::<bool, Opaque, _>(|_| true)
            .fill(within, false)
    }

    /// The set of times at which a boolean map is true.
    pub fn from_indicator<C>(indicator: &IntervalMap<T, bool, C>) -> Self {
        let segments = indicator
            .segments
            .iter()
            .filter(|seg| seg.value)
            .map(|seg| Segment {
                start: seg.start,
                end: seg.end,
                value: (),
            })
            .collect::<Vec<_>>();

        let mut result = Self {
            segments,
            combine: PhantomData,
        };

        let len = result.segments.len();
        result.compress(0, len);
        result
    }
}

impl<T: Time, V, C> IntervalMap<T, V, C> {
    /// Walk two maps in lockstep, yielding every maximal interval on which both maps have a
    /// constant value.
    ///
    /// Whichever map's current segment ends first is advanced, so the number of yielded
    /// intervals is bounded by the total number of segments in both maps.
    pub fn sweep<'a, W, D>(
        &'a self,
        other: &'a IntervalMap<T, W, D>,
    ) -> impl Iterator<Item = (Interval<T>, &'a V, &'a W)> + 'a {
        Sweep::new(&self.segments, &other.segments)
            .map(|(start, end, left, right)| (Interval::new(start.as_start(), end.as_end()), left, right))
    }
}

struct Sweep<'a, T: Time, V, W> {
    left: &'a [Segment<T, V>],
    right: &'a [Segment<T, W>],
}

impl<'a, T: Time, V, W> Sweep<'a, T, V, W> {
    fn new(left: &'a [Segment<T, V>], right: &'a [Segment<T, W>]) -> Self {
        Self { left, right }
    }
}

impl<'a, T: Time, V, W> Iterator for Sweep<'a, T, V, W> {
    type Item = (Cut<T>, Cut<T>, &'a V, &'a W);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (l, r) = (self.left.first()?, self.right.first()?);
            let start = l.start.max(r.start);
            let end = l.end.min(r.end);

            if l.end <= r.end {
                self.left = &self.left[1..];
            }

            if r.end <= l.end {
                self.right = &self.right[1..];
            }

            if start < end {
                return Some((start, end, &l.value, &r.value));
            }
        }
    }
}

/// Iterator over the segments of an [`IntervalMap`].
pub struct Iter<'a, T: Time, V>(std::slice::Iter<'a, Segment<T, V>>);

impl<'a, T: Time, V> Iterator for Iter<'a, T, V> {
    type Item = (Interval<T>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|seg| (seg.interval(), &seg.value))
    }
}

impl<'a, T: Time, V> DoubleEndedIterator for Iter<'a, T, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|seg| (seg.interval(), &seg.value))
    }
}

impl<'a, T: Time, V, C> IntoIterator for &'a IntervalMap<T, V, C> {
    type Item = (Interval<T>, &'a V);
    type IntoIter = Iter<'a, T, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Time, V: Clone + PartialEq, C> FromIterator<(Interval<T>, V)> for IntervalMap<T, V, C> {
    /// Build a map by inserting each pair in order, later pairs replacing earlier ones.
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (Interval<T>, V)>,
    {
        let mut map = Self::new();

        for (interval, value) in iter {
            map.insert(interval, value);
        }

        map
    }
}

impl<T: Time> FromIterator<Interval<T>> for IntervalSet<T> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Interval<T>>,
    {
        let mut set = Self::new();

        for interval in iter {
            set.add_interval(interval);
        }

        set
    }
}

impl<T: Time, V, C> Default for IntervalMap<T, V, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Time, V: Clone, C> Clone for IntervalMap<T, V, C> {
    fn clone(&self) -> Self {
        Self {
            segments: self.segments.clone(),
            combine: PhantomData,
        }
    }
}

impl<T: Time, V: PartialEq, C> PartialEq for IntervalMap<T, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl<T: Time, V: Debug, C> Debug for IntervalMap<T, V, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.segments.iter().map(|seg| (seg.interval().to_string(), &seg.value)))
            .finish()
    }
}

impl<T: Time, V: Debug, C> Display for IntervalMap<T, V, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;

        for (index, seg) in self.segments.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }

            write!(f, "{}: {:?}", seg.interval(), seg.value)?;
        }

        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn assert_canonical<V: PartialEq + Debug, C>(map: &IntervalMap<i64, V, C>) {
        for pair in map.segments.windows(2) {
            assert!(pair[0].end <= pair[1].start, "overlapping segments in {:?}", map);
            assert!(
                pair[0].end != pair[1].start || pair[0].value != pair[1].value,
                "uncompressed segments in {:?}",
                map
            );
        }

        for seg in &map.segments {
            assert!(seg.start < seg.end, "empty segment in {:?}", map);
        }
    }

    #[test]
    fn add_disjoint() {
        let mut map = RobustnessMap::<f64>::new();
        map.add(Interval::left_open(0.0, 1.0), 1.0);
        map.add(Interval::left_open(2.0, 3.0), 2.0);

        assert_eq!(map.len(), 2);
        assert_eq!(map.value_at(1.5), None);
        assert_eq!(map.value_at(2.5), Some(&2.0));
    }

    #[test]
    fn add_merges_adjacent_equal_values() {
        let mut map = RobustnessMap::<f64>::new();
        map.add(Interval::left_open(0.0, 1.0), 1.0);
        map.add(Interval::left_open(1.0, 2.0), 1.0);

        assert_eq!(map.len(), 1);
        assert_eq!(map.span(), Some(Interval::left_open(0.0, 2.0)));
    }

    #[test]
    fn add_overlapping_uses_combine() {
        let mut map = IntervalMap::<f64, f64, Min>::new();
        map.add(Interval::left_open(0.0, 10.0), 5.0);
        map.add(Interval::left_open(2.0, 4.0), 1.0);
        map.add(Interval::left_open(3.0, 12.0), 7.0);

        let expected = IntervalMap::<f64, f64, Min>::from_iter([
            (Interval::left_open(0.0, 2.0), 5.0),
            (Interval::left_open(2.0, 4.0), 1.0),
            (Interval::left_open(4.0, 10.0), 5.0),
            (Interval::left_open(10.0, 12.0), 7.0),
        ]);

        assert_eq!(map, expected);
    }

    #[test]
    fn discrete_intervals_touch_at_successor() {
        let mut set = IntervalSet::<i64>::new();
        set.add_interval(Interval::closed(0, 2));
        set.add_interval(Interval::closed(3, 5));

        assert_eq!(set.len(), 1);
        assert!(set.contains(3));
        assert!(!set.contains(6));
    }

    #[test]
    fn dense_closed_and_open_points() {
        let mut set = IntervalSet::<f64>::new();
        set.add_interval(Interval::left_open(0.0, 1.0));

        assert!(!set.contains(0.0));
        assert!(set.contains(1.0));

        set.add_interval(Interval::closed(0.0, 0.0));
        assert_eq!(set.len(), 1);
        assert!(set.contains(0.0));
    }

    #[test]
    fn subtract_splits_segment() {
        let mut set = IntervalSet::from_interval(Interval::left_open(0.0, 10.0));
        set.subtract(Interval::closed(4.0, 6.0));

        let intervals = set.intervals().collect::<Vec<_>>();
        assert_eq!(intervals, vec![Interval::open(0.0, 4.0), Interval::left_open(6.0, 10.0)]);
    }

    #[test]
    fn restrict() {
        let mut map = RobustnessMap::<f64>::from_iter([
            (Interval::left_open(0.0, 5.0), 1.0),
            (Interval::left_open(5.0, 10.0), 2.0),
        ]);

        map.restrict(Interval::left_open(3.0, 7.0));

        let expected = RobustnessMap::<f64>::from_iter([
            (Interval::left_open(3.0, 5.0), 1.0),
            (Interval::left_open(5.0, 7.0), 2.0),
        ]);

        assert_eq!(map, expected);
    }

    #[test]
    fn set_algebra() {
        let a = IntervalSet::from_interval(Interval::left_open(0.0, 5.0));
        let b = IntervalSet::from_interval(Interval::left_open(3.0, 8.0));

        assert_eq!(a.union(&b), IntervalSet::from_interval(Interval::left_open(0.0, 8.0)));
        assert_eq!(a.intersection(&b), IntervalSet::from_interval(Interval::left_open(3.0, 5.0)));
        assert_eq!(a.difference(&b), IntervalSet::from_interval(Interval::left_open(0.0, 3.0)));
        assert_eq!(
            a.complement(Interval::left_open(0.0, 10.0)),
            IntervalSet::from_interval(Interval::left_open(5.0, 10.0))
        );
    }

    #[test]
    fn indicator_fills_gaps() {
        let set = IntervalSet::from_interval(Interval::left_open(2.0, 3.0));
        let indicator = set.indicator(Interval::left_open(0.0, 5.0));

        let expected = IntervalMap::<f64, bool>::from_iter([
            (Interval::left_open(0.0, 2.0), false),
            (Interval::left_open(2.0, 3.0), true),
            (Interval::left_open(3.0, 5.0), false),
        ]);

        assert_eq!(indicator, expected);
        assert_eq!(IntervalSet::from_indicator(&indicator), set);
    }

    #[test]
    fn sweep_synchronizes_breakpoints() {
        let left = IntervalMap::<f64, bool>::from_iter([
            (Interval::left_open(0.0, 2.0), true),
            (Interval::left_open(2.0, 5.0), false),
        ]);

        let right = IntervalMap::<f64, i32>::from_iter([
            (Interval::left_open(0.0, 1.0), 1),
            (Interval::left_open(1.0, 5.0), 2),
        ]);

        let synchronized = left
            .sweep(&right)
            .map(|(interval, l, r)| (interval, *l, *r))
            .collect::<Vec<_>>();

        assert_eq!(
            synchronized,
            vec![
                (Interval::left_open(0.0, 1.0), true, 1),
                (Interval::left_open(1.0, 2.0), true, 2),
                (Interval::left_open(2.0, 5.0), false, 2),
            ]
        );
    }

    #[test]
    fn display() {
        let map = RobustnessMap::<f64>::singleton(Interval::left_open(0.0, 12.0), f64::NEG_INFINITY);
        assert_eq!(map.to_string(), "{(0,12]: -inf}");
    }

    #[derive(Debug, Clone)]
    enum Operation {
        Add(i64, i64, f64),
        Subtract(i64, i64),
    }

    fn operation() -> impl Strategy<Value = Operation> {
        prop_oneof![
            3 => (-20i64..20, 0i64..10, 0i8..3).prop_map(|(s, w, v)| Operation::Add(s, s + w, f64::from(v))),
            1 => (-20i64..20, 0i64..10).prop_map(|(s, w)| Operation::Subtract(s, s + w)),
        ]
    }

    fn segment() -> impl Strategy<Value = (i64, i64, f64)> {
        (-20i64..20, 0i64..10, -5i8..5).prop_map(|(s, w, v)| (s, s + w, f64::from(v)))
    }

    proptest! {
        /// Property: any sequence of additions and subtractions leaves the map canonical.
        #[test]
        fn prop_operations_preserve_canonical_form(operations in prop::collection::vec(operation(), 0..40)) {
            let mut map = IntervalMap::<i64, f64, Max>::new();

            for operation in operations {
                match operation {
                    Operation::Add(s, e, v) => map.add(Interval::closed(s, e), v),
                    Operation::Subtract(s, e) => map.subtract(Interval::closed(s, e)),
                }

                assert_canonical(&map);
            }
        }

        /// Property: the final map does not depend on the order of additions.
        #[test]
        fn prop_insertion_order_is_irrelevant(segments in prop::collection::vec(segment(), 0..20)) {
            let mut forward = IntervalMap::<i64, f64, Max>::new();
            let mut backward = IntervalMap::<i64, f64, Max>::new();

            for &(s, e, v) in &segments {
                forward.add(Interval::closed(s, e), v);
            }

            for &(s, e, v) in segments.iter().rev() {
                backward.add(Interval::closed(s, e), v);
            }

            prop_assert_eq!(&forward, &backward);

            for t in -20i64..30 {
                let expected = segments
                    .iter()
                    .filter(|&&(s, e, _)| s <= t && t <= e)
                    .map(|&(_, _, v)| v)
                    .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))));

                prop_assert_eq!(forward.value_at(t).copied(), expected);
            }
        }

        /// Property: overlapping segments merge to the combined value regardless of order.
        #[test]
        fn prop_overlap_is_combined((a, b) in (segment(), segment())) {
            let mut ab = IntervalMap::<i64, f64, Min>::new();
            ab.add(Interval::closed(a.0, a.1), a.2);
            ab.add(Interval::closed(b.0, b.1), b.2);

            let mut ba = IntervalMap::<i64, f64, Min>::new();
            ba.add(Interval::closed(b.0, b.1), b.2);
            ba.add(Interval::closed(a.0, a.1), a.2);

            prop_assert_eq!(&ab, &ba);

            let overlap = a.0.max(b.0)..=a.1.min(b.1);
            for t in overlap {
                prop_assert_eq!(ab.value_at(t).copied(), Some(a.2.min(b.2)));
            }
        }
    }
}
