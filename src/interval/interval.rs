//! Closed integer intervals.

use std::fmt;

/// A point in time.
pub type Time = i64;

/// Earliest time point accepted from input. Region arithmetic steps a few
/// units past interval endpoints, so inputs keep well clear of `Time::MIN`.
pub const MIN_TIME: Time = Time::MIN / 4;

/// Latest time point accepted from input.
pub const MAX_TIME: Time = Time::MAX / 4;

/// A closed interval `[start, finish]` of integer time points.
///
/// Intervals are plain values: `start <= finish` always holds and nothing
/// mutates an interval after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interval {
    start: Time,
    finish: Time,
}

impl Interval {
    /// Create the interval `[start, finish]`.
    ///
    /// # Panics
    /// Panics if `start > finish`.
    pub fn new(start: Time, finish: Time) -> Self {
        assert!(
            start <= finish,
            "interval start {} is after its finish {}",
            start,
            finish
        );
        Interval { start, finish }
    }

    /// The single-point interval `[t, t]`.
    pub fn point(t: Time) -> Self {
        Interval::new(t, t)
    }

    pub fn start(&self) -> Time {
        self.start
    }

    pub fn finish(&self) -> Time {
        self.finish
    }

    /// Number of time points covered.
    pub fn len(&self) -> u64 {
        (self.finish - self.start) as u64 + 1
    }

    /// Intervals are never empty; provided for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, t: Time) -> bool {
        self.start <= t && t <= self.finish
    }

    /// True if `other` lies entirely inside this interval.
    pub fn contains_interval(&self, other: &Interval) -> bool {
        self.start <= other.start && other.finish <= self.finish
    }

    /// Common points of the two intervals, if any.
    pub fn intersect(&self, other: &Interval) -> Option<Interval> {
        let start = self.start.max(other.start);
        let finish = self.finish.min(other.finish);
        if start <= finish {
            Some(Interval { start, finish })
        } else {
            None
        }
    }

    /// Smallest interval covering both.
    pub fn hull(&self, other: &Interval) -> Interval {
        Interval {
            start: self.start.min(other.start),
            finish: self.finish.max(other.finish),
        }
    }

    /// Iterate over every sub-interval `[a, b]` with `start <= a <= b <= finish`.
    pub fn subintervals(&self) -> impl Iterator<Item = Interval> + '_ {
        (self.start..=self.finish)
            .flat_map(move |a| (a..=self.finish).map(move |b| Interval::new(a, b)))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.start, self.finish)
    }
}
