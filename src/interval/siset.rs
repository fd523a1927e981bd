//! Sets of span intervals: the region values the engine computes with.

use std::collections::BTreeSet;
use std::fmt;

use rand::Rng;

use super::interval::Interval;
use super::span::SpanInterval;

/// Upper bound on the number of spans in a randomly drawn set.
const RANDOM_SPAN_LIMIT: usize = 3;

/// A union of span intervals inside `max_interval`.
///
/// With `force_liquid` set the set denotes liquid truth: every stored span is
/// the liquid hull of what was added, and subtraction and complement work on
/// the covered time points rather than on individual intervals. Spans are
/// not normalized eagerly; `make_disjoint` does that on request.
///
/// Equality is denotational: two sets are equal when they contain the same
/// intervals, regardless of how the spans are cut.
#[derive(Debug, Clone)]
pub struct SISet {
    force_liquid: bool,
    max_interval: Interval,
    regions: BTreeSet<SpanInterval>,
}

impl SISet {
    /// Create an empty set.
    pub fn new(force_liquid: bool, max_interval: Interval) -> Self {
        SISet {
            force_liquid,
            max_interval,
            regions: BTreeSet::new(),
        }
    }

    pub fn from_span(span: SpanInterval, force_liquid: bool, max_interval: Interval) -> Self {
        let mut set = SISet::new(force_liquid, max_interval);
        set.add(span);
        set
    }

    pub fn from_spans<I>(spans: I, force_liquid: bool, max_interval: Interval) -> Self
    where
        I: IntoIterator<Item = SpanInterval>,
    {
        let mut set = SISet::new(force_liquid, max_interval);
        for span in spans {
            set.add(span);
        }
        set
    }

    /// The set of every interval inside `max_interval`.
    pub fn universe(force_liquid: bool, max_interval: Interval) -> Self {
        SISet::from_span(SpanInterval::whole(max_interval), force_liquid, max_interval)
    }

    /// A random set, used to seed local search.
    pub fn random<R: Rng + ?Sized>(force_liquid: bool, max_interval: Interval, rng: &mut R) -> Self {
        let mut set = SISet::new(force_liquid, max_interval);
        let (lo, hi) = (max_interval.start(), max_interval.finish());
        let count = rng.gen_range(0..=RANDOM_SPAN_LIMIT);
        for _ in 0..count {
            let a = rng.gen_range(lo..=hi);
            let b = rng.gen_range(lo..=hi);
            let (start, finish) = (a.min(b), a.max(b));
            if force_liquid {
                set.add(SpanInterval::liquid(start, finish, max_interval));
            } else {
                set.add(SpanInterval::from_interval(
                    Interval::new(start, finish),
                    max_interval,
                ));
            }
        }
        set
    }

    pub fn force_liquid(&self) -> bool {
        self.force_liquid
    }

    pub fn max_interval(&self) -> Interval {
        self.max_interval
    }

    pub fn spans(&self) -> impl Iterator<Item = &SpanInterval> {
        self.regions.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }

    /// Turn liquidity on or off. Turning it on replaces every span by its
    /// liquid hull.
    pub fn set_force_liquid(&mut self, force_liquid: bool) {
        self.force_liquid = force_liquid;
        if force_liquid {
            self.regions = self.regions.iter().map(SpanInterval::liquid_hull).collect();
        }
    }

    /// Re-bound every span to `max_interval`, clipping spans that stick out
    /// and dropping those left empty.
    pub fn set_max_interval(&mut self, max_interval: Interval) {
        self.max_interval = max_interval;
        self.regions = self
            .regions
            .iter()
            .map(|span| span.with_universe(max_interval))
            .filter(|span| !span.is_empty())
            .collect();
    }

    /// Union a span into the set.
    pub fn add(&mut self, span: SpanInterval) {
        let span = span.with_universe(self.max_interval);
        let span = if self.force_liquid {
            span.liquid_hull()
        } else {
            span
        };
        if !span.is_empty() {
            self.regions.insert(span);
        }
    }

    pub fn add_set(&mut self, other: &SISet) {
        for span in other.spans() {
            self.add(*span);
        }
    }

    /// True if no two spans share an interval.
    pub fn is_disjoint(&self) -> bool {
        let spans: Vec<&SpanInterval> = self.regions.iter().collect();
        spans
            .iter()
            .enumerate()
            .all(|(i, a)| spans[i + 1..].iter().all(|b| !a.overlaps(b)))
    }

    /// Rewrite the set as pairwise disjoint spans covering the same region.
    ///
    /// In liquid mode touching segments are merged as well, so `[1:5]` and
    /// `[6:10]` become `[1:10]`.
    pub fn make_disjoint(&mut self) {
        let max = self.max_interval;
        self.regions = if self.force_liquid {
            self.point_segments()
                .into_iter()
                .map(|seg| SpanInterval::liquid(seg.start(), seg.finish(), max))
                .collect()
        } else {
            disjoint_cover(self.regions.iter().copied()).into_iter().collect()
        };
    }

    /// Complement relative to `max_interval`.
    pub fn compliment(&self) -> SISet {
        if self.force_liquid {
            let uncovered = subtract_segments(&[self.max_interval], &self.point_segments());
            let spans = uncovered
                .into_iter()
                .map(|seg| SpanInterval::liquid(seg.start(), seg.finish(), self.max_interval));
            SISet::from_spans(spans, true, self.max_interval)
        } else {
            subtract(&SISet::universe(false, self.max_interval), self)
        }
    }

    /// Remove `other` from this set. In liquid mode every time point covered
    /// by `other` is removed.
    pub fn subtract(&mut self, other: &SISet) {
        if self.force_liquid {
            let kept = subtract_segments(&self.point_segments(), &other.point_segments());
            let max = self.max_interval;
            self.regions = kept
                .into_iter()
                .map(|seg| SpanInterval::liquid(seg.start(), seg.finish(), max))
                .collect();
        } else {
            self.regions = subtract(self, other).regions;
        }
    }

    /// Number of intervals in the normalized set.
    pub fn size(&self) -> u64 {
        let mut normalized = self.clone();
        normalized.make_disjoint();
        normalized
            .regions
            .iter()
            .fold(0u64, |acc, span| acc.saturating_add(span.size()))
    }

    /// True if every interval of `other` is also in this set.
    pub fn includes(&self, other: &SISet) -> bool {
        subtract(other, self).is_empty()
    }

    pub fn contains_interval(&self, iv: &Interval) -> bool {
        self.regions.iter().any(|span| span.contains(iv))
    }

    /// Smallest interval covering every point the set touches.
    pub fn points_hull(&self) -> Option<Interval> {
        self.regions
            .iter()
            .filter_map(SpanInterval::points)
            .reduce(|a, b| a.hull(&b))
    }

    /// Sorted, merged runs of time points touched by some span.
    fn point_segments(&self) -> Vec<Interval> {
        let mut points: Vec<Interval> = self.regions.iter().filter_map(|s| s.points()).collect();
        points.sort();
        let mut merged: Vec<Interval> = Vec::with_capacity(points.len());
        for seg in points {
            match merged.last_mut() {
                Some(last) if seg.start() <= last.finish() + 1 => *last = last.hull(&seg),
                _ => merged.push(seg),
            }
        }
        merged
    }
}

/// Disjoint spans covering exactly the intervals of `spans`.
fn disjoint_cover<I>(spans: I) -> Vec<SpanInterval>
where
    I: IntoIterator<Item = SpanInterval>,
{
    let mut cover: Vec<SpanInterval> = Vec::new();
    for span in spans {
        let mut pieces = vec![span];
        for existing in &cover {
            pieces = pieces.iter().flat_map(|p| p.subtract(existing)).collect();
            if pieces.is_empty() {
                break;
            }
        }
        cover.extend(pieces);
    }
    cover
}

/// Points of `from` not covered by `cut`; both inputs sorted and merged.
fn subtract_segments(from: &[Interval], cut: &[Interval]) -> Vec<Interval> {
    let mut result = Vec::new();
    for seg in from {
        let mut start = seg.start();
        for c in cut {
            if c.finish() < start || c.start() > seg.finish() {
                continue;
            }
            if c.start() > start {
                result.push(Interval::new(start, c.start() - 1));
            }
            start = c.finish() + 1;
            if start > seg.finish() {
                break;
            }
        }
        if start <= seg.finish() {
            result.push(Interval::new(start, seg.finish()));
        }
    }
    result
}

/// Intervals in both sets, as a non-liquid set over `a`'s universe.
pub fn intersection(a: &SISet, b: &SISet) -> SISet {
    let mut result = SISet::new(false, a.max_interval);
    for x in a.spans() {
        for y in b.spans() {
            result.add(x.intersect(y));
        }
    }
    result
}

/// Intervals of `a` not in `b`, as a non-liquid set over `a`'s universe.
pub fn subtract(a: &SISet, b: &SISet) -> SISet {
    let mut pieces: Vec<SpanInterval> = a.regions.iter().copied().collect();
    for cut in b.spans() {
        pieces = pieces.iter().flat_map(|p| p.subtract(cut)).collect();
        if pieces.is_empty() {
            break;
        }
    }
    SISet::from_spans(pieces, false, a.max_interval)
}

impl PartialEq for SISet {
    fn eq(&self, other: &Self) -> bool {
        subtract(self, other).is_empty() && subtract(other, self).is_empty()
    }
}

impl Eq for SISet {}

impl fmt::Display for SISet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, span) in self.regions.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", span)?;
        }
        write!(f, "}}")
    }
}
