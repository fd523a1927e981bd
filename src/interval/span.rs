//! Span intervals: rectangles of possible intervals.

use std::fmt;

use super::interval::{Interval, Time};
use super::relation::{self, Range, Relation, XF, XS, YF, YS};

/// The set of intervals `[a, b]` with `a` in the start range, `b` in the
/// finish range and `a <= b`, all inside `universe`.
///
/// Construction clips both ranges to the universe and drops the parts that
/// cannot start before they finish. When nothing is left the span is empty,
/// which is an ordinary value and not an error.
///
/// Spans order by start range, then finish range, which is the order sets of
/// spans print in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpanInterval {
    start_from: Time,
    start_to: Time,
    finish_from: Time,
    finish_to: Time,
    universe: Interval,
}

impl SpanInterval {
    /// Create the span with starts in `[start_from, start_to]` and finishes
    /// in `[finish_from, finish_to]`.
    pub fn new(
        start_from: Time,
        start_to: Time,
        finish_from: Time,
        finish_to: Time,
        universe: Interval,
    ) -> Self {
        let start_from = start_from.max(universe.start());
        let finish_to = finish_to.min(universe.finish());
        let finish_from = finish_from.max(universe.start()).max(start_from);
        let start_to = start_to.min(universe.finish()).min(finish_to);

        if start_from > start_to || finish_from > finish_to {
            return SpanInterval::empty(universe);
        }
        SpanInterval {
            start_from,
            start_to,
            finish_from,
            finish_to,
            universe,
        }
    }

    /// Every interval inside `[start, finish]`; written `[start:finish]`.
    pub fn liquid(start: Time, finish: Time, universe: Interval) -> Self {
        SpanInterval::new(start, finish, start, finish, universe)
    }

    /// The span holding the single interval `iv`.
    pub fn from_interval(iv: Interval, universe: Interval) -> Self {
        SpanInterval::new(iv.start(), iv.start(), iv.finish(), iv.finish(), universe)
    }

    /// Every interval of the universe.
    pub fn whole(universe: Interval) -> Self {
        SpanInterval::liquid(universe.start(), universe.finish(), universe)
    }

    /// The canonical empty span.
    pub fn empty(universe: Interval) -> Self {
        SpanInterval {
            start_from: universe.start(),
            start_to: universe.start() - 1,
            finish_from: universe.start(),
            finish_to: universe.start() - 1,
            universe,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start_from > self.start_to || self.finish_from > self.finish_to
    }

    pub fn universe(&self) -> Interval {
        self.universe
    }

    /// Range of possible starts, `None` if empty.
    pub fn start(&self) -> Option<Interval> {
        (!self.is_empty()).then(|| Interval::new(self.start_from, self.start_to))
    }

    /// Range of possible finishes, `None` if empty.
    pub fn finish(&self) -> Option<Interval> {
        (!self.is_empty()).then(|| Interval::new(self.finish_from, self.finish_to))
    }

    /// A liquid span has identical start and finish ranges.
    pub fn is_liquid(&self) -> bool {
        !self.is_empty() && self.start_from == self.finish_from && self.start_to == self.finish_to
    }

    /// Time points touched by some member interval.
    pub fn points(&self) -> Option<Interval> {
        (!self.is_empty()).then(|| Interval::new(self.start_from, self.finish_to))
    }

    /// The liquid span over the points this span touches.
    pub fn liquid_hull(&self) -> SpanInterval {
        if self.is_empty() {
            return *self;
        }
        SpanInterval::liquid(self.start_from, self.finish_to, self.universe)
    }

    /// The same span re-bounded to another universe; parts outside are clipped.
    pub fn with_universe(&self, universe: Interval) -> SpanInterval {
        if self.is_empty() {
            return SpanInterval::empty(universe);
        }
        SpanInterval::new(
            self.start_from,
            self.start_to,
            self.finish_from,
            self.finish_to,
            universe,
        )
    }

    pub fn contains(&self, iv: &Interval) -> bool {
        !self.is_empty()
            && self.start_from <= iv.start()
            && iv.start() <= self.start_to
            && self.finish_from <= iv.finish()
            && iv.finish() <= self.finish_to
    }

    /// Number of member intervals.
    pub fn size(&self) -> u64 {
        if self.is_empty() {
            return 0;
        }
        let (s1, s2, e1, e2) = (
            self.start_from as i128,
            self.start_to as i128,
            self.finish_from as i128,
            self.finish_to as i128,
        );
        // starts up to e1 may finish anywhere in [e1, e2]
        let early = (s2.min(e1) - s1 + 1) * (e2 - e1 + 1);
        // a start a > e1 may only finish in [a, e2]
        let late = if s2 > e1 {
            let n = s2 - e1;
            let first = e2 - e1;
            let last = e2 - s2 + 1;
            n * (first + last) / 2
        } else {
            0
        };
        u64::try_from(early + late).unwrap_or(u64::MAX)
    }

    /// Iterate over member intervals.
    pub fn intervals(&self) -> impl Iterator<Item = Interval> + '_ {
        let (s1, s2) = if self.is_empty() {
            (1, 0)
        } else {
            (self.start_from, self.start_to)
        };
        (s1..=s2).flat_map(move |a| {
            (self.finish_from.max(a)..=self.finish_to).map(move |b| Interval::new(a, b))
        })
    }

    pub fn intersect(&self, other: &SpanInterval) -> SpanInterval {
        SpanInterval::new(
            self.start_from.max(other.start_from),
            self.start_to.min(other.start_to),
            self.finish_from.max(other.finish_from),
            self.finish_to.min(other.finish_to),
            self.universe,
        )
    }

    pub fn overlaps(&self, other: &SpanInterval) -> bool {
        !self.intersect(other).is_empty()
    }

    /// Members of `self` that are not members of `other`, as disjoint spans.
    pub fn subtract(&self, other: &SpanInterval) -> Vec<SpanInterval> {
        let cut = self.intersect(other);
        if cut.is_empty() {
            return if self.is_empty() { Vec::new() } else { vec![*self] };
        }
        let universe = self.universe;
        [
            SpanInterval::new(
                self.start_from,
                cut.start_from - 1,
                self.finish_from,
                self.finish_to,
                universe,
            ),
            SpanInterval::new(
                cut.start_to + 1,
                self.start_to,
                self.finish_from,
                self.finish_to,
                universe,
            ),
            SpanInterval::new(
                cut.start_from,
                cut.start_to,
                self.finish_from,
                cut.finish_from - 1,
                universe,
            ),
            SpanInterval::new(
                cut.start_from,
                cut.start_to,
                cut.finish_to + 1,
                self.finish_to,
                universe,
            ),
        ]
        .into_iter()
        .filter(|piece| !piece.is_empty())
        .collect()
    }

    /// The tightest span of universe intervals `I` with `I rel J` for some
    /// member `J` of this span, or `None` if no such `I` exists.
    ///
    /// Exact for `=`, `<`, `>`, `m`, `mi`, `s`, `d` and `f`. For the other
    /// relations the result may also admit intervals too short to relate to
    /// any member.
    pub fn satisfies_relation(&self, rel: Relation) -> Option<SpanInterval> {
        if self.is_empty() {
            return None;
        }
        let u = (self.universe.start(), self.universe.finish());
        let ranges = [
            u,
            u,
            (self.start_from, self.start_to),
            (self.finish_from, self.finish_to),
        ];
        let tightened = relation::tighten(rel, ranges)?;
        let span = SpanInterval::new(
            tightened[XS].0,
            tightened[XS].1,
            tightened[XF].0,
            tightened[XF].1,
            self.universe,
        );
        (!span.is_empty()).then_some(span)
    }

    /// The tightest span containing `span(x, y)` (first start to last finish)
    /// for every `x` in `self` and `y` in `other` with `x rel y`.
    pub fn compose(&self, other: &SpanInterval, rel: Relation) -> Option<SpanInterval> {
        if self.is_empty() || other.is_empty() {
            return None;
        }
        let ranges: [Range; 4] = [
            (self.start_from, self.start_to),
            (self.finish_from, self.finish_to),
            (other.start_from, other.start_to),
            (other.finish_from, other.finish_to),
        ];
        let tightened = relation::tighten(rel, ranges)?;
        let (first, last) = composed_endpoints(rel);
        let span = SpanInterval::new(
            tightened[first].0,
            tightened[first].1,
            tightened[last].0,
            tightened[last].1,
            self.universe,
        );
        (!span.is_empty()).then_some(span)
    }
}

/// Which endpoints start and finish `span(x, y)` when `x rel y`.
fn composed_endpoints(rel: Relation) -> (usize, usize) {
    let first = match rel {
        Relation::Equals
        | Relation::Before
        | Relation::Meets
        | Relation::Overlaps
        | Relation::Starts
        | Relation::StartedBy
        | Relation::Contains
        | Relation::FinishedBy => XS,
        _ => YS,
    };
    let last = match rel {
        Relation::Before
        | Relation::Meets
        | Relation::Overlaps
        | Relation::Starts
        | Relation::During
        | Relation::Finishes
        | Relation::FinishedBy => YF,
        _ => XF,
    };
    (first, last)
}

impl fmt::Display for SpanInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "[]")
        } else if self.start_from == self.finish_from && self.start_to == self.finish_to {
            write!(f, "[{}:{}]", self.start_from, self.start_to)
        } else {
            write!(
                f,
                "[({}, {}), ({}, {})]",
                self.start_from, self.start_to, self.finish_from, self.finish_to
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn universe() -> Interval {
        Interval::new(1, 20)
    }

    // === Construction tests ===

    #[test]
    fn test_construction_clips_to_universe() {
        let sp = SpanInterval::new(-5, 3, 15, 40, universe());
        assert_eq!(sp.start(), Some(Interval::new(1, 3)));
        assert_eq!(sp.finish(), Some(Interval::new(15, 20)));
    }

    #[test]
    fn test_construction_tightens_ordering() {
        // finishes before the earliest start are impossible
        let sp = SpanInterval::new(5, 10, 1, 7, universe());
        assert_eq!(sp.start(), Some(Interval::new(5, 7)));
        assert_eq!(sp.finish(), Some(Interval::new(5, 7)));
        assert!(sp.is_liquid());
    }

    #[test]
    fn test_empty_span() {
        let sp = SpanInterval::new(10, 12, 1, 5, universe());
        assert!(sp.is_empty());
        assert_eq!(sp, SpanInterval::empty(universe()));
        assert_eq!(sp.size(), 0);
        assert_eq!(sp.intervals().count(), 0);
    }

    // === Size tests ===

    #[test]
    fn test_liquid_size_is_triangular() {
        assert_eq!(SpanInterval::liquid(1, 10, universe()).size(), 55);
    }

    #[test]
    fn test_size_matches_enumeration() {
        let u = Interval::new(1, 8);
        for (s1, s2, e1, e2) in [(1, 3, 2, 6), (2, 7, 1, 4), (1, 8, 1, 8), (4, 4, 6, 6)] {
            let sp = SpanInterval::new(s1, s2, e1, e2, u);
            assert_eq!(sp.size(), sp.intervals().count() as u64, "{}", sp);
        }
    }

    // === Set algebra tests ===

    #[test]
    fn test_subtract_liquid_prefix() {
        let whole = SpanInterval::liquid(1, 20, universe());
        let prefix = SpanInterval::liquid(1, 10, universe());
        let mut pieces = whole.subtract(&prefix);
        pieces.sort();
        let rendered: Vec<String> = pieces.iter().map(|p| p.to_string()).collect();
        assert_eq!(rendered, vec!["[(1, 10), (11, 20)]", "[11:20]"]);
    }

    #[test]
    fn test_subtract_is_exact() {
        let u = Interval::new(1, 7);
        let a = SpanInterval::new(1, 5, 2, 7, u);
        let b = SpanInterval::new(2, 3, 3, 5, u);
        let pieces = a.subtract(&b);
        for iv in u.subintervals() {
            let expected = a.contains(&iv) && !b.contains(&iv);
            let hits = pieces.iter().filter(|p| p.contains(&iv)).count();
            assert_eq!(hits, usize::from(expected), "{}", iv);
        }
    }

    #[test]
    fn test_subtract_disjoint_returns_self() {
        let a = SpanInterval::liquid(1, 5, universe());
        let b = SpanInterval::liquid(10, 12, universe());
        assert_eq!(a.subtract(&b), vec![a]);
    }

    // === Relation query tests ===

    #[test]
    fn test_meets_query() {
        let sp = SpanInterval::liquid(11, 20, universe());
        let met = sp.satisfies_relation(Relation::Meets).expect("some interval meets");
        assert_eq!(met.start(), Some(Interval::new(1, 19)));
        assert_eq!(met.finish(), Some(Interval::new(10, 19)));
    }

    #[test]
    fn test_relations_past_universe_edges() {
        let early = SpanInterval::liquid(1, 2, universe());
        assert_eq!(early.satisfies_relation(Relation::Before), None);
        let after = early.satisfies_relation(Relation::After).expect("room after [1:2]");
        assert_eq!(after.start(), Some(Interval::new(3, 20)));
        assert!(after.contains(&Interval::new(3, 3)));
        assert!(!after.contains(&Interval::new(2, 5)));

        let late = SpanInterval::liquid(19, 20, universe());
        assert_eq!(late.satisfies_relation(Relation::After), None);
        assert!(late.satisfies_relation(Relation::Before).is_some());
    }

    #[test]
    fn test_relation_query_is_exact_for_during() {
        let u = Interval::new(1, 7);
        let sp = SpanInterval::new(1, 3, 4, 7, u);
        let result = sp.satisfies_relation(Relation::During).expect("during exists");
        for iv in u.subintervals() {
            let expected = sp.intervals().any(|j| Relation::During.holds(&iv, &j));
            assert_eq!(result.contains(&iv), expected, "{}", iv);
        }
    }

    #[test]
    fn test_compose_equals_is_intersection() {
        let a = SpanInterval::liquid(1, 10, universe());
        let b = SpanInterval::liquid(5, 15, universe());
        assert_eq!(
            a.compose(&b, Relation::Equals),
            Some(SpanInterval::liquid(5, 10, universe()))
        );
    }

    #[test]
    fn test_compose_meets_spans_both() {
        let a = SpanInterval::from_interval(Interval::new(1, 4), universe());
        let b = SpanInterval::from_interval(Interval::new(5, 9), universe());
        let composed = a.compose(&b, Relation::Meets).expect("they meet");
        assert_eq!(composed, SpanInterval::from_interval(Interval::new(1, 9), universe()));
        assert_eq!(b.compose(&a, Relation::Meets), None);
    }

    // === Display tests ===

    #[test]
    fn test_display_forms() {
        assert_eq!(SpanInterval::liquid(1, 10, universe()).to_string(), "[1:10]");
        assert_eq!(
            SpanInterval::new(1, 10, 11, 20, universe()).to_string(),
            "[(1, 10), (11, 20)]"
        );
    }
}
