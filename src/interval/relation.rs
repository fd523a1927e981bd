//! Allen interval relations over closed integer intervals.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::interval::{Interval, Time};

/// The thirteen Allen relations, read as `x rel y`.
///
/// Intervals are closed and discrete, so `x` meets `y` when `y` starts on
/// the point right after `x` finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Relation {
    Equals,
    Before,
    After,
    Meets,
    MetBy,
    Overlaps,
    OverlappedBy,
    Starts,
    StartedBy,
    During,
    Contains,
    Finishes,
    FinishedBy,
}

/// Endpoint indices of a pair `x rel y`.
pub(crate) const XS: usize = 0;
pub(crate) const XF: usize = 1;
pub(crate) const YS: usize = 2;
pub(crate) const YF: usize = 3;

/// `(lhs, rhs, offset)` encodes `endpoint[lhs] + offset <= endpoint[rhs]`.
type EndpointBound = (usize, usize, Time);

/// Inclusive range of values an endpoint may take.
pub(crate) type Range = (Time, Time);

impl Relation {
    pub const ALL: [Relation; 13] = [
        Relation::Equals,
        Relation::Before,
        Relation::After,
        Relation::Meets,
        Relation::MetBy,
        Relation::Overlaps,
        Relation::OverlappedBy,
        Relation::Starts,
        Relation::StartedBy,
        Relation::During,
        Relation::Contains,
        Relation::Finishes,
        Relation::FinishedBy,
    ];

    /// The relation `r'` with `x r y <=> y r' x`.
    pub fn inverse(self) -> Relation {
        match self {
            Relation::Equals => Relation::Equals,
            Relation::Before => Relation::After,
            Relation::After => Relation::Before,
            Relation::Meets => Relation::MetBy,
            Relation::MetBy => Relation::Meets,
            Relation::Overlaps => Relation::OverlappedBy,
            Relation::OverlappedBy => Relation::Overlaps,
            Relation::Starts => Relation::StartedBy,
            Relation::StartedBy => Relation::Starts,
            Relation::During => Relation::Contains,
            Relation::Contains => Relation::During,
            Relation::Finishes => Relation::FinishedBy,
            Relation::FinishedBy => Relation::Finishes,
        }
    }

    /// Surface syntax symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Equals => "=",
            Relation::Before => "<",
            Relation::After => ">",
            Relation::Meets => "m",
            Relation::MetBy => "mi",
            Relation::Overlaps => "o",
            Relation::OverlappedBy => "oi",
            Relation::Starts => "s",
            Relation::StartedBy => "si",
            Relation::During => "d",
            Relation::Contains => "di",
            Relation::Finishes => "f",
            Relation::FinishedBy => "fi",
        }
    }

    /// Check whether `x self y` holds for two concrete intervals.
    pub fn holds(self, x: &Interval, y: &Interval) -> bool {
        let (xs, xf, ys, yf) = (x.start(), x.finish(), y.start(), y.finish());
        match self {
            Relation::Equals => xs == ys && xf == yf,
            Relation::Before => xf + 1 < ys,
            Relation::After => yf + 1 < xs,
            Relation::Meets => xf + 1 == ys,
            Relation::MetBy => yf + 1 == xs,
            Relation::Overlaps => xs < ys && ys <= xf && xf < yf,
            Relation::OverlappedBy => ys < xs && xs <= yf && yf < xf,
            Relation::Starts => xs == ys && xf < yf,
            Relation::StartedBy => xs == ys && yf < xf,
            Relation::During => ys < xs && xf < yf,
            Relation::Contains => xs < ys && yf < xf,
            Relation::Finishes => ys < xs && xf == yf,
            Relation::FinishedBy => xs < ys && xf == yf,
        }
    }

    /// The relation as difference constraints between the endpoints of `x` and `y`.
    fn endpoint_bounds(self) -> Vec<EndpointBound> {
        match self {
            Relation::Equals => vec![(XS, YS, 0), (YS, XS, 0), (XF, YF, 0), (YF, XF, 0)],
            Relation::Before => vec![(XF, YS, 2)],
            Relation::Meets => vec![(XF, YS, 1), (YS, XF, -1)],
            Relation::Overlaps => vec![(XS, YS, 1), (YS, XF, 0), (XF, YF, 1)],
            Relation::Starts => vec![(XS, YS, 0), (YS, XS, 0), (XF, YF, 1)],
            Relation::During => vec![(YS, XS, 1), (XF, YF, 1)],
            Relation::Finishes => vec![(YS, XS, 1), (XF, YF, 0), (YF, XF, 0)],
            inverse => inverse
                .inverse()
                .endpoint_bounds()
                .into_iter()
                .map(|(lhs, rhs, offset)| (swap_sides(lhs), swap_sides(rhs), offset))
                .collect(),
        }
    }
}

fn swap_sides(endpoint: usize) -> usize {
    (endpoint + 2) % 4
}

/// Narrow the endpoint ranges of `x rel y` to the values that take part in
/// at least one solution, or `None` when the relation cannot hold.
///
/// The constraints form a difference system over four variables, so a few
/// rounds of bound propagation reach the minimal ranges.
pub(crate) fn tighten(relation: Relation, ranges: [Range; 4]) -> Option<[Range; 4]> {
    let mut bounds = relation.endpoint_bounds();
    bounds.push((XS, XF, 0));
    bounds.push((YS, YF, 0));

    let mut ranges = ranges;
    for _ in 0..=ranges.len() {
        let mut changed = false;
        for &(lhs, rhs, offset) in &bounds {
            if ranges[lhs].0 + offset > ranges[rhs].0 {
                ranges[rhs].0 = ranges[lhs].0 + offset;
                changed = true;
            }
            if ranges[rhs].1 - offset < ranges[lhs].1 {
                ranges[lhs].1 = ranges[rhs].1 - offset;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    if ranges.iter().any(|(lo, hi)| lo > hi) {
        None
    } else {
        Some(ranges)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown interval relation `{0}`")]
pub struct UnknownRelation(pub String);

impl FromStr for Relation {
    type Err = UnknownRelation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Relation::ALL
            .iter()
            .copied()
            .find(|rel| rel.symbol() == s)
            .ok_or_else(|| UnknownRelation(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_intervals() -> Vec<Interval> {
        Interval::new(1, 6).subintervals().collect()
    }

    // === Concrete relation tests ===

    #[test]
    fn test_meets_is_adjacency() {
        assert!(Relation::Meets.holds(&Interval::new(1, 10), &Interval::new(11, 20)));
        assert!(!Relation::Meets.holds(&Interval::new(1, 10), &Interval::new(10, 20)));
        assert!(Relation::Before.holds(&Interval::new(1, 10), &Interval::new(12, 20)));
    }

    #[test]
    fn test_exactly_one_relation_holds() {
        let ivs = small_intervals();
        for x in &ivs {
            for y in &ivs {
                let count = Relation::ALL.iter().filter(|r| r.holds(x, y)).count();
                assert_eq!(count, 1, "{} vs {}", x, y);
            }
        }
    }

    #[test]
    fn test_inverse_swaps_arguments() {
        let ivs = small_intervals();
        for rel in Relation::ALL {
            assert_eq!(rel.inverse().inverse(), rel);
            for x in &ivs {
                for y in &ivs {
                    assert_eq!(rel.holds(x, y), rel.inverse().holds(y, x));
                }
            }
        }
    }

    // === Endpoint constraint tests ===

    #[test]
    fn test_endpoint_bounds_agree_with_holds() {
        let ivs = small_intervals();
        for rel in Relation::ALL {
            let bounds = rel.endpoint_bounds();
            for x in &ivs {
                for y in &ivs {
                    let e = [x.start(), x.finish(), y.start(), y.finish()];
                    let by_bounds = bounds.iter().all(|&(l, r, c)| e[l] + c <= e[r]);
                    assert_eq!(by_bounds, rel.holds(x, y), "{:?} {} {}", rel, x, y);
                }
            }
        }
    }

    #[test]
    fn test_tighten_detects_impossible_relation() {
        // x inside [5, 6] can never be before y inside [1, 6]
        let ranges = [(5, 6), (5, 6), (1, 6), (1, 6)];
        assert_eq!(tighten(Relation::Before, ranges), None);
    }

    #[test]
    fn test_tighten_meets_fixes_finish() {
        let ranges = [(1, 20), (1, 20), (11, 11), (11, 20)];
        let tightened = tighten(Relation::Meets, ranges).expect("feasible");
        assert_eq!(tightened[XF], (10, 10));
        assert_eq!(tightened[XS], (1, 10));
    }

    // === Parsing tests ===

    #[test]
    fn test_symbol_round_trip() {
        for rel in Relation::ALL {
            assert_eq!(rel.symbol().parse::<Relation>(), Ok(rel));
        }
        assert!("zz".parse::<Relation>().is_err());
    }
}
