use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeSet;
use std::sync::Arc;

use eventlogic::domain::{Domain, DomainConfig};
use eventlogic::error::EngineError;
use eventlogic::inference::{MaxWalkSat, MaxWalkSatConfig};
use eventlogic::interval::{intersection, Interval, Relation, SISet, SpanInterval};
use eventlogic::model::Model;
use eventlogic::syntax::{Atom, ELSentence, Sentence, Weight};

// ============================================================================
// Strategies
// ============================================================================

fn universe() -> Interval {
    Interval::new(1, 6)
}

prop_compose! {
    fn any_span()(a in 1i64..=6, b in 1i64..=6, c in 1i64..=6, d in 1i64..=6) -> SpanInterval {
        SpanInterval::new(a, b, c, d, universe())
    }
}

prop_compose! {
    fn any_siset()(liquid in any::<bool>(), spans in prop::collection::vec(any_span(), 0..4)) -> SISet {
        SISet::from_spans(spans, liquid, universe())
    }
}

fn any_relation() -> impl Strategy<Value = Relation> {
    prop::sample::select(Relation::ALL.to_vec())
}

fn any_atom() -> impl Strategy<Value = Arc<Sentence>> {
    prop::sample::select(vec!["P", "Q", "R"])
        .prop_map(|name| Arc::new(Sentence::atom(Atom::ground(name, &["a"]))))
}

/// Sentences without diamonds, so every one can sit inside liquid brackets.
fn any_sentence() -> impl Strategy<Value = Arc<Sentence>> {
    let leaf = prop_oneof![
        4 => any_atom(),
        1 => any::<bool>().prop_map(|b| Arc::new(Sentence::BoolLit(b))),
    ];
    leaf.prop_recursive(3, 12, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|s| Arc::new(Sentence::negation(s))),
            (inner.clone(), inner.clone())
                .prop_map(|(l, r)| Arc::new(Sentence::disjunction(l, r))),
            (inner.clone(), inner.clone(), prop::collection::btree_set(any_relation(), 1..3))
                .prop_map(|(l, r, rels)| Arc::new(Sentence::conjunction_with(l, r, rels))),
            inner.prop_map(|s| Arc::new(Sentence::liquid(s))),
        ]
    })
}

/// Sentences with diamonds but no liquid brackets.
fn any_modal_sentence() -> impl Strategy<Value = Arc<Sentence>> {
    any_atom().prop_recursive(3, 12, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|s| Arc::new(Sentence::negation(s))),
            (inner.clone(), inner.clone())
                .prop_map(|(l, r)| Arc::new(Sentence::disjunction(l, r))),
            (inner.clone(), prop::collection::btree_set(any_relation(), 1..3))
                .prop_map(|(s, rels)| Arc::new(Sentence::diamond_with(s, rels, None))),
        ]
    })
}

prop_compose! {
    fn any_model()(p in any_siset(), q in any_siset(), r in any_siset()) -> Model {
        let mut model = Model::new(universe());
        for (name, set) in [("P", p), ("Q", q), ("R", r)] {
            model.set_atom(&Atom::ground(name, &["a"]), &set);
        }
        model
    }
}

fn domain() -> Domain {
    Domain::new(universe(), DomainConfig::default())
}

fn brute_force(set: &SISet) -> BTreeSet<Interval> {
    universe()
        .subintervals()
        .filter(|iv| set.contains_interval(iv))
        .collect()
}

// ============================================================================
// Region algebra
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_double_complement(set in any_siset()) {
        let mut normalized = set.clone();
        normalized.make_disjoint();
        prop_assert_eq!(set.compliment().compliment(), normalized);
    }

    #[test]
    fn prop_span_subtraction_matches_brute_force(a in any_span(), b in any_span()) {
        let pieces = a.subtract(&b);
        let expected: BTreeSet<Interval> = a.intervals().filter(|iv| !b.contains(iv)).collect();
        let mut actual = BTreeSet::new();
        for piece in &pieces {
            for iv in piece.intervals() {
                // pieces never overlap
                prop_assert!(actual.insert(iv));
            }
        }
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn prop_size_counts_distinct_intervals(set in any_siset()) {
        let mut non_liquid = set.clone();
        non_liquid.set_force_liquid(false);
        prop_assert_eq!(non_liquid.size() as usize, brute_force(&non_liquid).len());
    }

    #[test]
    fn prop_relation_result_is_sound(span in any_span(), rel in any_relation()) {
        let related: BTreeSet<Interval> = universe()
            .subintervals()
            .filter(|x| span.intervals().any(|y| rel.holds(x, &y)))
            .collect();
        match span.satisfies_relation(rel) {
            Some(result) => {
                for x in &related {
                    prop_assert!(result.contains(x), "{} misses {}", rel, x);
                }
                let exact = matches!(
                    rel,
                    Relation::Equals | Relation::Before | Relation::After | Relation::Meets
                        | Relation::MetBy | Relation::Starts | Relation::During | Relation::Finishes
                );
                if exact {
                    let produced: BTreeSet<Interval> = result.intervals().collect();
                    prop_assert_eq!(produced, related);
                }
            }
            None => prop_assert!(related.is_empty()),
        }
    }
}

// ============================================================================
// Satisfaction laws
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_negation_is_complement(s in any_sentence(), model in any_model()) {
        let d = domain();
        let negated = d.satisfied(&Sentence::negation(s.clone()), &model).unwrap();
        prop_assert_eq!(negated, d.satisfied(&s, &model).unwrap().compliment());
    }

    #[test]
    fn prop_modal_negation_is_complement(s in any_modal_sentence(), model in any_model()) {
        let d = domain();
        let negated = d.satisfied(&Sentence::negation(s.clone()), &model).unwrap();
        prop_assert_eq!(negated, d.satisfied(&s, &model).unwrap().compliment());
    }

    #[test]
    fn prop_disjunction_is_union(l in any_sentence(), r in any_sentence(), model in any_model()) {
        let d = domain();
        let both = d.satisfied(&Sentence::disjunction(l.clone(), r.clone()), &model).unwrap();
        let mut union = d.satisfied(&l, &model).unwrap();
        union.add_set(&d.satisfied(&r, &model).unwrap());
        prop_assert_eq!(both, union);
    }

    #[test]
    fn prop_liquid_conjunction_is_intersection(
        l in any_sentence(),
        r in any_sentence(),
        model in any_model(),
    ) {
        let d = domain();
        let both = d.liq_satisfied(&Sentence::conjunction(l.clone(), r.clone()), &model).unwrap();
        let expected = intersection(
            &d.liq_satisfied(&l, &model).unwrap(),
            &d.liq_satisfied(&r, &model).unwrap(),
        );
        prop_assert_eq!(both, expected);
    }
}

// ============================================================================
// Scoring and search
// ============================================================================

fn weighted(sentence: Arc<Sentence>, weight: f64) -> ELSentence {
    ELSentence::new(sentence).with_weight(Weight::Finite(weight))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_score_is_non_negative(
        formulas in prop::collection::vec((any_sentence(), 0.0f64..5.0), 1..4),
        model in any_model(),
    ) {
        let mut d = domain();
        for (s, w) in formulas {
            d.add_formula(weighted(s, w));
        }
        prop_assert!(d.score(&model).unwrap() >= 0.0);
    }

    #[test]
    fn prop_adding_satisfying_region_never_lowers_score(
        extra in any_siset(),
        weight in 0.0f64..5.0,
        model in any_model(),
    ) {
        let p = Atom::ground("P", &["a"]);
        let mut d = domain();
        d.add_formula(weighted(Arc::new(Sentence::atom(p.clone())), weight));
        let before = d.score(&model).unwrap();
        let mut grown = model.clone();
        grown.set_atom(&p, &extra);
        prop_assert!(d.score(&grown).unwrap() >= before);
    }

    #[test]
    fn prop_maxwalksat_never_worse_than_start(
        formulas in prop::collection::vec((any_sentence(), 0.5f64..3.0), 1..3),
        iterations in 0usize..12,
        seed in any::<u64>(),
        initial in any_model(),
    ) {
        let mut d = domain();
        for (s, w) in formulas {
            d.add_formula(weighted(s, w));
        }
        let start_score = d.score(&initial).unwrap();
        let config = MaxWalkSatConfig { max_iterations: iterations, ..MaxWalkSatConfig::default() };
        let mut rng = StdRng::seed_from_u64(seed);
        match MaxWalkSat::new(&d).with_config(config).run_from(&mut rng, initial) {
            Ok(outcome) => prop_assert!(outcome.score >= start_score),
            Err(EngineError::SolverConfiguration(_)) => {}
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}
