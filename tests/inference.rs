use rand::rngs::StdRng;
use rand::SeedableRng;

use eventlogic::domain::{Domain, DomainConfig};
use eventlogic::error::EngineError;
use eventlogic::inference::{McSat, McSatConfig, MaxWalkSat};
use eventlogic::interval::{Interval, SISet};
use eventlogic::model::Model;
use eventlogic::parser::load_domain;
use eventlogic::syntax::Atom;

const DP_FACTS: &str = "D-P(a) @ [1:10]\n";
const DP_FORMULAS: &str = "1: [ D-P(a) -> P(a) ] @ [1:15]\ninf: P(a) -> Q(a)\n";

fn domain(facts: &str, formulas: &str) -> Domain {
    load_domain(facts, formulas, DomainConfig::default()).expect("domain parses")
}

fn small_sampler() -> McSatConfig {
    McSatConfig {
        num_samples: 20,
        burn_in: 3,
        walksat_iterations: 10,
        ..McSatConfig::default()
    }
}

// ============================================================================
// MaxWalkSat
// ============================================================================

#[test]
fn test_maxwalksat_repairs_implication_with_only_legal_move() {
    // Q is observed, so the only repair is making P true over [1:10]
    let d = domain("Q(a) @ [1:10]\n", "2: Q(a) -> P(a) @ [1:10]\n");
    let mut rng = StdRng::seed_from_u64(7);
    let outcome = MaxWalkSat::new(&d).run(&mut rng).unwrap();

    assert_eq!(outcome.iterations, 1);
    assert_eq!(outcome.score, 110.0);
    let p = outcome.model.get_atom(&Atom::ground("P", &["a"]));
    assert!(p.contains_interval(&Interval::new(1, 10)));
    assert!(d.is_fully_satisfied(&outcome.model).unwrap());
}

#[test]
fn test_maxwalksat_falsifies_atom_under_liquid_negation() {
    let d = domain("", "1: [ !P(a) ] @ [1:10]\n");
    let p = Atom::ground("P", &["a"]);
    let mut start = Model::new(d.max_interval());
    start.set_atom(&p, &SISet::universe(true, d.max_interval()));
    assert_eq!(d.score(&start).unwrap(), 0.0);

    let mut rng = StdRng::seed_from_u64(5);
    let outcome = MaxWalkSat::new(&d).run_from(&mut rng, start).unwrap();

    assert_eq!(outcome.iterations, 1);
    assert_eq!(outcome.score, 55.0);
    assert!(outcome.model.has_atom(&p));
    assert!(outcome.model.get_atom(&p).is_empty());
    assert!(d.is_fully_satisfied(&outcome.model).unwrap());
}

#[test]
fn test_maxwalksat_rejects_unpropagated_hard_formula() {
    let d = domain(DP_FACTS, DP_FORMULAS);
    let mut rng = StdRng::seed_from_u64(0);
    assert!(matches!(
        MaxWalkSat::new(&d).run(&mut rng),
        Err(EngineError::SolverConfiguration(_))
    ));
}

#[test]
fn test_maxwalksat_is_reproducible_per_seed() {
    let d = domain("Q(a) @ [1:6]\nR(a) @ [4:9]\n", "Q(a) -> P(a)\n3: R(a) -> !P(a)\n");
    let run = |seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        MaxWalkSat::new(&d).run(&mut rng).unwrap()
    };
    let first = run(11);
    let second = run(11);
    assert_eq!(first.score, second.score);
    assert_eq!(first.model, second.model);
    assert!(first.score >= d.score(&d.default_model()).unwrap());
}

// ============================================================================
// MC-SAT
// ============================================================================

#[test]
fn test_mcsat_collects_configured_samples() {
    let d = domain(DP_FACTS, DP_FORMULAS);
    let mut rng = StdRng::seed_from_u64(42);
    let mut sampler = McSat::new(&d).with_config(small_sampler());
    sampler.run(&mut rng).unwrap();

    assert_eq!(sampler.size(), 20);
    assert_eq!(sampler.samples().len(), 20);
    for atom in d.atoms() {
        let freq = sampler.frequency(atom, &Interval::new(1, 10));
        assert!((0.0..=1.0).contains(&freq), "{} has frequency {}", atom, freq);
    }
}

#[test]
fn test_mcsat_samples_keep_observations() {
    let d = domain(DP_FACTS, DP_FORMULAS);
    let mut rng = StdRng::seed_from_u64(3);
    let mut sampler = McSat::new(&d).with_config(small_sampler());
    sampler.run(&mut rng).unwrap();

    let dp = Atom::ground("D-P", &["a"]);
    assert_eq!(sampler.frequency(&dp, &Interval::new(2, 9)), 1.0);
}

#[test]
fn test_mcsat_is_reproducible_per_seed() {
    let d = domain(DP_FACTS, DP_FORMULAS);
    let draw = |seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut sampler = McSat::new(&d).with_config(small_sampler());
        sampler.run(&mut rng).unwrap();
        sampler.samples().to_vec()
    };
    assert_eq!(draw(5), draw(5));
}

#[test]
fn test_mcsat_reports_contradiction() {
    let d = domain("P(a) @ [1:5]\n", "inf: !P(a)\n");
    let mut rng = StdRng::seed_from_u64(0);
    let mut sampler = McSat::new(&d).with_config(small_sampler());
    assert!(matches!(
        sampler.run(&mut rng),
        Err(EngineError::Contradiction { .. })
    ));
    assert_eq!(sampler.size(), 0);
}
