//! The domain: formulas, observations and the temporal universe.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use tracing::debug;

use super::config::DomainConfig;
use crate::error::{EngineError, Result};
use crate::interval::{intersection, subtract, Interval, SISet};
use crate::model::Model;
use crate::syntax::{Atom, ELSentence, Proposition, Weight};

/// Everything inference needs to know about a problem.
///
/// A domain is built incrementally with `add_formula` and `add_observation`
/// and is read-only afterwards. Every set it holds is bounded by
/// `max_interval`; growing the universe re-bounds all of them at once.
#[derive(Debug, Clone)]
pub struct Domain {
    max_interval: Interval,
    formulas: Vec<ELSentence>,
    observations: BTreeMap<Proposition, SISet>,
    config: DomainConfig,
    all_atoms: BTreeSet<Atom>,
    predicate_types: BTreeMap<String, usize>,
}

impl Domain {
    pub fn new(max_interval: Interval, config: DomainConfig) -> Self {
        Domain {
            max_interval,
            formulas: Vec::new(),
            observations: BTreeMap::new(),
            config,
            all_atoms: BTreeSet::new(),
            predicate_types: BTreeMap::new(),
        }
    }

    pub fn max_interval(&self) -> Interval {
        self.max_interval
    }

    pub fn formulas(&self) -> &[ELSentence] {
        &self.formulas
    }

    pub fn observations(&self) -> &BTreeMap<Proposition, SISet> {
        &self.observations
    }

    pub fn config(&self) -> &DomainConfig {
        &self.config
    }

    /// Every atom mentioned by a formula or an observation.
    pub fn atoms(&self) -> &BTreeSet<Atom> {
        &self.all_atoms
    }

    /// Predicate names with their arities.
    pub fn predicate_types(&self) -> &BTreeMap<String, usize> {
        &self.predicate_types
    }

    pub fn is_liquid(&self, predicate: &str) -> bool {
        self.config.liquidity.is_liquid(predicate)
    }

    pub fn add_formula(&mut self, mut formula: ELSentence) {
        if let Some(hull) = formula.quantification.as_ref().and_then(SISet::points_hull) {
            self.grow_to(hull);
        }
        if let Some(q) = formula.quantification.as_mut() {
            q.set_max_interval(self.max_interval);
        }
        for atom in formula.sentence.atoms() {
            self.register_atom(atom);
        }
        self.formulas.push(formula);
    }

    /// Record that `prop` holds over `region`. Repeated observations of the
    /// same proposition accumulate.
    pub fn add_observation(&mut self, prop: Proposition, region: &SISet) {
        if let Some(hull) = region.points_hull() {
            self.grow_to(hull);
        }
        let liquid = self.is_liquid(&prop.atom.predicate);
        let mut region = region.clone();
        region.set_max_interval(self.max_interval);
        region.set_force_liquid(liquid);

        self.register_atom(prop.atom.clone());
        let max = self.max_interval;
        self.observations
            .entry(prop)
            .or_insert_with(|| SISet::new(liquid, max))
            .add_set(&region);
    }

    /// Re-bound every formula quantification and observation to
    /// `max_interval`.
    pub fn set_max_interval(&mut self, max_interval: Interval) {
        self.max_interval = max_interval;
        for formula in &mut self.formulas {
            if let Some(q) = formula.quantification.as_mut() {
                q.set_max_interval(max_interval);
            }
        }
        for region in self.observations.values_mut() {
            region.set_max_interval(max_interval);
        }
    }

    fn grow_to(&mut self, hull: Interval) {
        let grown = self.max_interval.hull(&hull);
        if grown != self.max_interval {
            debug!(from = %self.max_interval, to = %grown, "growing domain universe");
            self.set_max_interval(grown);
        }
    }

    fn register_atom(&mut self, atom: Atom) {
        self.predicate_types
            .insert(atom.predicate.clone(), atom.arity());
        self.all_atoms.insert(atom);
    }

    /// A copy of this domain with a different formula set.
    pub fn with_formulas(&self, formulas: Vec<ELSentence>) -> Domain {
        let mut domain = Domain::new(self.max_interval, self.config.clone());
        for (prop, region) in &self.observations {
            domain.add_observation(prop.clone(), region);
        }
        for formula in formulas {
            domain.add_formula(formula);
        }
        domain
    }

    /// The region of `atom` inside `region` that a move may change.
    pub fn get_modifiable_siset(&self, atom: &Atom, region: &SISet) -> SISet {
        let mut modifiable = region.clone();
        modifiable.set_max_interval(self.max_interval);
        if self.is_liquid(&atom.predicate) {
            modifiable.set_force_liquid(true);
        }
        if self.config.dont_modify_obs_preds {
            for sign in [true, false] {
                if let Some(observed) = self.observations.get(&Proposition::new(atom.clone(), sign)) {
                    modifiable.subtract(observed);
                }
            }
        }
        modifiable
    }

    /// Observations alone as a model.
    pub fn observations_model(&self) -> Model {
        Model::from_propositions(self.observations.iter(), self.max_interval)
    }

    /// The model search starts from: observations only under the closed
    /// world assumption, otherwise every atom true wherever it is not
    /// observed false.
    pub fn default_model(&self) -> Model {
        if self.config.closed_world {
            return self.observations_model();
        }
        let mut model = Model::new(self.max_interval);
        for atom in &self.all_atoms {
            let universe = SISet::universe(self.is_liquid(&atom.predicate), self.max_interval);
            model.set_atom(atom, &universe);
        }
        for (prop, region) in &self.observations {
            if !prop.sign {
                model.unset_atom(&prop.atom, region);
            }
        }
        model
    }

    /// A random model that agrees with every observation.
    pub fn random_model<R: Rng + ?Sized>(&self, rng: &mut R) -> Model {
        let mut model = Model::new(self.max_interval);
        for atom in &self.all_atoms {
            let mut region = SISet::random(self.is_liquid(&atom.predicate), self.max_interval, rng);
            if let Some(observed) = self.observations.get(&Proposition::positive(atom.clone())) {
                region.add_set(observed);
            }
            if let Some(observed) = self.observations.get(&Proposition::negative(atom.clone())) {
                region.subtract(observed);
            }
            region.make_disjoint();
            model.set_atom(atom, &region);
        }
        model
    }

    /// The region a formula is asserted over.
    pub fn quantification_of(&self, formula: &ELSentence) -> SISet {
        match &formula.quantification {
            Some(q) => q.clone(),
            None => SISet::universe(false, self.max_interval),
        }
    }

    /// Number of quantified intervals where the formula holds, times its
    /// weight.
    pub fn score_formula(&self, formula: &ELSentence, model: &Model) -> Result<f64> {
        let sat = self.satisfied(&formula.sentence, model)?;
        let covered = intersection(&sat, &self.quantification_of(formula)).size();
        let score = match formula.weight {
            Weight::Infinite if covered == 0 => 0.0,
            weight => covered as f64 * weight.value(),
        };
        if !score.is_finite() {
            return Err(EngineError::NumericOverflow(format!(
                "score of `{}` is not finite",
                formula
            )));
        }
        Ok(score)
    }

    /// Sum of every formula's score.
    pub fn score(&self, model: &Model) -> Result<f64> {
        let mut total = 0.0;
        for formula in &self.formulas {
            total += self.score_formula(formula, model)?;
            if !total.is_finite() {
                return Err(EngineError::NumericOverflow(
                    "total model score is not finite".to_string(),
                ));
            }
        }
        Ok(total)
    }

    /// True if `formula` holds over its entire quantification.
    pub fn formula_fully_satisfied(&self, formula: &ELSentence, model: &Model) -> Result<bool> {
        let sat = self.satisfied(&formula.sentence, model)?;
        Ok(subtract(&self.quantification_of(formula), &sat).is_empty())
    }

    pub fn is_fully_satisfied(&self, model: &Model) -> Result<bool> {
        for formula in &self.formulas {
            if !self.formula_fully_satisfied(formula, model)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl ELSentence {
    /// True if the formula holds over its entire quantification in `model`.
    pub fn fully_satisfied(&self, model: &Model, domain: &Domain) -> Result<bool> {
        domain.formula_fully_satisfied(self, model)
    }
}
