//! MC-SAT: sampling models by repeated constrained local search.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::maxwalksat::{MaxWalkSat, MaxWalkSatConfig};
use super::moves::can_find_moves_for;
use crate::domain::Domain;
use crate::error::Result;
use crate::interval::Interval;
use crate::model::Model;
use crate::syntax::{Atom, ELSentence, Weight};
use crate::unitprop::propagate_domain;

pub const DEFAULT_NUM_SAMPLES: usize = 100;

/// Sampler parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct McSatConfig {
    pub num_samples: usize,
    /// Steps taken before samples are recorded.
    pub burn_in: usize,
    /// MaxWalkSat iterations per step.
    pub walksat_iterations: usize,
    pub random_move_probability: f64,
}

impl Default for McSatConfig {
    fn default() -> Self {
        McSatConfig {
            num_samples: DEFAULT_NUM_SAMPLES,
            burn_in: 10,
            walksat_iterations: 20,
            random_move_probability: 0.2,
        }
    }
}

/// A sampler over one domain. Samples accumulate in `run`.
pub struct McSat<'a> {
    domain: &'a Domain,
    config: McSatConfig,
    samples: Vec<Model>,
}

impl<'a> McSat<'a> {
    pub fn new(domain: &'a Domain) -> Self {
        McSat {
            domain,
            config: McSatConfig::default(),
            samples: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: McSatConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &McSatConfig {
        &self.config
    }

    /// Draw `num_samples` models, replacing any earlier samples.
    ///
    /// The domain is unit propagated first, so a contradiction among the
    /// observations and hard formulas is returned as an error. Each step
    /// keeps the formulas the current state satisfies (hard ones always,
    /// soft ones with probability `1 - e^-w`) and searches from a fresh
    /// random model for a state satisfying all of them.
    pub fn run<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        self.samples.clear();
        let propagated = propagate_domain(self.domain)?;
        let (hard, soft): (Vec<ELSentence>, Vec<ELSentence>) = propagated
            .formulas()
            .iter()
            .cloned()
            .partition(ELSentence::has_infinite_weight);

        let start = propagated.default_model();
        let mut state = self.solve(&propagated, unit_weighted(hard.iter()), rng, start)?;

        let steps = self.config.burn_in + self.config.num_samples;
        for step in 0..steps {
            let mut kept: Vec<&ELSentence> = hard.iter().collect();
            for formula in &soft {
                let keep_probability = (1.0 - (-formula.weight.value()).exp()).clamp(0.0, 1.0);
                if formula.fully_satisfied(&state, &propagated)? && rng.gen_bool(keep_probability) {
                    kept.push(formula);
                }
            }
            debug!(step, kept = kept.len(), "sampling step");

            let start = propagated.random_model(rng);
            state = self.solve(&propagated, unit_weighted(kept.into_iter()), rng, start)?;
            if step >= self.config.burn_in {
                self.samples.push(state.clone());
            }
        }
        info!(samples = self.samples.len(), "sampling finished");
        Ok(())
    }

    /// MaxWalkSat over `formulas` from `start`. Formulas without moves are
    /// left out; with nothing left to search, `start` is returned as is.
    fn solve<R: Rng + ?Sized>(
        &self,
        propagated: &Domain,
        formulas: Vec<ELSentence>,
        rng: &mut R,
        start: Model,
    ) -> Result<Model> {
        let formulas: Vec<ELSentence> = formulas
            .into_iter()
            .filter(|f| can_find_moves_for(&f.sentence))
            .collect();
        if formulas.is_empty() {
            return Ok(start);
        }
        let constrained = propagated.with_formulas(formulas);
        let config = MaxWalkSatConfig {
            max_iterations: self.config.walksat_iterations,
            random_move_probability: self.config.random_move_probability,
        };
        let outcome = MaxWalkSat::new(&constrained)
            .with_config(config)
            .run_from(rng, start)?;
        Ok(outcome.model)
    }

    /// Number of recorded samples.
    pub fn size(&self) -> usize {
        self.samples.len()
    }

    pub fn samples(&self) -> &[Model] {
        &self.samples
    }

    /// Fraction of samples in which `atom` holds over `interval`.
    pub fn frequency(&self, atom: &Atom, interval: &Interval) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let hits = self
            .samples
            .iter()
            .filter(|model| model.get_atom(atom).contains_interval(interval))
            .count();
        hits as f64 / self.samples.len() as f64
    }
}

fn unit_weighted<'f, I>(formulas: I) -> Vec<ELSentence>
where
    I: Iterator<Item = &'f ELSentence>,
{
    formulas
        .map(|f| f.clone().with_weight(Weight::Finite(1.0)))
        .collect()
}
