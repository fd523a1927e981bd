//! MaxWalkSat: stochastic local search for a high-scoring model.

use std::collections::{BTreeSet, HashMap};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::moves::{can_find_moves_for, execute_move, find_moves_for, Move};
use crate::domain::Domain;
use crate::error::{EngineError, Result};
use crate::model::Model;
use crate::syntax::{Atom, ELSentence};

/// Search parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaxWalkSatConfig {
    pub max_iterations: usize,
    /// Chance of taking a random move instead of the best one.
    pub random_move_probability: f64,
}

impl Default for MaxWalkSatConfig {
    fn default() -> Self {
        MaxWalkSatConfig {
            max_iterations: 1000,
            random_move_probability: 0.2,
        }
    }
}

/// The best model a search found.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub model: Model,
    pub score: f64,
    pub iterations: usize,
}

/// A configured search over one domain.
pub struct MaxWalkSat<'a> {
    domain: &'a Domain,
    config: MaxWalkSatConfig,
}

impl<'a> MaxWalkSat<'a> {
    pub fn new(domain: &'a Domain) -> Self {
        MaxWalkSat {
            domain,
            config: MaxWalkSatConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MaxWalkSatConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &MaxWalkSatConfig {
        &self.config
    }

    /// Search from the domain's default model.
    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SearchOutcome> {
        self.run_from(rng, self.domain.default_model())
    }

    /// Search from `initial`.
    ///
    /// Each step picks a formula that is violated somewhere, generates the
    /// moves that would repair it, and applies either a random one or the
    /// one giving the best total score. The best model seen is returned, so
    /// the result never scores below `initial`.
    pub fn run_from<R: Rng + ?Sized>(&self, rng: &mut R, initial: Model) -> Result<SearchOutcome> {
        let p = self.config.random_move_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(EngineError::SolverConfiguration(format!(
                "random move probability {} is outside [0, 1]",
                p
            )));
        }
        let domain = self.domain;
        let formulas = domain.formulas();
        if let Some(hard) = formulas.iter().find(|f| f.has_infinite_weight()) {
            return Err(EngineError::SolverConfiguration(format!(
                "cannot search with hard formula `{}`; propagate or reweight it first",
                hard
            )));
        }

        let mut eligible = Vec::new();
        for (index, formula) in formulas.iter().enumerate() {
            if can_find_moves_for(&formula.sentence) {
                eligible.push(index);
            } else {
                warn!(formula = %formula, "no moves can be generated; excluding from search");
            }
        }
        if eligible.is_empty() {
            return Err(EngineError::SolverConfiguration(
                "no formula admits moves".to_string(),
            ));
        }

        let occurrences = atom_occurrences(formulas);
        let mut current = initial;
        let mut scores = formulas
            .iter()
            .map(|f| domain.score_formula(f, &current))
            .collect::<Result<Vec<f64>>>()?;
        let mut current_score: f64 = scores.iter().sum();
        let mut best = current.clone();
        let mut best_score = current_score;
        debug!(score = current_score, "starting search");

        for iteration in 1..=self.config.max_iterations {
            let mut violated = Vec::new();
            for &index in &eligible {
                if !domain.formula_fully_satisfied(&formulas[index], &current)? {
                    violated.push(index);
                }
            }
            if violated.is_empty() {
                info!(iterations = iteration - 1, score = current_score, "every formula satisfied");
                let (model, score) = if current_score >= best_score {
                    (current, current_score)
                } else {
                    (best, best_score)
                };
                return Ok(SearchOutcome {
                    model,
                    score,
                    iterations: iteration - 1,
                });
            }

            let target = &formulas[violated[rng.gen_range(0..violated.len())]];
            let moves = find_moves_for(domain, &current, target)?;
            if moves.is_empty() {
                warn!(formula = %target, "violated formula has no applicable moves");
                continue;
            }

            let (next, next_scores, next_score) = if rng.gen_bool(p) {
                let mv = &moves[rng.gen_range(0..moves.len())];
                let next = execute_move(mv, &current);
                let (next_scores, next_score) =
                    rescore(domain, &next, mv, &scores, current_score, &occurrences)?;
                (next, next_scores, next_score)
            } else {
                let mut top: Vec<(Model, Vec<f64>, f64)> = Vec::new();
                let mut top_score = f64::NEG_INFINITY;
                for mv in &moves {
                    let next = execute_move(mv, &current);
                    let (next_scores, next_score) =
                        rescore(domain, &next, mv, &scores, current_score, &occurrences)?;
                    if next_score > top_score {
                        top_score = next_score;
                        top.clear();
                    }
                    if next_score == top_score {
                        top.push((next, next_scores, next_score));
                    }
                }
                let pick = rng.gen_range(0..top.len());
                top.swap_remove(pick)
            };

            current = next;
            scores = next_scores;
            current_score = next_score;
            if current_score > best_score {
                best = current.clone();
                best_score = current_score;
            }
            debug!(iteration, score = current_score, best = best_score, "step");
        }

        Ok(SearchOutcome {
            model: best,
            score: best_score,
            iterations: self.config.max_iterations,
        })
    }
}

/// Indices of the formulas each atom occurs in.
fn atom_occurrences(formulas: &[ELSentence]) -> HashMap<Atom, BTreeSet<usize>> {
    let mut occurrences: HashMap<Atom, BTreeSet<usize>> = HashMap::new();
    for (index, formula) in formulas.iter().enumerate() {
        for atom in formula.sentence.atoms() {
            occurrences.entry(atom).or_default().insert(index);
        }
    }
    occurrences
}

/// Scores after `mv`, recomputing only formulas that mention a changed atom.
fn rescore(
    domain: &Domain,
    next: &Model,
    mv: &Move,
    scores: &[f64],
    total: f64,
    occurrences: &HashMap<Atom, BTreeSet<usize>>,
) -> Result<(Vec<f64>, f64)> {
    let touched: BTreeSet<usize> = mv
        .atoms()
        .into_iter()
        .filter_map(|atom| occurrences.get(atom))
        .flatten()
        .copied()
        .collect();
    let mut next_scores = scores.to_vec();
    let mut next_total = total;
    for index in touched {
        let updated = domain.score_formula(&domain.formulas()[index], next)?;
        next_total += updated - next_scores[index];
        next_scores[index] = updated;
    }
    Ok((next_scores, next_total))
}
