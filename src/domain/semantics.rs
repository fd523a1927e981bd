//! Satisfaction: where in time a sentence holds under a model.

use super::domain::Domain;
use crate::error::{EngineError, Result};
use crate::interval::{intersection, subtract, SISet};
use crate::model::Model;
use crate::syntax::{Atom, Sentence, TQConstraints};

impl Domain {
    /// The region where `sentence` holds under standard semantics.
    ///
    /// Unassigned atoms are false everywhere. Conjunctions compose the
    /// regions of their sides through their relations, so `P ; Q` holds on
    /// every interval made of a `P` interval followed by a `Q` interval.
    pub fn satisfied(&self, sentence: &Sentence, model: &Model) -> Result<SISet> {
        let max = self.max_interval();
        match sentence {
            Sentence::Atom(atom) => {
                let mut region = self.atom_region(atom, model)?;
                region.set_force_liquid(false);
                Ok(region)
            }
            Sentence::Negation(inner) => Ok(self.satisfied(inner, model)?.compliment()),
            Sentence::Disjunction(left, right) => {
                let mut region = self.satisfied(left, model)?;
                region.add_set(&self.satisfied(right, model)?);
                Ok(region)
            }
            Sentence::Conjunction {
                left,
                right,
                relations,
            } => {
                let left = self.satisfied(left, model)?;
                let right = self.satisfied(right, model)?;
                let mut region = SISet::new(false, max);
                for i in left.spans() {
                    for j in right.spans() {
                        for rel in relations {
                            if let Some(span) = i.compose(j, *rel) {
                                region.add(span);
                            }
                        }
                    }
                }
                Ok(region)
            }
            Sentence::Liquid(inner) => {
                let mut region = self.liq_satisfied(inner, model)?;
                region.set_force_liquid(false);
                Ok(region)
            }
            Sentence::Diamond {
                sentence,
                relations,
                constraints,
            } => {
                let inner = self.satisfied(sentence, model)?;
                let mut region = SISet::new(false, max);
                for span in inner.spans() {
                    for rel in relations {
                        if let Some(related) = span.satisfies_relation(*rel) {
                            region.add(related);
                        }
                    }
                }
                Ok(match constraints {
                    Some(tq) => apply_constraints(region, tq),
                    None => region,
                })
            }
            Sentence::BoolLit(true) => Ok(SISet::universe(false, max)),
            Sentence::BoolLit(false) => Ok(SISet::new(false, max)),
        }
    }

    /// The region where `sentence` holds under liquid semantics.
    ///
    /// Atoms with no model entry are true everywhere; an atom whose entry is
    /// empty is false everywhere. Conjunction is plain intersection. Diamonds cannot be evaluated here.
    pub fn liq_satisfied(&self, sentence: &Sentence, model: &Model) -> Result<SISet> {
        let max = self.max_interval();
        match sentence {
            Sentence::Atom(atom) => {
                if !model.has_atom(atom) {
                    self.check_grounded(atom)?;
                    return Ok(SISet::universe(true, max));
                }
                let mut region = self.atom_region(atom, model)?;
                region.set_force_liquid(true);
                Ok(region)
            }
            Sentence::Negation(inner) => Ok(self.liq_satisfied(inner, model)?.compliment()),
            Sentence::Disjunction(left, right) => {
                let mut region = self.liq_satisfied(left, model)?;
                region.add_set(&self.liq_satisfied(right, model)?);
                Ok(region)
            }
            Sentence::Conjunction { left, right, .. } => {
                let left = self.liq_satisfied(left, model)?;
                let right = self.liq_satisfied(right, model)?;
                let mut region = intersection(&left, &right);
                region.set_force_liquid(true);
                Ok(region)
            }
            Sentence::Liquid(inner) => self.liq_satisfied(inner, model),
            Sentence::Diamond { .. } => Err(EngineError::UnsupportedConstruct(format!(
                "diamond inside a liquid context: {}",
                sentence
            ))),
            Sentence::BoolLit(true) => Ok(SISet::universe(true, max)),
            Sentence::BoolLit(false) => Ok(SISet::new(true, max)),
        }
    }

    fn check_grounded(&self, atom: &Atom) -> Result<()> {
        if atom.is_grounded() {
            Ok(())
        } else {
            Err(EngineError::UnsupportedConstruct(format!(
                "ungrounded atom {}",
                atom
            )))
        }
    }

    /// The model's region for `atom`, bounded by the domain universe.
    fn atom_region(&self, atom: &Atom, model: &Model) -> Result<SISet> {
        self.check_grounded(atom)?;
        let mut region = model.get_atom(atom);
        region.set_max_interval(self.max_interval());
        Ok(region)
    }
}

fn apply_constraints(region: SISet, tq: &TQConstraints) -> SISet {
    let mut region = if tq.must_be_in.is_empty() {
        region
    } else {
        intersection(&region, &tq.must_be_in)
    };
    if !tq.must_not_be_in.is_empty() {
        region = subtract(&region, &tq.must_not_be_in);
    }
    region
}
