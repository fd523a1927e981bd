//! Candidate model edits for local search.

use std::collections::BTreeSet;
use std::fmt;

use crate::domain::Domain;
use crate::error::Result;
use crate::interval::{subtract, Relation, SISet};
use crate::model::Model;
use crate::syntax::{Atom, ELSentence, Sentence};

/// A model edit: regions to make true and regions to make false.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Move {
    pub to_add: Vec<(Atom, SISet)>,
    pub to_del: Vec<(Atom, SISet)>,
}

impl Move {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_del.is_empty()
    }

    /// Atoms this move touches.
    pub fn atoms(&self) -> BTreeSet<&Atom> {
        self.to_add
            .iter()
            .chain(self.to_del.iter())
            .map(|(atom, _)| atom)
            .collect()
    }

    fn combined(&self, other: &Move) -> Move {
        let mut merged = self.clone();
        merged.to_add.extend(other.to_add.iter().cloned());
        merged.to_del.extend(other.to_del.iter().cloned());
        merged
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (sign, changes) in [("+", &self.to_add), ("-", &self.to_del)] {
            for (atom, region) in changes {
                if !first {
                    write!(f, ", ")?;
                }
                first = false;
                write!(f, "{}{} @ {}", sign, atom, region)?;
            }
        }
        Ok(())
    }
}

fn is_plain_conjunction(relations: &BTreeSet<Relation>) -> bool {
    relations.len() == 1 && relations.contains(&Relation::Equals)
}

/// True if moves can be generated for sentences of this shape.
pub fn can_find_moves_for(sentence: &Sentence) -> bool {
    can_move(sentence, true)
}

fn can_move(sentence: &Sentence, positive: bool) -> bool {
    match sentence {
        Sentence::Atom(_) => true,
        Sentence::Negation(inner) => can_move(inner, !positive),
        Sentence::Liquid(inner) => can_move(inner, positive),
        Sentence::Disjunction(left, right) => {
            if positive {
                can_move(left, true) || can_move(right, true)
            } else {
                can_move(left, false) && can_move(right, false)
            }
        }
        Sentence::Conjunction {
            left,
            right,
            relations,
        } if is_plain_conjunction(relations) => {
            if positive {
                can_move(left, true) && can_move(right, true)
            } else {
                can_move(left, false) || can_move(right, false)
            }
        }
        _ => false,
    }
}

/// Moves that would make `formula` hold where it is currently violated.
///
/// The violated part of the quantification is handled span by span. Every
/// region in a move is clipped to what the domain allows to change, and
/// moves that would change nothing are dropped.
pub fn find_moves_for(domain: &Domain, model: &Model, formula: &ELSentence) -> Result<Vec<Move>> {
    let sat = domain.satisfied(&formula.sentence, model)?;
    let violated = subtract(&domain.quantification_of(formula), &sat);
    let max = domain.max_interval();

    let mut moves = Vec::new();
    for span in violated.spans() {
        let region = SISet::from_span(*span, false, max);
        moves.extend(moves_for(domain, &formula.sentence, &region, true));
    }
    Ok(moves)
}

fn moves_for(domain: &Domain, sentence: &Sentence, region: &SISet, positive: bool) -> Vec<Move> {
    match sentence {
        Sentence::Atom(atom) => {
            let modifiable = domain.get_modifiable_siset(atom, region);
            if modifiable.is_empty() {
                return Vec::new();
            }
            let change = vec![(atom.clone(), modifiable)];
            let mv = if positive {
                Move {
                    to_add: change,
                    to_del: Vec::new(),
                }
            } else {
                Move {
                    to_add: Vec::new(),
                    to_del: change,
                }
            };
            vec![mv]
        }
        Sentence::Negation(inner) => moves_for(domain, inner, region, !positive),
        Sentence::Liquid(inner) => moves_for(domain, inner, region, positive),
        Sentence::Disjunction(left, right) => {
            let left = moves_for(domain, left, region, positive);
            let right = moves_for(domain, right, region, positive);
            if positive {
                either(left, right)
            } else {
                both(left, right)
            }
        }
        Sentence::Conjunction {
            left,
            right,
            relations,
        } if is_plain_conjunction(relations) => {
            let left = moves_for(domain, left, region, positive);
            let right = moves_for(domain, right, region, positive);
            if positive {
                both(left, right)
            } else {
                either(left, right)
            }
        }
        _ => Vec::new(),
    }
}

fn either(mut left: Vec<Move>, right: Vec<Move>) -> Vec<Move> {
    left.extend(right);
    left
}

/// Every pairing of a left move with a right move. A side without moves
/// contributes nothing to the pairing.
fn both(left: Vec<Move>, right: Vec<Move>) -> Vec<Move> {
    if left.is_empty() {
        return right;
    }
    if right.is_empty() {
        return left;
    }
    let mut combined = Vec::with_capacity(left.len() * right.len());
    for l in &left {
        for r in &right {
            combined.push(l.combined(r));
        }
    }
    combined
}

/// Apply a move to a copy of `model`.
pub fn execute_move(mv: &Move, model: &Model) -> Model {
    let mut next = model.clone();
    for (atom, region) in &mv.to_add {
        next.set_atom(atom, region);
    }
    for (atom, region) in &mv.to_del {
        next.unset_atom(atom, region);
    }
    next
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::DomainConfig;
    use crate::interval::{Interval, SpanInterval};
    use crate::syntax::{Proposition, Weight};

    fn max() -> Interval {
        Interval::new(1, 10)
    }

    fn liquid(s: i64, f: i64) -> SISet {
        SISet::from_span(SpanInterval::liquid(s, f, max()), true, max())
    }

    fn atom(name: &str) -> Arc<Sentence> {
        Arc::new(Sentence::atom(Atom::ground(name, &["a"])))
    }

    fn formula(sentence: Sentence, s: i64, f: i64) -> ELSentence {
        ELSentence::new(Arc::new(sentence))
            .with_weight(Weight::Finite(1.0))
            .with_quantification(liquid(s, f))
    }

    // === Shape tests ===

    #[test]
    fn test_can_find_moves_for_shapes() {
        let p = atom("P");
        let q = atom("Q");
        assert!(can_find_moves_for(&p));
        assert!(can_find_moves_for(&Sentence::negation(p.clone())));
        assert!(can_find_moves_for(&Sentence::disjunction(p.clone(), q.clone())));
        assert!(can_find_moves_for(&Sentence::liquid(Arc::new(Sentence::conjunction(
            p.clone(),
            q.clone()
        )))));
        let meets = BTreeSet::from([Relation::Meets]);
        assert!(!can_find_moves_for(&Sentence::conjunction_with(p.clone(), q, meets)));
        assert!(!can_find_moves_for(&Sentence::diamond(p)));
        assert!(!can_find_moves_for(&Sentence::BoolLit(true)));
    }

    // === Move generation tests ===

    #[test]
    fn test_atom_violation_yields_add_move() {
        let domain = Domain::new(max(), DomainConfig::default());
        let f = formula(Sentence::Atom(Atom::ground("P", &["a"])), 2, 5);
        let moves = find_moves_for(&domain, &Model::new(max()), &f).unwrap();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].to_string(), "+P(a) @ {[2:5]}");
        let next = execute_move(&moves[0], &Model::new(max()));
        assert!(domain.formula_fully_satisfied(&f, &next).unwrap());
    }

    #[test]
    fn test_negated_atom_yields_delete_move() {
        let domain = Domain::new(max(), DomainConfig::default());
        let f = formula(Sentence::negation(atom("P")), 1, 10);
        let mut model = Model::new(max());
        model.set_atom(&Atom::ground("P", &["a"]), &liquid(3, 4));
        let moves = find_moves_for(&domain, &model, &f).unwrap();
        assert!(!moves.is_empty());
        assert!(moves.iter().all(|mv| mv.to_add.is_empty()));
        let next = execute_move(&moves[0], &model);
        assert!(domain.formula_fully_satisfied(&f, &next).unwrap());
    }

    #[test]
    fn test_disjunction_offers_either_side() {
        let domain = Domain::new(max(), DomainConfig::default());
        let f = formula(Sentence::disjunction(atom("P"), atom("Q")), 1, 4);
        let moves = find_moves_for(&domain, &Model::new(max()), &f).unwrap();
        let touched: Vec<String> = moves
            .iter()
            .flat_map(|mv| mv.atoms().into_iter().map(|a| a.to_string()))
            .collect();
        assert_eq!(touched, vec!["P(a)", "Q(a)"]);
    }

    #[test]
    fn test_conjunction_changes_both_sides() {
        let domain = Domain::new(max(), DomainConfig::default());
        let f = formula(Sentence::conjunction(atom("P"), atom("Q")), 1, 4);
        let moves = find_moves_for(&domain, &Model::new(max()), &f).unwrap();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].to_add.len(), 2);
        let next = execute_move(&moves[0], &Model::new(max()));
        assert!(domain.formula_fully_satisfied(&f, &next).unwrap());
    }

    #[test]
    fn test_observed_regions_are_not_modified() {
        let mut domain = Domain::new(max(), DomainConfig::default());
        domain.add_observation(Proposition::negative(Atom::ground("P", &["a"])), &liquid(1, 10));
        let f = formula(Sentence::Atom(Atom::ground("P", &["a"])), 1, 10);
        assert!(find_moves_for(&domain, &Model::new(max()), &f).unwrap().is_empty());
    }
}
