//! Quantified clausal form.

use std::fmt;
use std::sync::Arc;

use crate::interval::{Interval, SISet};
use crate::syntax::{ELSentence, Sentence, Weight};

/// A disjunction of literals.
pub type CnfClause = Vec<Arc<Sentence>>;

/// A clause together with the region where it must hold.
#[derive(Debug, Clone, PartialEq)]
pub struct QcnfClause {
    pub clause: CnfClause,
    pub quantification: SISet,
}

/// A single literal together with the region where it holds.
#[derive(Debug, Clone, PartialEq)]
pub struct QcnfLiteral {
    pub literal: Arc<Sentence>,
    pub quantification: SISet,
}

pub type QcnfClauseList = Vec<QcnfClause>;
pub type QcnfLiteralList = Vec<QcnfLiteral>;

/// Unit literals and the clauses left after propagation.
pub type QUnitsFormulasPair = (QcnfLiteralList, QcnfClauseList);

impl QcnfClause {
    pub fn is_unit(&self) -> bool {
        self.clause.len() == 1
    }

    /// The clause as a single sentence; the empty clause is `false`.
    pub fn sentence(&self) -> Arc<Sentence> {
        clause_sentence(&self.clause)
    }
}

impl fmt::Display for QcnfClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.sentence(), self.quantification)
    }
}

impl fmt::Display for QcnfLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.literal, self.quantification)
    }
}

/// Split a sentence into the literals of its top-level disjunction.
///
/// Liquid brackets are pushed inward through disjunctions and double
/// negations are removed. Anything else is kept whole as one literal.
pub fn convert_to_cnf_clause(sentence: &Arc<Sentence>) -> CnfClause {
    match sentence.as_ref() {
        Sentence::Disjunction(left, right) => {
            let mut clause = convert_to_cnf_clause(left);
            clause.extend(convert_to_cnf_clause(right));
            clause
        }
        Sentence::Negation(inner) => match inner.as_ref() {
            Sentence::Negation(twice) => convert_to_cnf_clause(twice),
            _ => vec![sentence.clone()],
        },
        Sentence::Liquid(inner) => match inner.as_ref() {
            Sentence::Disjunction(left, right) => {
                let mut clause = convert_to_cnf_clause(&Arc::new(Sentence::liquid(left.clone())));
                clause.extend(convert_to_cnf_clause(&Arc::new(Sentence::liquid(
                    right.clone(),
                ))));
                clause
            }
            Sentence::Liquid(_) => convert_to_cnf_clause(inner),
            Sentence::Negation(once) => match once.as_ref() {
                Sentence::Negation(twice) => {
                    convert_to_cnf_clause(&Arc::new(Sentence::liquid(twice.clone())))
                }
                _ => vec![sentence.clone()],
            },
            _ => vec![sentence.clone()],
        },
        _ => vec![sentence.clone()],
    }
}

/// A formula as a quantified clause. Unquantified formulas hold over the
/// whole of `universe`.
pub fn convert_to_qcnf_clause(formula: &ELSentence, universe: Interval) -> QcnfClause {
    QcnfClause {
        clause: convert_to_cnf_clause(&formula.sentence),
        quantification: formula
            .quantification
            .clone()
            .unwrap_or_else(|| SISet::universe(false, universe)),
    }
}

/// Convert a formula list, dropping clauses that contain `true` and
/// removing `false` literals from the rest.
pub fn convert_to_qcnf_clause_list(formulas: &[ELSentence], universe: Interval) -> QcnfClauseList {
    formulas
        .iter()
        .map(|formula| convert_to_qcnf_clause(formula, universe))
        .filter(|qc| !qc.clause.iter().any(|lit| is_bool(lit, true)))
        .map(|mut qc| {
            qc.clause.retain(|lit| !is_bool(lit, false));
            qc
        })
        .collect()
}

fn is_bool(literal: &Sentence, value: bool) -> bool {
    match literal {
        Sentence::BoolLit(v) => *v == value,
        Sentence::Liquid(inner) => is_bool(inner, value),
        _ => false,
    }
}

/// Rebuild a clause sentence by folding its literals into a left-nested
/// disjunction.
pub fn clause_sentence(clause: &CnfClause) -> Arc<Sentence> {
    let mut literals = clause.iter();
    let Some(first) = literals.next() else {
        return Arc::new(Sentence::BoolLit(false));
    };
    literals.fold(first.clone(), |acc, lit| {
        Arc::new(Sentence::disjunction(acc, lit.clone()))
    })
}

/// A propagated clause as a hard formula.
pub fn convert_from_qcnf_clause(clause: &QcnfClause) -> ELSentence {
    ELSentence::new(clause.sentence())
        .with_weight(Weight::Infinite)
        .with_quantification(clause.quantification.clone())
}

/// A unit literal as a hard formula.
pub fn convert_from_qcnf_literal(literal: &QcnfLiteral) -> ELSentence {
    ELSentence::new(literal.literal.clone())
        .with_weight(Weight::Infinite)
        .with_quantification(literal.quantification.clone())
}
