//! Quantified unit propagation.

use std::sync::Arc;

use tracing::{debug, info};

use super::qcnf::{
    clause_sentence, convert_from_qcnf_clause, convert_from_qcnf_literal,
    convert_to_qcnf_clause_list, QUnitsFormulasPair, QcnfClause, QcnfClauseList, QcnfLiteral,
    QcnfLiteralList,
};
use crate::domain::Domain;
use crate::error::{EngineError, Result};
use crate::interval::{intersection, subtract};
use crate::syntax::{ELSentence, Proposition, Sentence};

/// Propagate a unit literal into one clause.
///
/// Literals match through their signed atom, so `[ P(a) ]` and `P(a)` are
/// the same key. Where the clause contains the literal itself it is already
/// satisfied, and it survives only outside the literal's region. Where it
/// contains the negation, the clause is split: the shortened clause over the
/// overlap comes first, then the original clause over the rest. A shortened
/// clause with no literals left is a contradiction.
pub fn propagate_literal(literal: &QcnfLiteral, clause: &QcnfClause) -> Result<QcnfClauseList> {
    let Some(key) = literal.literal.as_proposition() else {
        return Ok(vec![clause.clone()]);
    };

    let matches = |lit: &Arc<Sentence>, sign: bool| {
        lit.as_proposition()
            .is_some_and(|prop| prop.atom == key.atom && prop.sign == sign)
    };

    if clause.clause.iter().any(|lit| matches(lit, key.sign)) {
        let rest = subtract(&clause.quantification, &literal.quantification);
        if rest.is_empty() {
            return Ok(Vec::new());
        }
        return Ok(vec![QcnfClause {
            clause: clause.clause.clone(),
            quantification: rest,
        }]);
    }

    if !clause.clause.iter().any(|lit| matches(lit, !key.sign)) {
        return Ok(vec![clause.clone()]);
    }

    let overlap = intersection(&clause.quantification, &literal.quantification);
    if overlap.is_empty() {
        return Ok(vec![clause.clone()]);
    }
    let shortened: Vec<Arc<Sentence>> = clause
        .clause
        .iter()
        .filter(|lit| !matches(*lit, !key.sign))
        .cloned()
        .collect();
    if shortened.is_empty() {
        return Err(EngineError::Contradiction {
            clause: clause_sentence(&clause.clause).to_string(),
            region: overlap,
        });
    }

    let mut result = vec![QcnfClause {
        clause: shortened,
        quantification: overlap,
    }];
    let rest = subtract(&clause.quantification, &literal.quantification);
    if !rest.is_empty() {
        result.push(QcnfClause {
            clause: clause.clause.clone(),
            quantification: rest,
        });
    }
    Ok(result)
}

/// Fail if `unit` contradicts an earlier unit somewhere.
fn check_against_units(unit: &QcnfLiteral, units: &QcnfLiteralList) -> Result<()> {
    let Some(key) = unit.literal.as_proposition() else {
        return Ok(());
    };
    for earlier in units {
        let Some(other) = earlier.literal.as_proposition() else {
            continue;
        };
        if other.atom != key.atom || other.sign == key.sign {
            continue;
        }
        let overlap = intersection(&earlier.quantification, &unit.quantification);
        if !overlap.is_empty() {
            return Err(EngineError::Contradiction {
                clause: format!("{} against {}", unit.literal, earlier.literal),
                region: overlap,
            });
        }
    }
    Ok(())
}

/// Propagate unit clauses until none are left.
///
/// Each round takes the first unit clause of the list, checks it against the
/// units found so far and propagates it into every remaining clause.
pub fn perform_unit_propagation(list: QcnfClauseList) -> Result<QUnitsFormulasPair> {
    let mut units: QcnfLiteralList = Vec::new();
    let mut clauses: QcnfClauseList = list
        .into_iter()
        .filter(|qc| !qc.quantification.is_empty())
        .collect();

    loop {
        if let Some(empty) = clauses.iter().find(|qc| qc.clause.is_empty()) {
            return Err(EngineError::Contradiction {
                clause: empty.sentence().to_string(),
                region: empty.quantification.clone(),
            });
        }
        let Some(position) = clauses.iter().position(QcnfClause::is_unit) else {
            break;
        };
        let unit_clause = clauses.remove(position);
        let unit = QcnfLiteral {
            literal: unit_clause.clause[0].clone(),
            quantification: unit_clause.quantification,
        };
        check_against_units(&unit, &units)?;

        let mut remaining = Vec::with_capacity(clauses.len());
        for clause in &clauses {
            remaining.extend(propagate_literal(&unit, clause)?);
        }
        debug!(unit = %unit, before = clauses.len(), after = remaining.len(), "propagated unit");
        clauses = remaining;
        units.push(unit);
    }

    Ok((units, clauses))
}

/// Simplify a domain by unit propagation.
///
/// Observations and hard formulas take part; soft formulas are kept as they
/// are. Units that are signed atoms become observations, every other unit
/// and every residual clause becomes a hard formula.
pub fn propagate_domain(domain: &Domain) -> Result<Domain> {
    let max = domain.max_interval();
    let mut clauses: QcnfClauseList = domain
        .observations()
        .iter()
        .map(|(prop, region)| QcnfClause {
            clause: vec![Arc::new(proposition_literal(prop))],
            quantification: region.clone(),
        })
        .collect();

    let (hard, soft): (Vec<ELSentence>, Vec<ELSentence>) = domain
        .formulas()
        .iter()
        .cloned()
        .partition(ELSentence::has_infinite_weight);
    clauses.extend(convert_to_qcnf_clause_list(&hard, max));

    let (units, residual) = perform_unit_propagation(clauses)?;
    info!(
        units = units.len(),
        residual = residual.len(),
        soft = soft.len(),
        "unit propagation finished"
    );

    let mut result = Domain::new(max, domain.config().clone());
    for unit in &units {
        match unit.literal.as_proposition() {
            Some(prop) => result.add_observation(prop, &unit.quantification),
            None => result.add_formula(convert_from_qcnf_literal(unit)),
        }
    }
    for clause in &residual {
        result.add_formula(convert_from_qcnf_clause(clause));
    }
    for formula in soft {
        result.add_formula(formula);
    }
    Ok(result)
}

fn proposition_literal(prop: &Proposition) -> Sentence {
    let atom = Sentence::atom(prop.atom.clone());
    if prop.sign {
        atom
    } else {
        Sentence::negation(Arc::new(atom))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::{Interval, SISet, SpanInterval};
    use crate::syntax::Atom;

    fn max() -> Interval {
        Interval::new(1, 20)
    }

    fn region(s: i64, f: i64) -> SISet {
        SISet::from_span(SpanInterval::liquid(s, f, max()), false, max())
    }

    fn atom(name: &str) -> Arc<Sentence> {
        Arc::new(Sentence::atom(Atom::ground(name, &["a"])))
    }

    fn unit(lit: Arc<Sentence>, s: i64, f: i64) -> QcnfLiteral {
        QcnfLiteral {
            literal: lit,
            quantification: region(s, f),
        }
    }

    fn clause(lits: Vec<Arc<Sentence>>, s: i64, f: i64) -> QcnfClause {
        QcnfClause {
            clause: lits,
            quantification: region(s, f),
        }
    }

    // === propagate_literal tests ===

    #[test]
    fn test_unrelated_literal_leaves_clause() {
        let c = clause(vec![atom("P"), atom("Q")], 1, 20);
        let result = propagate_literal(&unit(atom("R"), 1, 10), &c).unwrap();
        assert_eq!(result, vec![c]);
    }

    #[test]
    fn test_covering_literal_removes_clause() {
        let c = clause(vec![atom("P"), atom("Q")], 3, 5);
        assert!(propagate_literal(&unit(atom("P"), 1, 10), &c).unwrap().is_empty());
    }

    #[test]
    fn test_disjoint_negation_leaves_clause() {
        let c = clause(vec![atom("P"), atom("Q")], 11, 20);
        let neg = Arc::new(Sentence::negation(atom("P")));
        let result = propagate_literal(&unit(neg, 1, 10), &c).unwrap();
        assert_eq!(result, vec![c]);
    }

    #[test]
    fn test_last_literal_falsified_is_contradiction() {
        let c = clause(vec![atom("P")], 1, 20);
        let neg = Arc::new(Sentence::negation(atom("P")));
        match propagate_literal(&unit(neg, 5, 6), &c) {
            Err(EngineError::Contradiction { region, .. }) => {
                assert_eq!(region.to_string(), "{[5:6]}");
            }
            other => panic!("expected contradiction, got {:?}", other),
        }
    }

    // === perform_unit_propagation tests ===

    #[test]
    fn test_units_are_extracted_in_order() {
        let list = vec![
            clause(vec![atom("P")], 1, 3),
            clause(vec![Arc::new(Sentence::negation(atom("P")))], 8, 11),
            clause(vec![atom("Q")], 1, 10),
            clause(vec![atom("P"), atom("Q"), atom("R")], 1, 20),
        ];
        let (units, residual) = perform_unit_propagation(list).unwrap();
        let rendered: Vec<String> = units.iter().map(|u| u.literal.to_string()).collect();
        assert_eq!(rendered, vec!["P(a)", "!P(a)", "Q(a)"]);
        assert!(residual.iter().all(|qc| qc.clause.len() > 1));
    }

    #[test]
    fn test_conflicting_units() {
        let list = vec![
            clause(vec![atom("P")], 1, 10),
            clause(vec![Arc::new(Sentence::negation(atom("P")))], 10, 20),
        ];
        assert!(matches!(
            perform_unit_propagation(list),
            Err(EngineError::Contradiction { .. })
        ));
    }

    #[test]
    fn test_empty_clause_is_contradiction() {
        let list = vec![clause(Vec::new(), 1, 2)];
        assert!(matches!(
            perform_unit_propagation(list),
            Err(EngineError::Contradiction { .. })
        ));
    }
}
