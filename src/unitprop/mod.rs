//! Unit propagation over quantified clauses.

mod propagate;
mod qcnf;

pub use propagate::{perform_unit_propagation, propagate_domain, propagate_literal};
pub use qcnf::{
    clause_sentence, convert_from_qcnf_clause, convert_from_qcnf_literal, convert_to_cnf_clause,
    convert_to_qcnf_clause, convert_to_qcnf_clause_list, CnfClause, QUnitsFormulasPair,
    QcnfClause, QcnfClauseList, QcnfLiteral, QcnfLiteralList,
};
