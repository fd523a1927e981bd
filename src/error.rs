//! Engine error taxonomy.

use thiserror::Error;

use crate::interval::SISet;

/// Errors raised by evaluation, scoring, propagation and search.
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    /// Propagation left a clause with no literal over a non-empty region.
    #[error("contradiction: clause `{clause}` cannot hold over {region}")]
    Contradiction { clause: String, region: SISet },
    /// An evaluator reached an ungrounded atom or a construct it cannot evaluate.
    #[error("unsupported construct: {0}")]
    UnsupportedConstruct(String),
    /// A score computation left the range of `f64`.
    #[error("numeric overflow: {0}")]
    NumericOverflow(String),
    /// The solver was asked to run on a formula set it cannot handle.
    #[error("solver configuration error: {0}")]
    SolverConfiguration(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
