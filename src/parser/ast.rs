//! Parsed statements that are not already engine types.

use std::fmt;

use crate::interval::SISet;
use crate::syntax::Proposition;

/// An observation: a signed atom and where it holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Fact {
    pub proposition: Proposition,
    pub region: SISet,
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.proposition, self.region)
    }
}
