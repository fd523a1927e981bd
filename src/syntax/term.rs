//! Terms: constants and variables.

use std::fmt;

/// A variable. Variables are written with a capitalized name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var {
    name: String,
}

impl Var {
    pub fn new(name: impl Into<String>) -> Self {
        Var { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// An argument of an atom.
///
/// Atoms are evaluated only once every argument is a constant; variables are
/// accepted by the parser but rejected by the evaluators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    Constant(String),
    Var(Var),
}

impl Term {
    pub fn constant(name: impl Into<String>) -> Self {
        Term::Constant(name.into())
    }

    pub fn var(name: impl Into<String>) -> Self {
        Term::Var(Var::new(name))
    }

    /// Classify a name by its first character: upper case is a variable.
    pub fn from_name(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.chars().next().is_some_and(|c| c.is_uppercase()) {
            Term::var(name)
        } else {
            Term::constant(name)
        }
    }

    pub fn is_ground(&self) -> bool {
        matches!(self, Term::Constant(_))
    }

    pub fn name(&self) -> &str {
        match self {
            Term::Constant(name) => name,
            Term::Var(var) => var.name(),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
