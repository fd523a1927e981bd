//! Atoms and propositions (signed atoms).

use std::fmt;

use super::term::Term;

/// A predicate applied to terms, e.g. `P(a, b)`.
///
/// Atoms are structural values: equal predicate and arguments mean the same
/// atom, and they key the truth assignments of a `Model`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom {
    pub predicate: String,
    pub args: Vec<Term>,
}

impl Atom {
    pub fn new(predicate: impl Into<String>, args: Vec<Term>) -> Self {
        Atom {
            predicate: predicate.into(),
            args,
        }
    }

    /// Create a ground atom from constant names.
    pub fn ground(predicate: impl Into<String>, constants: &[&str]) -> Self {
        Atom::new(
            predicate,
            constants.iter().map(|c| Term::constant(*c)).collect(),
        )
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// True if every argument is a constant.
    pub fn is_grounded(&self) -> bool {
        self.args.iter().all(Term::is_ground)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.predicate)?;
        if self.args.is_empty() {
            return Ok(());
        }
        write!(f, "(")?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}

/// An atom with a truth value: `sign == false` asserts the atom is false.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Proposition {
    pub atom: Atom,
    pub sign: bool,
}

impl Proposition {
    pub fn new(atom: Atom, sign: bool) -> Self {
        Proposition { atom, sign }
    }

    pub fn positive(atom: Atom) -> Self {
        Proposition::new(atom, true)
    }

    pub fn negative(atom: Atom) -> Self {
        Proposition::new(atom, false)
    }

    pub fn negated(&self) -> Proposition {
        Proposition::new(self.atom.clone(), !self.sign)
    }
}

impl fmt::Display for Proposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sign {
            write!(f, "{}", self.atom)
        } else {
            write!(f, "!{}", self.atom)
        }
    }
}
