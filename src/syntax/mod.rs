//! Syntax of event logic: terms, atoms, sentences and weighted formulas.

mod el_sentence;
mod literal;
mod sentence;
mod term;

pub use el_sentence::{ELSentence, Weight};
pub use literal::{Atom, Proposition};
pub use sentence::{Sentence, TQConstraints};
pub use term::{Term, Var};
