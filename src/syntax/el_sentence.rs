//! Weighted, quantified formulas.

use std::fmt;
use std::sync::Arc;

use super::sentence::Sentence;
use crate::interval::SISet;

/// Formula weight. Infinite weight marks a hard constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Weight {
    Finite(f64),
    Infinite,
}

impl Weight {
    pub fn is_infinite(&self) -> bool {
        matches!(self, Weight::Infinite)
    }

    /// The weight as an `f64`; infinite weight maps to `f64::INFINITY`.
    pub fn value(&self) -> f64 {
        match self {
            Weight::Finite(w) => *w,
            Weight::Infinite => f64::INFINITY,
        }
    }
}

impl Default for Weight {
    fn default() -> Self {
        Weight::Finite(1.0)
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Weight::Finite(w) => write!(f, "{}", w),
            Weight::Infinite => write!(f, "inf"),
        }
    }
}

/// A sentence with a weight and the region it is asserted over.
///
/// Without a quantification the formula is asserted over the whole
/// universe of the domain it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct ELSentence {
    pub sentence: Arc<Sentence>,
    pub weight: Weight,
    pub quantification: Option<SISet>,
}

impl ELSentence {
    pub fn new(sentence: Arc<Sentence>) -> Self {
        ELSentence {
            sentence,
            weight: Weight::default(),
            quantification: None,
        }
    }

    pub fn with_weight(mut self, weight: Weight) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_quantification(mut self, quantification: SISet) -> Self {
        self.quantification = Some(quantification);
        self
    }

    pub fn has_infinite_weight(&self) -> bool {
        self.weight.is_infinite()
    }

    pub fn is_quantified(&self) -> bool {
        self.quantification.is_some()
    }
}

impl fmt::Display for ELSentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.weight, self.sentence)?;
        if let Some(q) = &self.quantification {
            write!(f, " @ {}", q)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::Interval;
    use crate::syntax::Atom;

    #[test]
    fn test_display_weights() {
        let p = Arc::new(Sentence::atom(Atom::ground("P", &["a"])));
        assert_eq!(ELSentence::new(p.clone()).to_string(), "1: P(a)");
        let max = Interval::new(1, 5);
        let hard = ELSentence::new(p.clone())
            .with_weight(Weight::Infinite)
            .with_quantification(SISet::universe(false, max));
        assert_eq!(hard.to_string(), "inf: P(a) @ {[1:5]}");
        let soft = ELSentence::new(p).with_weight(Weight::Finite(2.5));
        assert_eq!(soft.to_string(), "2.5: P(a)");
        assert!(hard.has_infinite_weight());
        assert!(!soft.is_quantified());
    }
}
