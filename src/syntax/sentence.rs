//! Event-logic sentences.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use super::literal::{Atom, Proposition};
use crate::interval::{Relation, SISet};

/// Side constraints on where a diamond may anchor.
///
/// An empty `must_be_in` places no restriction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TQConstraints {
    pub must_be_in: SISet,
    pub must_not_be_in: SISet,
}

/// A sentence of event logic.
///
/// Sentences are immutable once built; sub-sentences are shared through
/// `Arc` so formulas produced by propagation reuse the parsed trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sentence {
    Atom(Atom),
    Negation(Arc<Sentence>),
    /// `left ^{relations} right`: both hold on intervals standing in one of
    /// the relations, and the conjunction holds on their span.
    Conjunction {
        left: Arc<Sentence>,
        right: Arc<Sentence>,
        relations: BTreeSet<Relation>,
    },
    Disjunction(Arc<Sentence>, Arc<Sentence>),
    BoolLit(bool),
    /// `[ s ]`: evaluate `s` under liquid semantics.
    Liquid(Arc<Sentence>),
    /// `<>{relations} s`: holds on intervals related to one where `s` holds.
    Diamond {
        sentence: Arc<Sentence>,
        relations: BTreeSet<Relation>,
        constraints: Option<TQConstraints>,
    },
}

impl Sentence {
    /// Relations a conjunction uses when none are written.
    pub fn default_conjunction_relations() -> BTreeSet<Relation> {
        BTreeSet::from([Relation::Equals])
    }

    /// Relations a diamond uses when none are written: every relation that
    /// moves away from the current interval.
    pub fn default_diamond_relations() -> BTreeSet<Relation> {
        Relation::ALL
            .into_iter()
            .filter(|rel| *rel != Relation::Equals)
            .collect()
    }

    pub fn atom(atom: Atom) -> Sentence {
        Sentence::Atom(atom)
    }

    pub fn negation(inner: Arc<Sentence>) -> Sentence {
        Sentence::Negation(inner)
    }

    pub fn disjunction(left: Arc<Sentence>, right: Arc<Sentence>) -> Sentence {
        Sentence::Disjunction(left, right)
    }

    /// `left ^ right`, i.e. both hold on the same interval.
    pub fn conjunction(left: Arc<Sentence>, right: Arc<Sentence>) -> Sentence {
        Sentence::conjunction_with(left, right, Sentence::default_conjunction_relations())
    }

    pub fn conjunction_with(
        left: Arc<Sentence>,
        right: Arc<Sentence>,
        relations: BTreeSet<Relation>,
    ) -> Sentence {
        Sentence::Conjunction {
            left,
            right,
            relations,
        }
    }

    pub fn liquid(inner: Arc<Sentence>) -> Sentence {
        Sentence::Liquid(inner)
    }

    pub fn diamond(inner: Arc<Sentence>) -> Sentence {
        Sentence::diamond_with(inner, Sentence::default_diamond_relations(), None)
    }

    pub fn diamond_with(
        inner: Arc<Sentence>,
        relations: BTreeSet<Relation>,
        constraints: Option<TQConstraints>,
    ) -> Sentence {
        Sentence::Diamond {
            sentence: inner,
            relations,
            constraints,
        }
    }

    /// `left -> right`, sugar for `!left v right`.
    pub fn implication(left: Arc<Sentence>, right: Arc<Sentence>) -> Sentence {
        Sentence::Disjunction(Arc::new(Sentence::Negation(left)), right)
    }

    /// The signed atom this sentence stands for, looking through liquid
    /// wrappers: `P(a)`, `!P(a)`, `[ !P(a) ]` and `![ P(a) ]` all qualify.
    pub fn as_proposition(&self) -> Option<Proposition> {
        match self {
            Sentence::Atom(atom) => Some(Proposition::positive(atom.clone())),
            Sentence::Liquid(inner) => inner.as_proposition(),
            Sentence::Negation(inner) => match inner.as_ref() {
                Sentence::Atom(atom) => Some(Proposition::negative(atom.clone())),
                Sentence::Liquid(nested) => nested
                    .as_proposition()
                    .filter(|prop| prop.sign)
                    .map(|prop| prop.negated()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Immediate sub-sentences.
    pub fn children(&self) -> Vec<&Arc<Sentence>> {
        match self {
            Sentence::Atom(_) | Sentence::BoolLit(_) => Vec::new(),
            Sentence::Negation(inner)
            | Sentence::Liquid(inner)
            | Sentence::Diamond {
                sentence: inner, ..
            } => vec![inner],
            Sentence::Conjunction { left, right, .. } | Sentence::Disjunction(left, right) => {
                vec![left, right]
            }
        }
    }

    /// Every atom occurring in the sentence.
    pub fn atoms(&self) -> BTreeSet<Atom> {
        let mut atoms = BTreeSet::new();
        self.collect_atoms(&mut atoms);
        atoms
    }

    fn collect_atoms(&self, atoms: &mut BTreeSet<Atom>) {
        if let Sentence::Atom(atom) = self {
            atoms.insert(atom.clone());
        }
        for child in self.children() {
            child.collect_atoms(atoms);
        }
    }

    /// Predicate names with their arities.
    pub fn predicates(&self) -> BTreeMap<String, usize> {
        self.atoms()
            .into_iter()
            .map(|atom| (atom.predicate.clone(), atom.arity()))
            .collect()
    }

    pub fn is_grounded(&self) -> bool {
        self.atoms().iter().all(Atom::is_grounded)
    }

    /// True if `other` is this sentence or occurs inside it.
    pub fn contains(&self, other: &Sentence) -> bool {
        self == other || self.children().iter().any(|child| child.contains(other))
    }

    /// Binding strength for printing; lower binds tighter.
    fn precedence(&self) -> u8 {
        match self {
            Sentence::Atom(_) | Sentence::BoolLit(_) | Sentence::Liquid(_) => 0,
            Sentence::Negation(_) | Sentence::Diamond { .. } => 1,
            Sentence::Conjunction { .. } => 2,
            Sentence::Disjunction(..) => 3,
        }
    }

    fn fmt_child(&self, f: &mut fmt::Formatter<'_>, child: &Sentence, strict: bool) -> fmt::Result {
        let wrap = if strict {
            child.precedence() >= self.precedence()
        } else {
            child.precedence() > self.precedence()
        };
        if wrap {
            write!(f, "({})", child)
        } else {
            write!(f, "{}", child)
        }
    }
}

fn fmt_relations(f: &mut fmt::Formatter<'_>, relations: &BTreeSet<Relation>) -> fmt::Result {
    for (i, rel) in relations.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{}", rel)?;
    }
    Ok(())
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentence::Atom(atom) => write!(f, "{}", atom),
            Sentence::BoolLit(value) => write!(f, "{}", value),
            Sentence::Liquid(inner) => write!(f, "[ {} ]", inner),
            Sentence::Negation(inner) => {
                write!(f, "!")?;
                self.fmt_child(f, inner, false)
            }
            Sentence::Disjunction(left, right) => {
                self.fmt_child(f, left, false)?;
                write!(f, " v ")?;
                self.fmt_child(f, right, true)
            }
            Sentence::Conjunction {
                left,
                right,
                relations,
            } => {
                self.fmt_child(f, left, false)?;
                if *relations == Sentence::default_conjunction_relations() {
                    write!(f, " ^ ")?;
                } else if *relations == BTreeSet::from([Relation::Meets]) {
                    write!(f, " ; ")?;
                } else {
                    write!(f, " ^{{")?;
                    fmt_relations(f, relations)?;
                    write!(f, "}} ")?;
                }
                self.fmt_child(f, right, true)
            }
            Sentence::Diamond {
                sentence,
                relations,
                constraints,
            } => {
                write!(f, "<>")?;
                match constraints {
                    Some(tq) => {
                        write!(f, "{{")?;
                        fmt_relations(f, relations)?;
                        write!(f, ":&{},\\{}}} ", tq.must_be_in, tq.must_not_be_in)?;
                    }
                    None if *relations != Sentence::default_diamond_relations() => {
                        write!(f, "{{")?;
                        fmt_relations(f, relations)?;
                        write!(f, "}} ")?;
                    }
                    None => {}
                }
                self.fmt_child(f, sentence, false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::{Interval, SpanInterval};

    fn atom(name: &str) -> Arc<Sentence> {
        Arc::new(Sentence::atom(Atom::ground(name, &["a"])))
    }

    fn region(s: i64, f: i64) -> SISet {
        let max = Interval::new(1, 2);
        SISet::from_span(SpanInterval::liquid(s, f, max), false, max)
    }

    // === Display tests ===

    #[test]
    fn test_display_connectives() {
        let p = atom("P");
        let q = atom("Q");
        assert_eq!(Sentence::disjunction(p.clone(), q.clone()).to_string(), "P(a) v Q(a)");
        assert_eq!(Sentence::conjunction(p.clone(), q.clone()).to_string(), "P(a) ^ Q(a)");
        let meets = BTreeSet::from([Relation::Meets]);
        assert_eq!(
            Sentence::conjunction_with(p.clone(), q.clone(), meets).to_string(),
            "P(a) ; Q(a)"
        );
        let rels = BTreeSet::from([Relation::Overlaps, Relation::Starts]);
        assert_eq!(
            Sentence::conjunction_with(p.clone(), q, rels).to_string(),
            "P(a) ^{o,s} Q(a)"
        );
        assert_eq!(Sentence::liquid(p).to_string(), "[ P(a) ]");
    }

    #[test]
    fn test_display_parenthesizes_by_precedence() {
        let p = atom("P");
        let q = atom("Q");
        let r = atom("R");
        let or = Arc::new(Sentence::disjunction(p.clone(), q.clone()));
        assert_eq!(Sentence::negation(or.clone()).to_string(), "!(P(a) v Q(a))");
        assert_eq!(
            Sentence::conjunction(or.clone(), r.clone()).to_string(),
            "(P(a) v Q(a)) ^ R(a)"
        );
        assert_eq!(
            Sentence::disjunction(or.clone(), r.clone()).to_string(),
            "P(a) v Q(a) v R(a)"
        );
        assert_eq!(
            Sentence::disjunction(r, or).to_string(),
            "R(a) v (P(a) v Q(a))"
        );
    }

    #[test]
    fn test_display_diamond() {
        let p = atom("P");
        assert_eq!(Sentence::diamond(p.clone()).to_string(), "<>P(a)");
        let meets = BTreeSet::from([Relation::Meets]);
        assert_eq!(
            Sentence::diamond_with(p.clone(), meets.clone(), None).to_string(),
            "<>{m} P(a)"
        );
        let tq = TQConstraints {
            must_be_in: region(1, 2),
            must_not_be_in: region(1, 1),
        };
        assert_eq!(
            Sentence::diamond_with(p, meets, Some(tq)).to_string(),
            r"<>{m:&{[1:2]},\{[1:1]}} P(a)"
        );
    }

    // === Structure tests ===

    #[test]
    fn test_as_proposition_looks_through_liquid() {
        let p = atom("P");
        let neg = Arc::new(Sentence::negation(p.clone()));
        assert_eq!(p.as_proposition().map(|prop| prop.sign), Some(true));
        assert_eq!(
            Sentence::liquid(neg).as_proposition().map(|prop| prop.sign),
            Some(false)
        );
        let neg_liquid = Sentence::negation(Arc::new(Sentence::liquid(p.clone())));
        assert_eq!(neg_liquid.as_proposition().map(|prop| prop.sign), Some(false));
        assert_eq!(Sentence::conjunction(p.clone(), p).as_proposition(), None);
    }

    #[test]
    fn test_atoms_and_predicates() {
        let s = Sentence::implication(atom("P"), Arc::new(Sentence::diamond(atom("Q"))));
        assert_eq!(s.to_string(), "!P(a) v <>Q(a)");
        assert_eq!(s.atoms().len(), 2);
        assert_eq!(s.predicates().get("Q"), Some(&1));
        assert!(s.is_grounded());
        assert!(s.contains(&Sentence::atom(Atom::ground("Q", &["a"]))));
        assert!(!s.contains(&Sentence::atom(Atom::ground("R", &["a"]))));
    }
}
