//! Models: truth assignments from atoms to the regions where they hold.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::interval::{intersection, Interval, SISet};
use crate::syntax::{Atom, Proposition};

/// A (partial) interpretation: each atom maps to the region where it is true.
///
/// Atoms without an entry are unknown: false under standard semantics and
/// unconstrained under liquid semantics. An entry may be empty, which records
/// an atom known to be false everywhere. Equality compares the non-empty
/// regions only.
#[derive(Debug, Clone)]
pub struct Model {
    atoms: HashMap<Atom, SISet>,
    max_interval: Interval,
}

impl Model {
    pub fn new(max_interval: Interval) -> Self {
        Model {
            atoms: HashMap::new(),
            max_interval,
        }
    }

    /// Build a model from signed observations. True regions are added before
    /// false regions are removed, so a false observation wins where both
    /// are given. Every observed atom gets an entry, even if only observed
    /// false.
    pub fn from_propositions<'a, I>(partial: I, max_interval: Interval) -> Self
    where
        I: IntoIterator<Item = (&'a Proposition, &'a SISet)>,
    {
        let mut model = Model::new(max_interval);
        let (positive, negative): (Vec<_>, Vec<_>) =
            partial.into_iter().partition(|(prop, _)| prop.sign);
        for (prop, set) in positive {
            model.set_atom(&prop.atom, set);
        }
        for (prop, set) in negative {
            model.unset_atom(&prop.atom, set);
        }
        model
    }

    pub fn max_interval(&self) -> Interval {
        self.max_interval
    }

    /// Re-bound every assignment to a new universe.
    pub fn set_max_interval(&mut self, max_interval: Interval) {
        self.max_interval = max_interval;
        for set in self.atoms.values_mut() {
            set.set_max_interval(max_interval);
        }
    }

    /// Atoms with an entry, in order.
    pub fn atoms(&self) -> BTreeSet<Atom> {
        self.atoms.keys().cloned().collect()
    }

    pub fn has_atom(&self, atom: &Atom) -> bool {
        self.atoms.contains_key(atom)
    }

    /// Where `atom` is true; empty if it is not assigned.
    pub fn get_atom(&self, atom: &Atom) -> SISet {
        self.atoms
            .get(atom)
            .cloned()
            .unwrap_or_else(|| SISet::new(false, self.max_interval))
    }

    /// Make `atom` true over `set` in addition to where it already holds.
    pub fn set_atom(&mut self, atom: &Atom, set: &SISet) {
        let max = self.max_interval;
        let entry = self
            .atoms
            .entry(atom.clone())
            .or_insert_with(|| SISet::new(set.force_liquid(), max));
        entry.add_set(set);
    }

    /// Make `atom` false over `set`. The atom keeps its entry even when
    /// nothing is left.
    pub fn unset_atom(&mut self, atom: &Atom, set: &SISet) {
        let max = self.max_interval;
        self.atoms
            .entry(atom.clone())
            .or_insert_with(|| SISet::new(set.force_liquid(), max))
            .subtract(set);
    }

    /// Forget `atom`, making it unknown again.
    pub fn clear_atom(&mut self, atom: &Atom) {
        self.atoms.remove(atom);
    }

    /// Remove every region assigned in `other`.
    pub fn subtract(&mut self, other: &Model) {
        for (atom, set) in &other.atoms {
            self.unset_atom(atom, set);
        }
    }

    /// Keep only regions assigned in both models.
    pub fn intersect(&mut self, other: &Model) {
        let mut kept = HashMap::new();
        for (atom, set) in self.atoms.drain() {
            let Some(theirs) = other.atoms.get(&atom) else {
                continue;
            };
            let mut common = intersection(&set, theirs);
            common.set_force_liquid(set.force_liquid());
            kept.insert(atom, common);
        }
        self.atoms = kept;
    }

    /// Flip every atom of `all_atoms` over `max_interval`.
    pub fn compliment(&mut self, all_atoms: &BTreeSet<Atom>, max_interval: Interval) {
        self.set_max_interval(max_interval);
        let mut flipped = HashMap::new();
        for atom in all_atoms {
            flipped.insert(atom.clone(), self.get_atom(atom).compliment());
        }
        self.atoms = flipped;
    }

    /// Total number of intervals over all atoms.
    pub fn size(&self) -> u64 {
        self.atoms
            .values()
            .fold(0u64, |acc, set| acc.saturating_add(set.size()))
    }

    fn assigned(&self) -> BTreeMap<&Atom, &SISet> {
        self.atoms.iter().filter(|(_, set)| !set.is_empty()).collect()
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.max_interval == other.max_interval && self.assigned() == other.assigned()
    }
}

impl Eq for Model {}

/// `from` with the regions of `to_subtract` removed.
pub fn subtract_model(from: &Model, to_subtract: &Model) -> Model {
    let mut result = from.clone();
    result.subtract(to_subtract);
    result
}

pub fn intersect_model(a: &Model, b: &Model) -> Model {
    let mut result = a.clone();
    result.intersect(b);
    result
}

pub fn compliment_model(a: &Model, all_atoms: &BTreeSet<Atom>, max_interval: Interval) -> Model {
    let mut result = a.clone();
    result.compliment(all_atoms, max_interval);
    result
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<(&Atom, &SISet)> = self.atoms.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (i, (atom, set)) in entries.into_iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{} @ {}", atom, set)?;
        }
        Ok(())
    }
}
