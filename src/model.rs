use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// One entry of a [`SymbolTable`].
///
/// Serialized untagged: a function is a JSON array of parameter names, a class
/// is an object of members and a module variable is `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Signature {
    Function(Vec<String>),
    Class(BTreeMap<String, Member>),
    Variable,
}

/// A member of a class body: a method with its parameter names, or a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Member {
    Method(Vec<String>),
    Field,
}

/// Name-keyed symbol inventory of a module or a whole package.
///
/// Insertion is first-wins: once a name is present, later definitions of the
/// same name are discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolTable {
    entries: BTreeMap<String, Signature>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `signature` under `name` unless the name is already bound.
    /// Returns whether the entry was inserted.
    pub fn insert_first(&mut self, name: impl Into<String>, signature: Signature) -> bool {
        match self.entries.entry(name.into()) {
            Entry::Vacant(slot) => {
                slot.insert(signature);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Fold `other` into this table with the same first-wins policy.
    pub fn merge_first_wins(&mut self, other: SymbolTable) {
        for (name, signature) in other.entries {
            self.insert_first(name, signature);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Signature> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Signature)> {
        self.entries.iter()
    }
}

/// Class members keyed by name, filled first-wins like [`SymbolTable`].
pub(crate) fn insert_member(members: &mut BTreeMap<String, Member>, name: String, member: Member) {
    members.entry(name).or_insert(member);
}

#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub start: usize,
    pub next_checkpoint: usize,
    pub attempted: usize,
    pub written: usize,
    pub cached: usize,
    pub skipped: usize,
    pub time_limited: bool,
    pub pass_completed: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ProgressStatus {
    pub checkpoint: usize,
    pub total: usize,
    pub remaining: usize,
    pub next_package: Option<String>,
}
