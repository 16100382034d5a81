use serde::{Deserialize, Serialize};

use crate::{AssignState, Assignment};

/// Explicit per-bus data authored on a change record. This is also the on-disk shape:
/// `{"name": null, "add": [["input", 1]], "rem": []}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusDelta {
    pub name: Option<String>,
    #[serde(default)]
    pub add: Vec<Assignment>,
    #[serde(default)]
    pub rem: Vec<Assignment>,
}

impl BusDelta {
    pub fn adding(assignments: impl IntoIterator<Item = Assignment>) -> Self {
        Self {
            add: assignments.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn removing(assignments: impl IntoIterator<Item = Assignment>) -> Self {
        Self {
            rem: assignments.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.add.is_empty() && self.rem.is_empty()
    }
}

/// What a record does, as authored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    /// Per-bus adds/removes, indexed by bus
    Change { deltas: Vec<BusDelta> },
    /// Clears every bus and renames them all
    Reset { new_name: String },
}

impl RecordKind {
    pub fn is_reset(&self) -> bool {
        matches!(self, RecordKind::Reset { .. })
    }
}

/// One resolved assignment under a record's bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEntry {
    pub assignment: Assignment,
    pub state: AssignState,
    /// The predecessor also resolves this assignment on the same bus.
    pub inherited: bool,
}

/// Effective state of one bus at one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedBus {
    pub explicit_name: Option<String>,
    pub inherited_name: String,
    /// Kept sorted by assignment.
    pub entries: Vec<ResolvedEntry>,
}

impl ResolvedBus {
    pub fn new(inherited_name: impl Into<String>) -> Self {
        Self {
            explicit_name: None,
            inherited_name: inherited_name.into(),
            entries: Vec::new(),
        }
    }

    /// Explicit name if set, otherwise the inherited one.
    pub fn name(&self) -> &str {
        self.explicit_name.as_deref().unwrap_or(&self.inherited_name)
    }

    pub fn entry(&self, assignment: Assignment) -> Option<&ResolvedEntry> {
        self.entries
            .binary_search_by(|e| e.assignment.cmp(&assignment))
            .ok()
            .map(|i| &self.entries[i])
    }

    pub fn entry_mut(&mut self, assignment: Assignment) -> Option<&mut ResolvedEntry> {
        match self.entries.binary_search_by(|e| e.assignment.cmp(&assignment)) {
            Ok(i) => Some(&mut self.entries[i]),
            Err(_) => None,
        }
    }

    /// Insert or overwrite the entry for `entry.assignment`.
    pub fn upsert(&mut self, entry: ResolvedEntry) {
        match self
            .entries
            .binary_search_by(|e| e.assignment.cmp(&entry.assignment))
        {
            Ok(i) => self.entries[i] = entry,
            Err(i) => self.entries.insert(i, entry),
        }
    }

    pub fn remove(&mut self, assignment: Assignment) -> bool {
        match self.entries.binary_search_by(|e| e.assignment.cmp(&assignment)) {
            Ok(i) => {
                self.entries.remove(i);
                true
            }
            Err(_) => false,
        }
    }

    /// Assignments this record wants on the bus (ASSIGN or NONE).
    pub fn wanted(&self) -> impl Iterator<Item = Assignment> + '_ {
        self.entries
            .iter()
            .filter(|e| e.state.is_wanted())
            .map(|e| e.assignment)
    }
}
