//! # dcaplot-types
//!
//! Shared type definitions for the dcaplot workspace: assignments, change records,
//! live/predicted bus state and the actions that flow between them.
//! The ledger, tracker and coordinator live in dcaplot-core.

pub mod action;
mod assignment;
pub mod reduce;
pub mod state;

pub use action::*;
pub use assignment::{AssignState, Assignment, SourceKind};

// Re-export all state types at crate root for convenience
pub use state::*;

/// Unique identifier for a change record (one authored cue).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(u32);

impl RecordId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 0-based index of an output bus. Displayed 1-based, the way the console labels it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct BusIndex(u16);

impl BusIndex {
    pub fn new(index: u16) -> Self {
        Self(index)
    }

    pub fn get(self) -> u16 {
        self.0
    }

    /// Position in per-bus vectors.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// 1-based bus number as printed on the surface.
    pub fn number(self) -> u16 {
        self.0 + 1
    }

    /// All bus indices for a session with `count` buses.
    pub fn all(count: usize) -> impl Iterator<Item = BusIndex> {
        (0..count.min(u16::MAX as usize)).map(|i| BusIndex(i as u16))
    }
}

impl std::fmt::Display for BusIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Default name for a bus that has never been named: "DCA 1", "DCA 2", ...
pub fn default_bus_name(bus: BusIndex) -> String {
    format!("DCA {}", bus.number())
}
