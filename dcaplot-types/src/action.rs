//! Action types.
//!
//! `WireAction` is what the tracker emits and the sink transmits. `ShowAction` is a user
//! intent routed by the dispatcher in dcaplot-core.

use serde::{Deserialize, Serialize};

use crate::{Assignment, BusDelta, BusIndex, GroupConfig, RecordId};

// ============================================================================
// Wire actions
// ============================================================================

/// One step sent to the control surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum WireAction {
    /// Put an assignment on a bus
    Assign { bus: BusIndex, assignment: Assignment },
    /// Take an assignment off a bus
    Unassign { bus: BusIndex, assignment: Assignment },
    /// Mute the source behind an assignment
    Mute { assignment: Assignment },
    /// Unmute the source behind an assignment
    Unmute { assignment: Assignment },
    /// Set the scribble-strip name of a bus
    Rename { bus: BusIndex, name: String },
}

impl WireAction {
    pub fn assign(bus: BusIndex, assignment: Assignment) -> Self {
        WireAction::Assign { bus, assignment }
    }

    pub fn unassign(bus: BusIndex, assignment: Assignment) -> Self {
        WireAction::Unassign { bus, assignment }
    }

    pub fn mute(assignment: Assignment) -> Self {
        WireAction::Mute { assignment }
    }

    pub fn unmute(assignment: Assignment) -> Self {
        WireAction::Unmute { assignment }
    }

    pub fn rename(bus: BusIndex, name: impl Into<String>) -> Self {
        WireAction::Rename {
            bus,
            name: name.into(),
        }
    }

    pub fn bus(&self) -> Option<BusIndex> {
        match self {
            WireAction::Assign { bus, .. }
            | WireAction::Unassign { bus, .. }
            | WireAction::Rename { bus, .. } => Some(*bus),
            WireAction::Mute { .. } | WireAction::Unmute { .. } => None,
        }
    }

    pub fn assignment(&self) -> Option<Assignment> {
        match self {
            WireAction::Assign { assignment, .. }
            | WireAction::Unassign { assignment, .. }
            | WireAction::Mute { assignment }
            | WireAction::Unmute { assignment } => Some(*assignment),
            WireAction::Rename { .. } => None,
        }
    }
}

impl std::fmt::Display for WireAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireAction::Assign { bus, assignment } => write!(f, "assign DCA {} <- {}", bus, assignment),
            WireAction::Unassign { bus, assignment } => {
                write!(f, "unassign DCA {} -> {}", bus, assignment)
            }
            WireAction::Mute { assignment } => write!(f, "mute {}", assignment),
            WireAction::Unmute { assignment } => write!(f, "unmute {}", assignment),
            WireAction::Rename { bus, name } => write!(f, "rename DCA {} \"{}\"", bus, name),
        }
    }
}

// ============================================================================
// Show actions (user intents)
// ============================================================================

/// Edits to the cue sequence and requests to the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShowAction {
    /// Append a change record at the end of the sequence
    AppendChange { label: String, deltas: Vec<BusDelta> },
    /// Append a reset record at the end of the sequence
    AppendReset { label: String, new_name: String },
    /// Insert a change record at a position
    InsertChange {
        index: usize,
        label: String,
        deltas: Vec<BusDelta>,
    },
    /// Replace a change record's per-bus deltas
    EditRecord(RecordId, Vec<BusDelta>),
    /// Change the name a reset record gives every bus
    RenameReset(RecordId, String),
    /// Change a record's display label
    RelabelRecord(RecordId, String),
    /// Move a record to a new position
    MoveRecord(RecordId, usize),
    /// Delete a record
    RemoveRecord(RecordId),
    /// Preview the diff for a record
    Select(RecordId),
    /// Transmit the diff for a record
    Execute(RecordId),
    /// Pick which option a role currently stands for
    SetRoleChoice { role: u32, choice: Assignment },
    /// Replace role and choir definitions, keeping role choices that are still valid
    RenewGroups(GroupConfig),
    /// Forget live state without transmitting anything
    ResetLive,
}
