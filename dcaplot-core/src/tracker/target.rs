use dcaplot_types::{AssignState, Assignment, BusDelta, RecordId, RecordKind};

use crate::ledger::RecordSlot;

/// Desired state of one bus as seen by the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetBus {
    pub name: Option<String>,
    pub entries: Vec<(Assignment, AssignState)>,
}

/// What a cue wants the surface to look like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CueTarget {
    /// Fully resolved state from the ledger. Anything live that is not listed gets unassigned.
    Resolved { record: RecordId, buses: Vec<TargetBus> },
    /// A record's raw deltas, for sequences without inheritance tracking.
    Deltas { record: RecordId, deltas: Vec<BusDelta> },
    /// Clear every bus and rename them all.
    Reset { record: RecordId, new_name: String },
}

impl CueTarget {
    /// Target for a ledger record. With `track_inheritance` off, only the record's own
    /// deltas count.
    pub fn from_slot(slot: &RecordSlot, track_inheritance: bool) -> Self {
        match &slot.kind {
            RecordKind::Reset { new_name } => CueTarget::Reset {
                record: slot.id,
                new_name: new_name.clone(),
            },
            RecordKind::Change { deltas } if !track_inheritance => CueTarget::Deltas {
                record: slot.id,
                deltas: deltas.clone(),
            },
            RecordKind::Change { .. } => CueTarget::Resolved {
                record: slot.id,
                buses: slot
                    .buses
                    .iter()
                    .map(|bus| TargetBus {
                        name: Some(bus.name().to_string()),
                        entries: bus.entries.iter().map(|e| (e.assignment, e.state)).collect(),
                    })
                    .collect(),
            },
        }
    }

    pub fn record(&self) -> RecordId {
        match self {
            CueTarget::Resolved { record, .. }
            | CueTarget::Deltas { record, .. }
            | CueTarget::Reset { record, .. } => *record,
        }
    }
}
