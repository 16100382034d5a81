//! Plain-text formatting for cue listings.

use dcaplot_core::ledger::RecordSlot;
use dcaplot_types::{AssignState, BusIndex, RecordKind, ResolvedBus, SessionConfig, WireAction};

pub fn format_record_header(slot: &RecordSlot) -> String {
    let kind = match &slot.kind {
        RecordKind::Change { .. } => String::new(),
        RecordKind::Reset { new_name } => format!(" [reset -> \"{}\"]", new_name),
    };
    if slot.label.is_empty() {
        format!("Cue {}{}", slot.id, kind)
    } else {
        format!("Cue {} {}{}", slot.id, slot.label, kind)
    }
}

/// One bus line: name, then each entry marked `+` (assign), `-` (unassign) or `~` (inherited).
pub fn format_resolved_bus(index: usize, bus: &ResolvedBus, session: &SessionConfig) -> String {
    let entries: Vec<String> = bus
        .entries
        .iter()
        .map(|e| {
            let mark = match e.state {
                AssignState::Assign => '+',
                AssignState::Unassign => '-',
                AssignState::None => '~',
            };
            format!("{}{}", mark, session.display_name(e.assignment))
        })
        .collect();
    format!(
        "  DCA {:<2} {:<16} {}",
        BusIndex::new(index as u16).number(),
        bus.name(),
        entries.join(" ")
    )
    .trim_end()
    .to_string()
}

pub fn format_action(action: &WireAction, session: &SessionConfig) -> String {
    match action.assignment() {
        Some(a) => format!("{} ({})", action, session.display_name(a)),
        None => action.to_string(),
    }
}
