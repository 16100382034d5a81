//! Change tuples: the unit of propagation between neighbouring records.

use dcaplot_types::{default_bus_name, AssignState, Assignment, BusIndex, ResolvedBus};

/// What a tuple says about a bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TupleChange {
    /// New state for one assignment. `None` removes an inherited entry that is no longer warranted.
    Entry {
        assignment: Assignment,
        state: Option<AssignState>,
    },
    /// Rename-only marker carrying the name successors inherit.
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeTuple {
    pub bus: BusIndex,
    pub change: TupleChange,
}

impl ChangeTuple {
    pub fn entry(bus: BusIndex, assignment: Assignment, state: Option<AssignState>) -> Self {
        Self {
            bus,
            change: TupleChange::Entry { assignment, state },
        }
    }

    pub fn name(bus: BusIndex, name: impl Into<String>) -> Self {
        Self {
            bus,
            change: TupleChange::Name(name.into()),
        }
    }

    /// (bus, assignment) key for entry tuples.
    pub fn key(&self) -> Option<(BusIndex, Assignment)> {
        match self.change {
            TupleChange::Entry { assignment, .. } => Some((self.bus, assignment)),
            TupleChange::Name(_) => None,
        }
    }

    pub fn state(&self) -> Option<AssignState> {
        match self.change {
            TupleChange::Entry { state, .. } => state,
            TupleChange::Name(_) => None,
        }
    }
}

/// Tuples describing a change record's resolved buses: every entry, then one name per bus.
pub(crate) fn describe_buses(buses: &[ResolvedBus]) -> Vec<ChangeTuple> {
    let mut tuples = Vec::new();
    for (i, bus) in buses.iter().enumerate() {
        let index = BusIndex::new(i as u16);
        tuples.extend(
            bus.entries
                .iter()
                .map(|e| ChangeTuple::entry(index, e.assignment, Some(e.state))),
        );
    }
    tuples.extend(name_tuples(buses));
    tuples
}

pub(crate) fn name_tuples(buses: &[ResolvedBus]) -> impl Iterator<Item = ChangeTuple> + '_ {
    buses
        .iter()
        .enumerate()
        .map(|(i, bus)| ChangeTuple::name(BusIndex::new(i as u16), bus.name()))
}

/// Names a record with no predecessor inherits.
pub(crate) fn default_name_tuples(bus_count: usize) -> Vec<ChangeTuple> {
    BusIndex::all(bus_count)
        .map(|bus| ChangeTuple::name(bus, default_bus_name(bus)))
        .collect()
}

/// Tuples that undo a change record's contribution when it leaves its position.
///
/// Explicit ASSIGN flips to UNASSIGN and explicit UNASSIGN flips to ASSIGN. The inherited
/// flag refines this: whatever the predecessor already resolves must keep flowing
/// (NONE), and an UNASSIGN of something the predecessor never had undoes to nothing.
pub fn invert(buses: &[ResolvedBus]) -> Vec<ChangeTuple> {
    let mut tuples = Vec::new();
    for (i, bus) in buses.iter().enumerate() {
        let index = BusIndex::new(i as u16);
        for e in &bus.entries {
            let state = match (e.state, e.inherited) {
                (AssignState::Assign, false) => AssignState::Unassign,
                (AssignState::Unassign, true) => AssignState::Assign,
                (AssignState::Unassign, false) => continue,
                (AssignState::Assign, true) | (AssignState::None, _) => AssignState::None,
            };
            tuples.push(ChangeTuple::entry(index, e.assignment, Some(state)));
        }
    }
    tuples
}

/// Clear form of a tuple list: everything still wanted becomes UNASSIGN.
/// Name tuples are dropped; the caller supplies replacement names.
pub fn clear(tuples: &[ChangeTuple]) -> Vec<ChangeTuple> {
    tuples
        .iter()
        .filter_map(|t| match t.change {
            TupleChange::Entry {
                assignment,
                state: Some(state),
            } if state.is_wanted() => Some(ChangeTuple::entry(
                t.bus,
                assignment,
                Some(AssignState::Unassign),
            )),
            _ => None,
        })
        .collect()
}
