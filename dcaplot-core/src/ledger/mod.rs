//! The assignment ledger: an ordered sequence of change records, each carrying its resolved
//! per-bus state.
//!
//! Records live in a flat `Vec`; a record's predecessor is simply the one at `index - 1`.
//! Every mutation re-derives the touched record from its predecessor and then pushes the
//! difference forward (`cascade`) until successors with their own opinion absorb it.

pub mod tuples;

pub use tuples::{clear, invert, ChangeTuple, TupleChange};

use std::collections::HashSet;

use dcaplot_types::{
    AssignState, Assignment, BusDelta, BusIndex, RecordId, RecordKind, ResolvedBus, ResolvedEntry,
    default_bus_name,
};

use tuples::{default_name_tuples, describe_buses, name_tuples};

/// One cue in the sequence together with its resolved bus state.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSlot {
    pub id: RecordId,
    pub label: String,
    pub kind: RecordKind,
    /// Resolved state, one per bus. Derived, never authored directly.
    pub buses: Vec<ResolvedBus>,
}

impl RecordSlot {
    pub fn is_reset(&self) -> bool {
        self.kind.is_reset()
    }

    pub fn bus(&self, bus: BusIndex) -> Option<&ResolvedBus> {
        self.buses.get(bus.index())
    }

    /// Explicit deltas of a change record; empty for a reset.
    pub fn deltas(&self) -> &[BusDelta] {
        match &self.kind {
            RecordKind::Change { deltas } => deltas,
            RecordKind::Reset { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    bus_count: usize,
    records: Vec<RecordSlot>,
}

impl Ledger {
    pub fn new(bus_count: usize) -> Self {
        Self {
            bus_count,
            records: Vec::new(),
        }
    }

    pub fn bus_count(&self) -> usize {
        self.bus_count
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[RecordSlot] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&RecordSlot> {
        self.records.get(index)
    }

    pub fn position(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    pub fn record(&self, id: RecordId) -> Option<&RecordSlot> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn is_last(&self, id: RecordId) -> bool {
        self.records.last().map(|r| r.id == id).unwrap_or(false)
    }

    /// Resolved buses of a record, or `None` for an unknown id.
    pub fn resolved(&self, id: RecordId) -> Option<&[ResolvedBus]> {
        self.record(id).map(|r| r.buses.as_slice())
    }

    /// Largest id in use, for allocating the next one.
    pub fn max_id(&self) -> Option<RecordId> {
        self.records.iter().map(|r| r.id).max()
    }

    // ------------------------------------------------------------------
    // Tuple primitives
    // ------------------------------------------------------------------

    /// Describe a record's resolved state as tuples. A reset yields one name tuple per bus.
    /// An out-of-range index yields nothing.
    pub fn derive_change_tuples(&self, index: usize) -> Vec<ChangeTuple> {
        match self.records.get(index) {
            Some(slot) => match &slot.kind {
                RecordKind::Change { .. } => describe_buses(&slot.buses),
                RecordKind::Reset { new_name } => BusIndex::all(self.bus_count)
                    .map(|bus| ChangeTuple::name(bus, new_name.clone()))
                    .collect(),
            },
            None => Vec::new(),
        }
    }

    /// Apply tuples to the record at `index`, dropping the ones it absorbs.
    pub fn apply_change_tuples(&mut self, index: usize, tuples: &mut Vec<ChangeTuple>) {
        match self.records.get_mut(index) {
            Some(slot) => apply_to(slot, tuples),
            None => log::debug!(target: "ledger", "apply on stale index {}", index),
        }
    }

    /// Push tuples forward from the record after `index` until absorbed or out of records.
    /// Returns how many records were visited.
    pub fn cascade(&mut self, index: usize, tuples: &mut Vec<ChangeTuple>) -> usize {
        let mut visited = 0;
        for slot in self.records.iter_mut().skip(index + 1) {
            if tuples.is_empty() {
                break;
            }
            apply_to(slot, tuples);
            visited += 1;
        }
        visited
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Add a record at the end. Returns false if the id is already in use.
    pub fn append(&mut self, id: RecordId, label: impl Into<String>, kind: RecordKind) -> bool {
        let end = self.records.len();
        self.insert(end, id, label, kind)
    }

    /// Add a record at `index` (clamped to the end) and propagate its contribution forward.
    pub fn insert(
        &mut self,
        index: usize,
        id: RecordId,
        label: impl Into<String>,
        kind: RecordKind,
    ) -> bool {
        if self.position(id).is_some() {
            log::warn!(target: "ledger", "record {} already in sequence", id);
            return false;
        }
        let index = index.min(self.records.len());
        let kind = self.normalize(kind);
        self.records.insert(
            index,
            RecordSlot {
                id,
                label: label.into(),
                kind,
                buses: Vec::new(),
            },
        );
        self.seed(index);
        let mut entering = self.enter_tuples(index);
        self.cascade(index, &mut entering);
        true
    }

    /// Replace a change record's explicit deltas.
    pub fn edit(&mut self, id: RecordId, deltas: Vec<BusDelta>) -> bool {
        let Some(index) = self.position(id) else {
            log::debug!(target: "ledger", "edit of unknown record {}", id);
            return false;
        };
        if self.records[index].is_reset() {
            log::warn!(target: "ledger", "record {} is a reset; deltas ignored", id);
            return false;
        }

        let before = self.derive_change_tuples(index);
        let kind = self.normalize(RecordKind::Change { deltas });
        self.records[index].kind = kind;
        self.seed(index);
        let mut after = self.derive_change_tuples(index);

        // An assignment this record used to push downstream and no longer mentions at all
        // must be pulled back out of successors that only inherited it.
        let still_present: HashSet<(BusIndex, Assignment)> =
            after.iter().filter_map(ChangeTuple::key).collect();
        for tuple in &before {
            if tuple.state() == Some(AssignState::Assign) {
                if let Some((bus, assignment)) = tuple.key() {
                    if !still_present.contains(&(bus, assignment)) {
                        after.push(ChangeTuple::entry(bus, assignment, None));
                    }
                }
            }
        }

        let visited = self.cascade(index, &mut after);
        log::debug!(target: "ledger", "edit {} cascaded through {} records", id, visited);
        true
    }

    /// Change the name a reset record gives every bus.
    pub fn rename_reset(&mut self, id: RecordId, new_name: impl Into<String>) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        match &mut self.records[index].kind {
            RecordKind::Reset { new_name: name } => *name = new_name.into(),
            RecordKind::Change { .. } => return false,
        }
        self.seed(index);
        let mut names = self.derive_change_tuples(index);
        self.cascade(index, &mut names);
        true
    }

    /// Labels are display-only and never touch resolved state.
    pub fn relabel(&mut self, id: RecordId, label: impl Into<String>) -> bool {
        let label = label.into();
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(slot) if slot.label != label => {
                slot.label = label;
                true
            }
            _ => false,
        }
    }

    /// Move a record to `new_index` (clamped). No-op if it is already there.
    pub fn move_record(&mut self, id: RecordId, new_index: usize) -> bool {
        let Some(old) = self.position(id) else {
            return false;
        };
        let new_index = new_index.min(self.records.len() - 1);
        if old == new_index {
            return false;
        }

        let mut leaving = self.leave_tuples(old);
        self.cascade(old, &mut leaving);

        let slot = self.records.remove(old);
        self.records.insert(new_index, slot);

        self.seed(new_index);
        let mut entering = self.enter_tuples(new_index);
        self.cascade(new_index, &mut entering);
        true
    }

    /// Delete a record, first withdrawing its contribution from successors.
    pub fn remove(&mut self, id: RecordId) -> Option<RecordSlot> {
        let index = self.position(id)?;
        let mut leaving = self.leave_tuples(index);
        self.cascade(index, &mut leaving);
        Some(self.records.remove(index))
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Tuples a record at `index` inherits: its predecessor's description, or default names.
    fn predecessor_tuples(&self, index: usize) -> Vec<ChangeTuple> {
        if index == 0 {
            default_name_tuples(self.bus_count)
        } else {
            self.derive_change_tuples(index - 1)
        }
    }

    /// Tuples that withdraw the record at `index` from its current position.
    fn leave_tuples(&self, index: usize) -> Vec<ChangeTuple> {
        let Some(slot) = self.records.get(index) else {
            return Vec::new();
        };
        match slot.kind {
            // Inheritance the reset was blocking flows through again.
            RecordKind::Reset { .. } => self.predecessor_tuples(index),
            RecordKind::Change { .. } => {
                let mut tuples = invert(&slot.buses);
                if index == 0 {
                    tuples.extend(default_name_tuples(self.bus_count));
                } else {
                    tuples.extend(name_tuples(&self.records[index - 1].buses));
                }
                tuples
            }
        }
    }

    /// Tuples that introduce the record at `index` to its successors.
    fn enter_tuples(&self, index: usize) -> Vec<ChangeTuple> {
        let Some(slot) = self.records.get(index) else {
            return Vec::new();
        };
        match slot.kind {
            RecordKind::Reset { .. } => {
                let mut tuples = clear(&self.predecessor_tuples(index));
                tuples.extend(self.derive_change_tuples(index));
                tuples
            }
            RecordKind::Change { .. } => self.derive_change_tuples(index),
        }
    }

    /// Rebuild the record at `index` from its explicit data plus its predecessor.
    fn seed(&mut self, index: usize) {
        let mut inherited = self.predecessor_tuples(index);
        let bus_count = self.bus_count;
        let Some(slot) = self.records.get_mut(index) else {
            return;
        };

        slot.buses = BusIndex::all(bus_count)
            .map(|bus| ResolvedBus::new(default_bus_name(bus)))
            .collect();

        match &slot.kind {
            RecordKind::Change { deltas } => {
                for (bus, delta) in slot.buses.iter_mut().zip(deltas) {
                    bus.explicit_name = delta.name.clone();
                    for &assignment in &delta.add {
                        bus.upsert(explicit(assignment, AssignState::Assign));
                    }
                    for &assignment in &delta.rem {
                        if bus.entry(assignment).is_some() {
                            log::debug!(target: "ledger", "{} both added and removed on record {}", assignment, slot.id);
                        }
                        bus.upsert(explicit(assignment, AssignState::Unassign));
                    }
                }
            }
            RecordKind::Reset { new_name } => {
                for bus in &mut slot.buses {
                    bus.explicit_name = Some(new_name.clone());
                }
            }
        }

        apply_to(slot, &mut inherited);
    }

    /// Pad or trim a change record's deltas to the session bus count.
    fn normalize(&self, kind: RecordKind) -> RecordKind {
        match kind {
            RecordKind::Change { mut deltas } => {
                if deltas.len() > self.bus_count {
                    if deltas[self.bus_count..].iter().any(|d| !d.is_empty()) {
                        log::warn!(target: "ledger", "dropping deltas beyond {} buses", self.bus_count);
                    }
                    deltas.truncate(self.bus_count);
                }
                deltas.resize_with(self.bus_count, BusDelta::default);
                RecordKind::Change { deltas }
            }
            reset => reset,
        }
    }
}

fn explicit(assignment: Assignment, state: AssignState) -> ResolvedEntry {
    ResolvedEntry {
        assignment,
        state,
        inherited: false,
    }
}

/// Absorb rule. A reset absorbs everything. Otherwise each tuple either updates the bus and
/// keeps travelling, or meets an explicit opinion and stops here.
fn apply_to(slot: &mut RecordSlot, tuples: &mut Vec<ChangeTuple>) {
    if slot.is_reset() {
        tuples.clear();
        return;
    }
    let buses = &mut slot.buses;
    tuples.retain(|tuple| apply_one(buses, tuple));
}

/// Returns true if the tuple keeps propagating.
fn apply_one(buses: &mut [ResolvedBus], tuple: &ChangeTuple) -> bool {
    let Some(bus) = buses.get_mut(tuple.bus.index()) else {
        log::warn!(target: "ledger", "tuple for missing DCA {} dropped", tuple.bus);
        return false;
    };

    match &tuple.change {
        TupleChange::Name(name) => {
            bus.inherited_name = name.clone();
            bus.explicit_name.is_none()
        }
        TupleChange::Entry { assignment, state } => {
            let wanted = state.map(AssignState::is_wanted).unwrap_or(false);
            match bus.entry_mut(*assignment) {
                None => {
                    if wanted {
                        bus.upsert(ResolvedEntry {
                            assignment: *assignment,
                            state: AssignState::None,
                            inherited: true,
                        });
                    }
                    true
                }
                Some(entry) if entry.state.is_explicit() => {
                    entry.inherited = wanted;
                    false
                }
                Some(_) => {
                    if !wanted {
                        bus.remove(*assignment);
                    }
                    true
                }
            }
        }
    }
}
