use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{default_bus_name, AssignState, Assignment, BusIndex, WireAction};

/// Ground truth for one bus: what the surface actually has assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveBus {
    pub members: BTreeSet<Assignment>,
    /// Last name sent to the surface.
    pub name: String,
}

/// What the hardware is believed to be doing right now. Members are always concrete
/// (input or fx); groups are expanded before anything reaches here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveState {
    pub buses: Vec<LiveBus>,
}

impl LiveState {
    pub fn new(bus_count: usize) -> Self {
        Self {
            buses: BusIndex::all(bus_count)
                .map(|bus| LiveBus {
                    members: BTreeSet::new(),
                    name: default_bus_name(bus),
                })
                .collect(),
        }
    }

    pub fn bus_count(&self) -> usize {
        self.buses.len()
    }

    pub fn bus(&self, bus: BusIndex) -> Option<&LiveBus> {
        self.buses.get(bus.index())
    }

    pub fn bus_mut(&mut self, bus: BusIndex) -> Option<&mut LiveBus> {
        self.buses.get_mut(bus.index())
    }

    pub fn is_live_on(&self, bus: BusIndex, assignment: Assignment) -> bool {
        self.bus(bus)
            .map(|b| b.members.contains(&assignment))
            .unwrap_or(false)
    }

    /// The bus currently carrying `assignment`, if any.
    pub fn bus_of(&self, assignment: Assignment) -> Option<BusIndex> {
        self.buses
            .iter()
            .position(|b| b.members.contains(&assignment))
            .map(|i| BusIndex::new(i as u16))
    }

    /// Every (bus, assignment) pair currently live, in bus order.
    pub fn members(&self) -> impl Iterator<Item = (BusIndex, Assignment)> + '_ {
        self.buses.iter().enumerate().flat_map(|(i, b)| {
            b.members
                .iter()
                .map(move |a| (BusIndex::new(i as u16), *a))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.buses.iter().all(|b| b.members.is_empty())
    }
}

/// Preview of one bus if the selected cue were executed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictedBus {
    /// Assignments the cue would change, annotated ASSIGN or UNASSIGN.
    pub changes: Vec<(Assignment, AssignState)>,
    /// Assignments already live that the cue leaves alone.
    pub unchanged: Vec<Assignment>,
    pub rename: Option<String>,
}

/// Ephemeral preview recomputed on every selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictedState {
    pub buses: Vec<PredictedBus>,
    pub mutes: Vec<Assignment>,
    pub unmutes: Vec<Assignment>,
}

impl PredictedState {
    /// Annotate `live` with the effect of `actions` without touching it.
    pub fn from_actions(live: &LiveState, actions: &[WireAction]) -> Self {
        let mut buses: Vec<PredictedBus> = vec![PredictedBus::default(); live.bus_count()];
        let mut mutes = Vec::new();
        let mut unmutes = Vec::new();

        for action in actions {
            match action {
                WireAction::Assign { bus, assignment } => {
                    if let Some(b) = buses.get_mut(bus.index()) {
                        b.changes.push((*assignment, AssignState::Assign));
                    }
                }
                WireAction::Unassign { bus, assignment } => {
                    if let Some(b) = buses.get_mut(bus.index()) {
                        b.changes.push((*assignment, AssignState::Unassign));
                    }
                }
                WireAction::Rename { bus, name } => {
                    if let Some(b) = buses.get_mut(bus.index()) {
                        b.rename = Some(name.clone());
                    }
                }
                WireAction::Mute { assignment } => mutes.push(*assignment),
                WireAction::Unmute { assignment } => unmutes.push(*assignment),
            }
        }

        for (bus, predicted) in live.buses.iter().zip(buses.iter_mut()) {
            predicted.unchanged = bus
                .members
                .iter()
                .filter(|a| !predicted.changes.iter().any(|(c, _)| c == *a))
                .copied()
                .collect();
        }

        Self {
            buses,
            mutes,
            unmutes,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.mutes.is_empty()
            && self.unmutes.is_empty()
            && self
                .buses
                .iter()
                .all(|b| b.changes.is_empty() && b.rename.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_live_state_has_default_names() {
        let live = LiveState::new(3);
        assert_eq!(live.bus_count(), 3);
        assert_eq!(live.buses[2].name, "DCA 3");
        assert!(live.is_empty());
    }

    #[test]
    fn bus_of_finds_member() {
        let mut live = LiveState::new(2);
        live.buses[1].members.insert(Assignment::input(4));
        assert_eq!(live.bus_of(Assignment::input(4)), Some(BusIndex::new(1)));
        assert_eq!(live.bus_of(Assignment::input(5)), None);
        assert!(live.is_live_on(BusIndex::new(1), Assignment::input(4)));
        assert!(!live.is_live_on(BusIndex::new(9), Assignment::input(4)));
    }

    #[test]
    fn predicted_state_annotates_changes() {
        let mut live = LiveState::new(2);
        live.buses[0].members.insert(Assignment::input(1));
        live.buses[0].members.insert(Assignment::input(2));
        let actions = vec![
            WireAction::unassign(BusIndex::new(0), Assignment::input(1)),
            WireAction::assign(BusIndex::new(1), Assignment::input(1)),
            WireAction::rename(BusIndex::new(1), "Band"),
        ];
        let predicted = PredictedState::from_actions(&live, &actions);
        assert_eq!(
            predicted.buses[0].changes,
            vec![(Assignment::input(1), AssignState::Unassign)]
        );
        assert_eq!(predicted.buses[0].unchanged, vec![Assignment::input(2)]);
        assert_eq!(predicted.buses[1].rename.as_deref(), Some("Band"));
        assert!(!predicted.is_noop());
    }
}
