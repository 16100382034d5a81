use crate::{default_bus_name, BusIndex, LiveState, WireAction};

pub(super) fn reduce_live(action: &WireAction, live: &mut LiveState) -> bool {
    match action {
        WireAction::Assign { bus, assignment } => {
            if live.bus(*bus).is_none() {
                log::warn!(target: "live", "assign to unknown DCA {}", bus);
                return false;
            }
            // Last write wins: an assignment sits on at most one bus.
            let mut evicted = false;
            for (i, other) in live.buses.iter_mut().enumerate() {
                if i != bus.index() && other.members.remove(assignment) {
                    evicted = true;
                    log::warn!(
                        target: "live",
                        "{} was still live on DCA {} when assigned to DCA {}",
                        assignment,
                        i + 1,
                        bus
                    );
                }
            }
            let inserted = live
                .bus_mut(*bus)
                .map(|b| b.members.insert(*assignment))
                .unwrap_or(false);
            debug_assert!(
                live.buses.iter().filter(|b| b.members.contains(assignment)).count() <= 1,
                "{} live on more than one bus",
                assignment
            );
            inserted || evicted
        }
        WireAction::Unassign { bus, assignment } => live
            .bus_mut(*bus)
            .map(|b| b.members.remove(assignment))
            .unwrap_or(false),
        WireAction::Rename { bus, name } => match live.bus_mut(*bus) {
            Some(b) if b.name != *name => {
                b.name = name.clone();
                true
            }
            _ => false,
        },
        WireAction::Mute { .. } | WireAction::Unmute { .. } => false,
    }
}

/// Forget every live member and restore default names, without transmitting anything.
pub fn clear_live(live: &mut LiveState) -> bool {
    let mut changed = false;
    for (i, bus) in live.buses.iter_mut().enumerate() {
        if !bus.members.is_empty() {
            bus.members.clear();
            changed = true;
        }
        let default = default_bus_name(BusIndex::new(i as u16));
        if bus.name != default {
            bus.name = default;
            changed = true;
        }
    }
    changed
}
