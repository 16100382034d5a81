//! Live state tracker: diff a cue target against live state and commit what was delivered.
//!
//! Emitted order is always cross-bus unassigns, assigns, unassigns, renames, then
//! mutes/unmutes, so the surface never sees an assignment on two buses at once.

mod mute;
mod target;

pub use target::{CueTarget, TargetBus};

use std::collections::{HashMap, HashSet};

use dcaplot_types::reduce::{commit_all, reduce_wire};
use dcaplot_types::{AssignState, Assignment, BusIndex, LiveState, WireAction};

use crate::resolver::GroupResolver;
use mute::MuteScratch;

/// How strongly a target entry claims a concrete source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Rank {
    Inherited,
    ExplicitGroup,
    ExplicitIndividual,
}

impl Rank {
    fn of(assignment: Assignment, explicit: bool) -> Self {
        match (explicit, assignment.is_group()) {
            (false, _) => Rank::Inherited,
            (true, true) => Rank::ExplicitGroup,
            (true, false) => Rank::ExplicitIndividual,
        }
    }
}

/// Concrete per-bus plan after group expansion.
#[derive(Debug, Default)]
struct Plan {
    wanted: Vec<Vec<Assignment>>,
    unwanted: Vec<Vec<Assignment>>,
    names: Vec<Option<String>>,
    /// Unassign live members the target does not list.
    reconcile: bool,
}

impl Plan {
    fn sized(bus_count: usize) -> Self {
        Self {
            wanted: vec![Vec::new(); bus_count],
            unwanted: vec![Vec::new(); bus_count],
            names: vec![None; bus_count],
            reconcile: false,
        }
    }

    fn build(target: &CueTarget, resolver: &GroupResolver, live: &LiveState) -> Self {
        let bus_count = live.bus_count();
        let mut plan = Self::sized(bus_count);

        // (bus, assignment, wanted, explicit) before expansion
        let raw: Vec<(usize, Assignment, bool, bool)> = match target {
            CueTarget::Resolved { buses, .. } => {
                plan.reconcile = true;
                for (i, bus) in buses.iter().enumerate().take(bus_count) {
                    plan.names[i] = bus.name.clone();
                }
                buses
                    .iter()
                    .enumerate()
                    .flat_map(|(i, bus)| {
                        bus.entries
                            .iter()
                            .map(move |(a, s)| (i, *a, s.is_wanted(), *s != AssignState::None))
                    })
                    .collect()
            }
            CueTarget::Deltas { deltas, .. } => {
                for (i, delta) in deltas.iter().enumerate().take(bus_count) {
                    plan.names[i] = delta.name.clone();
                }
                deltas
                    .iter()
                    .enumerate()
                    .flat_map(|(i, d)| {
                        d.add
                            .iter()
                            .map(move |a| (i, *a, true, true))
                            .chain(d.rem.iter().map(move |a| (i, *a, false, true)))
                    })
                    .collect()
            }
            CueTarget::Reset { new_name, .. } => {
                plan.reconcile = true;
                plan.names = vec![Some(new_name.clone()); bus_count];
                Vec::new()
            }
        };

        // A group never re-places a member that an explicit individual entry on the same bus
        // already decides.
        let shielded: HashSet<(usize, Assignment)> = raw
            .iter()
            .filter(|(_, a, _, explicit)| *explicit && !a.is_group())
            .map(|(bus, a, _, _)| (*bus, *a))
            .collect();

        // A source lives on at most one bus. Higher rank wins; between equals the later bus
        // wins unless both are inherited and the earlier one is where it is live.
        let mut owner: HashMap<Assignment, (usize, Rank)> = HashMap::new();

        for (bus, assignment, wanted, explicit) in raw {
            if bus >= bus_count {
                log::debug!(target: "tracker", "target names DCA {} beyond {} buses", bus + 1, bus_count);
                continue;
            }
            let rank = Rank::of(assignment, explicit);
            let members = if assignment.is_group() {
                resolver
                    .expand(assignment)
                    .into_iter()
                    .filter(|m| !shielded.contains(&(bus, *m)))
                    .collect()
            } else {
                vec![assignment]
            };
            for member in members {
                if plan.wanted[bus].contains(&member) {
                    if let Some(o) = owner.get_mut(&member).filter(|o| o.0 == bus) {
                        o.1 = o.1.max(rank);
                    }
                    continue;
                }
                if plan.unwanted[bus].contains(&member) {
                    continue;
                }
                if !wanted {
                    plan.unwanted[bus].push(member);
                    continue;
                }
                match owner.get(&member).copied() {
                    Some((_, other_rank)) if other_rank > rank => continue,
                    Some((other, Rank::Inherited))
                        if rank == Rank::Inherited && live.is_live_on(BusIndex::new(other as u16), member) =>
                    {
                        continue
                    }
                    Some((other, other_rank)) => {
                        if other_rank == rank && rank != Rank::Inherited {
                            log::warn!(
                                target: "tracker",
                                "{} wanted on DCA {} and DCA {}; keeping DCA {}",
                                member,
                                BusIndex::new(other as u16),
                                BusIndex::new(bus as u16),
                                BusIndex::new(bus as u16)
                            );
                        }
                        plan.wanted[other].retain(|a| *a != member);
                    }
                    None => {}
                }
                owner.insert(member, (bus, rank));
                plan.wanted[bus].push(member);
            }
        }
        plan
    }
}

/// Ordered actions that take `live` to `target`.
pub fn diff(target: &CueTarget, live: &LiveState, resolver: &GroupResolver) -> Vec<WireAction> {
    let bus_count = live.bus_count();
    let plan = Plan::build(target, resolver, live);

    // Scratch copy tracks what has already been emitted so nothing is unassigned twice.
    let mut work = live.clone();
    let mut mutes = MuteScratch::default();
    let mut cross = Vec::new();
    let mut assigns = Vec::new();
    let mut unassigns = Vec::new();
    let mut renames = Vec::new();

    for bus in BusIndex::all(bus_count) {
        for &assignment in &plan.wanted[bus.index()] {
            if work.is_live_on(bus, assignment) {
                continue;
            }
            if let Some(other) = work.bus_of(assignment) {
                let action = WireAction::unassign(other, assignment);
                reduce_wire(&action, &mut work);
                cross.push(action);
                mutes.unassigned(assignment);
            }
            let action = WireAction::assign(bus, assignment);
            reduce_wire(&action, &mut work);
            assigns.push(action);
            mutes.assigned(assignment);
        }
    }

    for bus in BusIndex::all(bus_count) {
        let wanted = &plan.wanted[bus.index()];
        let mut leaving: Vec<Assignment> = plan.unwanted[bus.index()]
            .iter()
            .copied()
            .filter(|a| work.is_live_on(bus, *a))
            .collect();
        if plan.reconcile {
            let unlisted: Vec<Assignment> = work
                .bus(bus)
                .map(|b| {
                    b.members
                        .iter()
                        .filter(|a| !wanted.contains(a) && !leaving.contains(a))
                        .copied()
                        .collect()
                })
                .unwrap_or_default();
            leaving.extend(unlisted);
        }
        for assignment in leaving {
            let action = WireAction::unassign(bus, assignment);
            reduce_wire(&action, &mut work);
            unassigns.push(action);
            mutes.unassigned(assignment);
        }
    }

    for bus in BusIndex::all(bus_count) {
        if let (Some(name), Some(live_bus)) = (&plan.names[bus.index()], live.bus(bus)) {
            if *name != live_bus.name {
                renames.push(WireAction::rename(bus, name.clone()));
            }
        }
    }

    let mut actions = cross;
    actions.extend(assigns);
    actions.extend(unassigns);
    actions.extend(renames);
    actions.extend(mutes.into_actions());
    log::debug!(target: "tracker", "diff for record {}: {} actions", target.record(), actions.len());
    actions
}

/// Apply delivered actions to live state in emitted order. Returns how many changed it.
pub fn commit(actions: &[WireAction], live: &mut LiveState) -> usize {
    commit_all(actions, live)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcaplot_types::{
        AssignState, BusDelta, ChoirConfig, GroupConfig, RecordId, RecordKind, RoleConfig,
    };

    use crate::ledger::Ledger;

    fn bus(i: u16) -> BusIndex {
        BusIndex::new(i)
    }

    fn deltas(per_bus: Vec<BusDelta>) -> CueTarget {
        CueTarget::Deltas {
            record: RecordId::new(1),
            deltas: per_bus,
        }
    }

    fn resolver() -> GroupResolver {
        GroupResolver::new(GroupConfig {
            roles: vec![RoleConfig {
                id: 1,
                name: "Lead".into(),
                options: vec![Assignment::input(1), Assignment::input(2)],
                default: Some(Assignment::input(1)),
                current: None,
            }],
            choirs: vec![ChoirConfig {
                id: 1,
                name: "Altos".into(),
                members: vec![Assignment::input(3), Assignment::input(4), Assignment::input(5)],
            }],
        })
    }

    #[test]
    fn first_assign_unmutes() {
        let live = LiveState::new(3);
        let target = deltas(vec![BusDelta::adding([Assignment::input(1)])]);
        assert_eq!(
            diff(&target, &live, &GroupResolver::default()),
            vec![
                WireAction::assign(bus(0), Assignment::input(1)),
                WireAction::unmute(Assignment::input(1)),
            ]
        );
    }

    #[test]
    fn moving_between_buses_unassigns_first_without_mutes() {
        let mut live = LiveState::new(3);
        commit(&[WireAction::assign(bus(0), Assignment::input(1))], &mut live);
        let target = deltas(vec![BusDelta::default(), BusDelta::adding([Assignment::input(1)])]);
        assert_eq!(
            diff(&target, &live, &GroupResolver::default()),
            vec![
                WireAction::unassign(bus(0), Assignment::input(1)),
                WireAction::assign(bus(1), Assignment::input(1)),
            ]
        );
    }

    #[test]
    fn removal_mutes() {
        let mut live = LiveState::new(2);
        commit(&[WireAction::assign(bus(1), Assignment::fx(2))], &mut live);
        let target = deltas(vec![BusDelta::default(), BusDelta::removing([Assignment::fx(2)])]);
        assert_eq!(
            diff(&target, &live, &GroupResolver::default()),
            vec![
                WireAction::unassign(bus(1), Assignment::fx(2)),
                WireAction::mute(Assignment::fx(2)),
            ]
        );
    }

    #[test]
    fn removal_of_something_not_live_is_silent() {
        let live = LiveState::new(2);
        let target = deltas(vec![BusDelta::removing([Assignment::input(4)])]);
        assert!(diff(&target, &live, &GroupResolver::default()).is_empty());
    }

    #[test]
    fn rename_only_when_different() {
        let live = LiveState::new(2);
        let target = deltas(vec![
            BusDelta::default().named("DCA 1"),
            BusDelta::default().named("Horns"),
        ]);
        assert_eq!(
            diff(&target, &live, &GroupResolver::default()),
            vec![WireAction::rename(bus(1), "Horns")]
        );
    }

    #[test]
    fn emitted_order_is_cross_assign_unassign_rename_mute() {
        let mut live = LiveState::new(3);
        commit(
            &[
                WireAction::assign(bus(0), Assignment::input(1)),
                WireAction::assign(bus(2), Assignment::input(7)),
            ],
            &mut live,
        );
        let target = deltas(vec![
            BusDelta::adding([Assignment::input(2)]).named("Band"),
            BusDelta::adding([Assignment::input(1)]),
            BusDelta::removing([Assignment::input(7)]),
        ]);
        assert_eq!(
            diff(&target, &live, &GroupResolver::default()),
            vec![
                WireAction::unassign(bus(0), Assignment::input(1)),
                WireAction::assign(bus(0), Assignment::input(2)),
                WireAction::assign(bus(1), Assignment::input(1)),
                WireAction::unassign(bus(2), Assignment::input(7)),
                WireAction::rename(bus(0), "Band"),
                WireAction::unmute(Assignment::input(2)),
                WireAction::mute(Assignment::input(7)),
            ]
        );
    }

    #[test]
    fn resolved_target_reconciles_unlisted_live_members() {
        let mut live = LiveState::new(2);
        commit(&[WireAction::assign(bus(0), Assignment::input(9))], &mut live);

        let mut ledger = Ledger::new(2);
        ledger.append(
            RecordId::new(1),
            "one",
            RecordKind::Change {
                deltas: vec![BusDelta::adding([Assignment::input(1)])],
            },
        );
        let target = CueTarget::from_slot(&ledger.records()[0], true);
        assert_eq!(
            diff(&target, &live, &GroupResolver::default()),
            vec![
                WireAction::assign(bus(0), Assignment::input(1)),
                WireAction::unassign(bus(0), Assignment::input(9)),
                WireAction::unmute(Assignment::input(1)),
                WireAction::mute(Assignment::input(9)),
            ]
        );

        // Without inheritance tracking the same record only adds.
        let raw = CueTarget::from_slot(&ledger.records()[0], false);
        assert_eq!(
            diff(&raw, &live, &GroupResolver::default()),
            vec![
                WireAction::assign(bus(0), Assignment::input(1)),
                WireAction::unmute(Assignment::input(1)),
            ]
        );
    }

    #[test]
    fn choir_expands_and_individual_entries_win() {
        let live = LiveState::new(2);
        let target = deltas(vec![
            BusDelta::adding([Assignment::choir(1)]),
            BusDelta::adding([Assignment::input(4)]),
        ]);
        let actions = diff(&target, &live, &resolver());
        assert_eq!(
            actions,
            vec![
                WireAction::assign(bus(0), Assignment::input(3)),
                WireAction::assign(bus(0), Assignment::input(5)),
                WireAction::assign(bus(1), Assignment::input(4)),
                WireAction::unmute(Assignment::input(3)),
                WireAction::unmute(Assignment::input(5)),
                WireAction::unmute(Assignment::input(4)),
            ]
        );
    }

    #[test]
    fn explicit_remove_overrides_group_member() {
        let mut live = LiveState::new(1);
        commit(&[WireAction::assign(bus(0), Assignment::input(3))], &mut live);
        let target = deltas(vec![BusDelta {
            name: None,
            add: vec![Assignment::choir(1)],
            rem: vec![Assignment::input(3)],
        }]);
        let actions = diff(&target, &live, &resolver());
        assert!(actions.contains(&WireAction::unassign(bus(0), Assignment::input(3))));
        assert!(!actions.contains(&WireAction::assign(bus(0), Assignment::input(3))));
    }

    #[test]
    fn individual_entry_keeps_its_source_off_a_later_choir() {
        let live = LiveState::new(2);
        let target = deltas(vec![
            BusDelta::adding([Assignment::input(4)]),
            BusDelta::adding([Assignment::choir(1)]),
        ]);
        assert_eq!(
            diff(&target, &live, &resolver()),
            vec![
                WireAction::assign(bus(0), Assignment::input(4)),
                WireAction::assign(bus(1), Assignment::input(3)),
                WireAction::assign(bus(1), Assignment::input(5)),
                WireAction::unmute(Assignment::input(4)),
                WireAction::unmute(Assignment::input(3)),
                WireAction::unmute(Assignment::input(5)),
            ]
        );
    }

    #[test]
    fn removal_on_one_bus_does_not_block_a_choir_on_another() {
        let mut live = LiveState::new(2);
        commit(&[WireAction::assign(bus(0), Assignment::input(3))], &mut live);
        let target = deltas(vec![
            BusDelta::removing([Assignment::input(3)]),
            BusDelta::adding([Assignment::choir(1)]),
        ]);
        let actions = diff(&target, &live, &resolver());
        assert_eq!(
            actions,
            vec![
                WireAction::unassign(bus(0), Assignment::input(3)),
                WireAction::assign(bus(1), Assignment::input(3)),
                WireAction::assign(bus(1), Assignment::input(4)),
                WireAction::assign(bus(1), Assignment::input(5)),
                WireAction::unmute(Assignment::input(4)),
                WireAction::unmute(Assignment::input(5)),
            ]
        );
        commit(&actions, &mut live);
        assert_eq!(live.bus_of(Assignment::input(3)), Some(bus(1)));
    }

    #[test]
    fn explicit_choir_takes_over_an_inherited_individual() {
        let mut ledger = Ledger::new(2);
        let change = |deltas| RecordKind::Change { deltas };
        ledger.append(RecordId::new(1), "", change(vec![BusDelta::adding([Assignment::input(3)])]));
        ledger.append(
            RecordId::new(2),
            "",
            change(vec![BusDelta::default(), BusDelta::adding([Assignment::choir(1)])]),
        );
        ledger.append(RecordId::new(3), "", change(Vec::new()));

        let groups = resolver();
        let mut live = LiveState::new(2);
        let first = diff(&CueTarget::from_slot(&ledger.records()[0], true), &live, &groups);
        commit(&first, &mut live);

        let second = diff(&CueTarget::from_slot(&ledger.records()[1], true), &live, &groups);
        assert_eq!(
            second,
            vec![
                WireAction::unassign(bus(0), Assignment::input(3)),
                WireAction::assign(bus(1), Assignment::input(3)),
                WireAction::assign(bus(1), Assignment::input(4)),
                WireAction::assign(bus(1), Assignment::input(5)),
                WireAction::unmute(Assignment::input(4)),
                WireAction::unmute(Assignment::input(5)),
            ]
        );
        commit(&second, &mut live);

        // Both placements are inherited by record 3; the live one holds.
        let third = CueTarget::from_slot(&ledger.records()[2], true);
        assert!(diff(&third, &live, &groups).is_empty());
    }

    #[test]
    fn role_expands_to_current_choice() {
        let mut live = LiveState::new(1);
        let target = deltas(vec![BusDelta::adding([Assignment::role(1)])]);
        let mut groups = resolver();

        let actions = diff(&target, &live, &groups);
        assert_eq!(actions[0], WireAction::assign(bus(0), Assignment::input(1)));
        commit(&actions, &mut live);

        groups.set_role_choice(1, Assignment::input(2));
        let mut ledger = Ledger::new(1);
        ledger.append(
            RecordId::new(1),
            "lead",
            RecordKind::Change {
                deltas: vec![BusDelta::adding([Assignment::role(1)])],
            },
        );
        let resolved = CueTarget::from_slot(&ledger.records()[0], true);
        assert_eq!(
            diff(&resolved, &live, &groups),
            vec![
                WireAction::assign(bus(0), Assignment::input(2)),
                WireAction::unassign(bus(0), Assignment::input(1)),
                WireAction::unmute(Assignment::input(2)),
                WireAction::mute(Assignment::input(1)),
            ]
        );
    }

    #[test]
    fn reset_target_clears_and_renames() {
        let mut live = LiveState::new(2);
        commit(
            &[
                WireAction::assign(bus(0), Assignment::input(1)),
                WireAction::assign(bus(1), Assignment::input(2)),
            ],
            &mut live,
        );
        let reset = CueTarget::Reset {
            record: RecordId::new(9),
            new_name: "-".into(),
        };
        let actions = diff(&reset, &live, &GroupResolver::default());
        assert_eq!(
            actions,
            vec![
                WireAction::unassign(bus(0), Assignment::input(1)),
                WireAction::unassign(bus(1), Assignment::input(2)),
                WireAction::rename(bus(0), "-"),
                WireAction::rename(bus(1), "-"),
                WireAction::mute(Assignment::input(1)),
                WireAction::mute(Assignment::input(2)),
            ]
        );
        commit(&actions, &mut live);
        assert!(live.is_empty());
        assert!(diff(&reset, &live, &GroupResolver::default()).is_empty());
    }

    #[test]
    fn same_source_wanted_on_two_buses_ends_on_the_last() {
        let mut live = LiveState::new(2);
        let target = deltas(vec![
            BusDelta::adding([Assignment::input(1)]),
            BusDelta::adding([Assignment::input(1)]),
        ]);
        let actions = diff(&target, &live, &GroupResolver::default());
        assert_eq!(
            actions,
            vec![
                WireAction::assign(bus(1), Assignment::input(1)),
                WireAction::unmute(Assignment::input(1)),
            ]
        );
        commit(&actions, &mut live);
        assert_eq!(live.bus_of(Assignment::input(1)), Some(bus(1)));
    }

    #[test]
    fn moved_source_stays_put_on_the_following_cue() {
        let mut ledger = Ledger::new(2);
        let change = |deltas| RecordKind::Change { deltas };
        ledger.append(RecordId::new(1), "", change(vec![BusDelta::adding([Assignment::input(1)])]));
        ledger.append(
            RecordId::new(2),
            "",
            change(vec![BusDelta::default(), BusDelta::adding([Assignment::input(1)])]),
        );
        ledger.append(RecordId::new(3), "", change(Vec::new()));

        let mut live = LiveState::new(2);
        let groups = GroupResolver::default();
        for slot in ledger.records().iter().take(2) {
            let actions = diff(&CueTarget::from_slot(slot, true), &live, &groups);
            commit(&actions, &mut live);
        }
        assert_eq!(live.bus_of(Assignment::input(1)), Some(bus(1)));

        // Record 3 inherits input#1 on both buses; the live placement wins.
        let third = CueTarget::from_slot(&ledger.records()[2], true);
        assert!(diff(&third, &live, &groups).is_empty());
    }

    #[test]
    fn stale_bus_in_target_is_ignored() {
        let live = LiveState::new(1);
        let target = deltas(vec![BusDelta::default(), BusDelta::adding([Assignment::input(1)])]);
        assert!(diff(&target, &live, &GroupResolver::default()).is_empty());
    }

    #[test]
    fn inherited_entries_are_wanted() {
        let live = LiveState::new(1);
        let target = CueTarget::Resolved {
            record: RecordId::new(2),
            buses: vec![TargetBus {
                name: None,
                entries: vec![(Assignment::input(6), AssignState::None)],
            }],
        };
        assert_eq!(
            diff(&target, &live, &GroupResolver::default())[0],
            WireAction::assign(bus(0), Assignment::input(6))
        );
    }
}
