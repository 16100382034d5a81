//! Routes show actions to the ledger and the coordinator.

use dcaplot_types::{BusDelta, RecordId, RecordKind, ShowAction};

use crate::coordinator::{CueHandle, SelectOutcome};
use crate::state::ShowState;

/// What a dispatched action did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DispatchResult {
    /// The show or live state changed.
    pub changed: bool,
    /// Record the action created or addressed, if any.
    pub record: Option<RecordId>,
    /// Preview outcome when the action caused a selection.
    pub selection: Option<SelectOutcome>,
    pub error: Option<String>,
}

impl DispatchResult {
    fn none() -> Self {
        Self::default()
    }

    fn changed(record: Option<RecordId>) -> Self {
        Self {
            changed: true,
            record,
            ..Default::default()
        }
    }

    fn error(record: Option<RecordId>, message: impl Into<String>) -> Self {
        Self {
            record,
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

pub fn dispatch_action(action: &ShowAction, state: &mut ShowState, cues: &CueHandle) -> DispatchResult {
    let mut result = match action {
        ShowAction::AppendChange { label, deltas } => {
            let id = state.allocate_id();
            let deltas = named_deltas(state, deltas);
            let added = state.ledger.append(id, label.clone(), RecordKind::Change { deltas });
            outcome(added, id)
        }
        ShowAction::AppendReset { label, new_name } => {
            let id = state.allocate_id();
            let added = state.ledger.append(
                id,
                label.clone(),
                RecordKind::Reset {
                    new_name: new_name.clone(),
                },
            );
            outcome(added, id)
        }
        ShowAction::InsertChange {
            index,
            label,
            deltas,
        } => {
            let id = state.allocate_id();
            let deltas = named_deltas(state, deltas);
            let added = state
                .ledger
                .insert(*index, id, label.clone(), RecordKind::Change { deltas });
            outcome(added, id)
        }
        ShowAction::EditRecord(id, deltas) => {
            let deltas = named_deltas(state, deltas);
            outcome(state.ledger.edit(*id, deltas), *id)
        }
        ShowAction::RenameReset(id, name) => outcome(state.ledger.rename_reset(*id, name.clone()), *id),
        ShowAction::RelabelRecord(id, label) => {
            return outcome(state.ledger.relabel(*id, label.clone()), *id);
        }
        ShowAction::MoveRecord(id, index) => outcome(state.ledger.move_record(*id, *index), *id),
        ShowAction::RemoveRecord(id) => outcome(state.ledger.remove(*id).is_some(), *id),
        ShowAction::Select(id) => {
            return match state.target_for(*id) {
                Some(target) => DispatchResult {
                    record: Some(*id),
                    selection: Some(cues.select(target)),
                    ..Default::default()
                },
                None => DispatchResult::error(Some(*id), format!("no record {}", id)),
            };
        }
        ShowAction::Execute(id) => {
            let Some(target) = state.target_for(*id) else {
                return DispatchResult::error(Some(*id), format!("no record {}", id));
            };
            return match cues.execute(target, state.is_last(*id)) {
                Ok(()) => DispatchResult::changed(Some(*id)),
                Err(e) => DispatchResult::error(Some(*id), e),
            };
        }
        ShowAction::SetRoleChoice { role, choice } => {
            if !cues.set_role_choice(*role, *choice) {
                return DispatchResult::none();
            }
            if let Some(config) = state.session.groups.role_mut(*role) {
                config.current = Some(*choice);
            }
            return DispatchResult::changed(None);
        }
        ShowAction::RenewGroups(config) => {
            cues.renew_groups(config.clone());
            let renewed = cues.groups();
            if renewed == state.session.groups {
                return DispatchResult::none();
            }
            state.session.groups = renewed;
            return DispatchResult::changed(None);
        }
        ShowAction::ResetLive => {
            return if cues.reset_live() {
                DispatchResult::changed(None)
            } else {
                DispatchResult::error(None, "execution in flight")
            };
        }
    };

    if result.changed {
        result.selection = refresh_selected(state, cues);
    }
    result
}

fn outcome(changed: bool, id: RecordId) -> DispatchResult {
    if changed {
        DispatchResult::changed(Some(id))
    } else {
        log::debug!(target: "show", "action on record {} changed nothing", id);
        DispatchResult::none()
    }
}

fn named_deltas(state: &ShowState, deltas: &[BusDelta]) -> Vec<BusDelta> {
    let mut deltas = deltas.to_vec();
    let named = state.auto_name(&mut deltas);
    if named > 0 {
        log::debug!(target: "show", "auto-named {} buses", named);
    }
    deltas
}

/// A ledger edit may change any record's resolved state, including the one on preview.
/// A selection whose record is gone is dropped.
fn refresh_selected(state: &ShowState, cues: &CueHandle) -> Option<SelectOutcome> {
    let selected = cues.last_selected()?;
    match state.target_for(selected) {
        Some(target) => cues.on_record_property_changed(target),
        None => {
            cues.clear_selection();
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::GroupResolver;
    use crate::state::ShowSettings;
    use dcaplot_types::{Assignment, BusIndex, RoleConfig, SessionConfig};

    fn setup() -> (ShowState, CueHandle) {
        let mut session = SessionConfig::new(2);
        session.groups.roles.push(RoleConfig {
            id: 1,
            name: "Lead".into(),
            options: vec![Assignment::input(1), Assignment::input(2)],
            default: Some(Assignment::input(1)),
            current: Some(Assignment::input(1)),
        });
        let state = ShowState::new(session, ShowSettings::default());
        let cues = CueHandle::new(2, GroupResolver::new(state.session.groups.clone()), None);
        (state, cues)
    }

    fn append(state: &mut ShowState, cues: &CueHandle, deltas: Vec<BusDelta>) -> RecordId {
        let result = dispatch_action(
            &ShowAction::AppendChange {
                label: String::new(),
                deltas,
            },
            state,
            cues,
        );
        result.record.unwrap()
    }

    #[test]
    fn append_allocates_fresh_ids() {
        let (mut state, cues) = setup();
        let a = append(&mut state, &cues, vec![BusDelta::adding([Assignment::input(1)])]);
        let b = append(&mut state, &cues, Vec::new());
        assert_ne!(a, b);
        assert_eq!(state.ledger.len(), 2);
    }

    #[test]
    fn editing_a_predecessor_refreshes_the_selected_preview() {
        let (mut state, cues) = setup();
        let first = append(&mut state, &cues, vec![BusDelta::adding([Assignment::input(1)])]);
        let second = append(&mut state, &cues, Vec::new());

        dispatch_action(&ShowAction::Select(second), &mut state, &cues);
        let (_, before) = cues.preview().unwrap();
        assert_eq!(before.buses[0].changes.len(), 1);

        let result = dispatch_action(
            &ShowAction::EditRecord(first, vec![BusDelta::adding([Assignment::input(3)])]),
            &mut state,
            &cues,
        );
        assert!(result.changed);
        assert!(matches!(result.selection, Some(SelectOutcome::Published(_))));
        let (record, after) = cues.preview().unwrap();
        assert_eq!(record, second);
        assert_eq!(
            after.buses[0].changes,
            vec![(Assignment::input(3), dcaplot_types::AssignState::Assign)]
        );
    }

    #[test]
    fn unknown_records_report_errors() {
        let (mut state, cues) = setup();
        let result = dispatch_action(&ShowAction::Execute(RecordId::new(9)), &mut state, &cues);
        assert!(result.error.is_some());
        assert!(!result.changed);

        let result = dispatch_action(&ShowAction::RemoveRecord(RecordId::new(9)), &mut state, &cues);
        assert!(!result.changed);
    }

    #[test]
    fn role_choice_updates_session_and_coordinator() {
        let (mut state, cues) = setup();
        let result = dispatch_action(
            &ShowAction::SetRoleChoice {
                role: 1,
                choice: Assignment::input(2),
            },
            &mut state,
            &cues,
        );
        assert!(result.changed);
        assert_eq!(state.session.groups.roles[0].current, Some(Assignment::input(2)));
        assert_eq!(cues.groups().roles[0].current, Some(Assignment::input(2)));

        // Not an option: nothing changes anywhere.
        let result = dispatch_action(
            &ShowAction::SetRoleChoice {
                role: 1,
                choice: Assignment::input(7),
            },
            &mut state,
            &cues,
        );
        assert!(!result.changed);
        assert_eq!(state.session.groups.roles[0].current, Some(Assignment::input(2)));
    }

    #[test]
    fn execute_then_reset_live() {
        let (mut state, cues) = setup();
        let id = append(&mut state, &cues, vec![BusDelta::adding([Assignment::input(1)])]);
        let result = dispatch_action(&ShowAction::Execute(id), &mut state, &cues);
        assert!(result.changed);

        // Wait for the worker to report back.
        let report = loop {
            match cues.feedback().recv_timeout(std::time::Duration::from_secs(5)).unwrap() {
                crate::coordinator::CoordinatorFeedback::Executed(report) => break report,
                _ => continue,
            }
        };
        assert_eq!(report.record, id);
        assert!(cues.live_snapshot().is_live_on(BusIndex::new(0), Assignment::input(1)));

        let result = dispatch_action(&ShowAction::ResetLive, &mut state, &cues);
        assert!(result.changed);
        assert!(cues.live_snapshot().is_empty());
    }

    #[test]
    fn removing_the_selected_record_clears_its_preview() {
        let (mut state, cues) = setup();
        append(&mut state, &cues, vec![BusDelta::adding([Assignment::input(1)])]);
        let second = append(&mut state, &cues, vec![BusDelta::adding([Assignment::input(2)])]);
        dispatch_action(&ShowAction::Select(second), &mut state, &cues);
        assert!(cues.preview().is_some());

        let result = dispatch_action(&ShowAction::RemoveRecord(second), &mut state, &cues);
        assert!(result.changed);
        assert!(result.selection.is_none());
        assert!(cues.preview().is_none());
        assert_eq!(cues.last_selected(), None);
    }

    #[test]
    fn relabel_only_reports_real_changes() {
        let (mut state, cues) = setup();
        let id = append(&mut state, &cues, Vec::new());
        let relabel = ShowAction::RelabelRecord(id, "Opening".into());

        assert!(dispatch_action(&relabel, &mut state, &cues).changed);
        assert_eq!(state.ledger.record(id).unwrap().label, "Opening");
        assert!(!dispatch_action(&relabel, &mut state, &cues).changed);
    }

    #[test]
    fn renewing_groups_keeps_a_valid_role_choice() {
        let (mut state, cues) = setup();
        dispatch_action(
            &ShowAction::SetRoleChoice {
                role: 1,
                choice: Assignment::input(2),
            },
            &mut state,
            &cues,
        );

        let mut config = state.session.groups.clone();
        config.roles[0].options.push(Assignment::input(3));
        config.roles[0].current = None;
        let result = dispatch_action(&ShowAction::RenewGroups(config.clone()), &mut state, &cues);
        assert!(result.changed);
        assert_eq!(state.session.groups.roles[0].options.len(), 3);
        assert_eq!(state.session.groups.roles[0].current, Some(Assignment::input(2)));
        assert_eq!(cues.groups(), state.session.groups);

        assert!(!dispatch_action(&ShowAction::RenewGroups(config), &mut state, &cues).changed);
    }
}
