//! Cue coordinator: serialises execution against previews.
//!
//! Execution runs on a dedicated worker thread fed by a crossbeam channel, so the sink can
//! block without stalling the foreground. Selection runs on the caller's thread and only
//! takes the shared lock briefly. While an execution is in flight, selections are recorded
//! and coalesced into one refresh when it finishes.

pub mod commands;
mod shared;
mod worker;

pub use commands::{CoordinatorCmd, CoordinatorFeedback, ExecutionReport, SelectOutcome};

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender as CrossbeamSender;
use dcaplot_types::reduce::clear_live;
use dcaplot_types::{Assignment, GroupConfig, LiveState, PredictedState, RecordId};

use crate::resolver::GroupResolver;
use crate::sink::ActionSink;
use crate::tracker::CueTarget;
use shared::{lock, select_now, Shared};
use worker::CueWorker;

/// Main-thread handle to the cue worker. Dropping it shuts the worker down.
pub struct CueHandle {
    cmd_tx: CrossbeamSender<CoordinatorCmd>,
    feedback_tx: Sender<CoordinatorFeedback>,
    feedback_rx: Receiver<CoordinatorFeedback>,
    shared: Arc<Mutex<Shared>>,
    join_handle: Option<JoinHandle<()>>,
}

impl CueHandle {
    /// Start a coordinator with a fresh live state. With no sink, executions update live
    /// state without transmitting and log an error each time.
    pub fn new(bus_count: usize, resolver: GroupResolver, sink: Option<Arc<dyn ActionSink>>) -> Self {
        let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded();
        let (feedback_tx, feedback_rx) = mpsc::channel();
        let shared = Arc::new(Mutex::new(Shared::new(LiveState::new(bus_count), resolver)));

        let worker = CueWorker::new(cmd_rx, feedback_tx.clone(), Arc::clone(&shared), sink);
        let join_handle = thread::Builder::new()
            .name("dcaplot-cue".into())
            .spawn(move || worker.run())
            .ok();
        if join_handle.is_none() {
            log::error!(target: "coordinator", "failed to spawn cue worker; executions will be dropped");
        }

        Self {
            cmd_tx,
            feedback_tx,
            feedback_rx,
            shared,
            join_handle,
        }
    }

    fn send_cmd(&self, cmd: CoordinatorCmd) -> Result<(), String> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| "Cue worker disconnected".to_string())
    }

    /// Compute and publish the preview for `target`, or defer it if an execution is running.
    pub fn select(&self, target: CueTarget) -> SelectOutcome {
        select_now(&self.shared, target, &self.feedback_tx)
    }

    /// Re-select `target` if it is the record currently selected. Call after any edit that
    /// may change a record's resolved state.
    pub fn on_record_property_changed(&self, target: CueTarget) -> Option<SelectOutcome> {
        if self.last_selected() != Some(target.record()) {
            return None;
        }
        Some(self.select(target))
    }

    /// Count the execution as in flight, then hand it to the worker. Selections made from
    /// here on are deferred until it has committed.
    fn queue_execute(
        &self,
        target: CueTarget,
        is_last: bool,
        reply: Option<Sender<ExecutionReport>>,
    ) -> Result<(), String> {
        lock(&self.shared).queued += 1;
        let result = self.send_cmd(CoordinatorCmd::Execute {
            target,
            is_last,
            reply,
        });
        if result.is_err() {
            let mut state = lock(&self.shared);
            state.queued = state.queued.saturating_sub(1);
        }
        result
    }

    /// Queue an execution. Returns once the command is queued; the report arrives as feedback.
    pub fn execute(&self, target: CueTarget, is_last: bool) -> Result<(), String> {
        self.queue_execute(target, is_last, None)
    }

    /// Queue an execution and wait for its report.
    pub fn execute_blocking(&self, target: CueTarget, is_last: bool) -> Result<ExecutionReport, String> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.queue_execute(target, is_last, Some(reply_tx))?;
        reply_rx
            .recv()
            .map_err(|_| "Cue worker dropped the execution".to_string())
    }

    /// Drop the selection and its preview, e.g. when the selected record was deleted.
    pub fn clear_selection(&self) {
        let record = {
            let mut state = lock(&self.shared);
            let record = state.selection.as_ref().map(CueTarget::record);
            state.clear_selection();
            record
        };
        if let Some(record) = record {
            log::debug!(target: "coordinator", "selection of record {} cleared", record);
            let _ = self.feedback_tx.send(CoordinatorFeedback::SelectionCleared(record));
        }
    }

    pub fn last_selected(&self) -> Option<RecordId> {
        lock(&self.shared).selection.as_ref().map(CueTarget::record)
    }

    /// True from the moment an execution is queued until it has committed.
    pub fn is_busy(&self) -> bool {
        lock(&self.shared).is_executing()
    }

    /// The most recently published preview, if one is current.
    pub fn preview(&self) -> Option<(RecordId, PredictedState)> {
        lock(&self.shared).preview.clone()
    }

    pub fn live_snapshot(&self) -> LiveState {
        lock(&self.shared).live.clone()
    }

    /// Change which member a role resolves to, then refresh the selection.
    pub fn set_role_choice(&self, role: u32, choice: Assignment) -> bool {
        let changed = {
            let mut state = lock(&self.shared);
            let changed = state.resolver.set_role_choice(role, choice);
            if changed {
                state.invalidate();
            }
            changed
        };
        if changed {
            self.refresh_selection();
        }
        changed
    }

    /// Replace the group configuration, keeping valid role choices.
    pub fn renew_groups(&self, config: GroupConfig) {
        {
            let mut state = lock(&self.shared);
            state.resolver.renew(config);
            state.invalidate();
        }
        self.refresh_selection();
    }

    /// The effective group configuration, with current role choices.
    pub fn groups(&self) -> GroupConfig {
        lock(&self.shared).resolver.config().clone()
    }

    /// Forget everything live and go back to default names. Refused while executing.
    pub fn reset_live(&self) -> bool {
        {
            let mut state = lock(&self.shared);
            if state.is_executing() {
                log::warn!(target: "coordinator", "reset ignored while an execution is in flight");
                return false;
            }
            clear_live(&mut state.live);
            state.invalidate();
        }
        self.refresh_selection();
        true
    }

    fn refresh_selection(&self) {
        let selection = lock(&self.shared).selection.clone();
        if let Some(target) = selection {
            self.select(target);
        }
    }

    /// Drain all pending feedback messages.
    pub fn drain_feedback(&self) -> Vec<CoordinatorFeedback> {
        let mut out = Vec::new();
        while let Ok(msg) = self.feedback_rx.try_recv() {
            out.push(msg);
        }
        out
    }

    /// Direct access to the feedback channel for callers that want to block.
    pub fn feedback(&self) -> &Receiver<CoordinatorFeedback> {
        &self.feedback_rx
    }
}

impl Drop for CueHandle {
    fn drop(&mut self) {
        let _ = self.send_cmd(CoordinatorCmd::Shutdown);
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.join();
        }
    }
}
