//! State shared between the foreground select path and the cue worker, and the two
//! operations that touch it.
//!
//! The mutex is held only for short bookkeeping sections, never across a sink call.
//! An execution counts as in flight from the moment it is queued: `queued` is bumped by the
//! handle before the command is sent, `busy` covers the run itself.

use std::sync::mpsc::Sender;
use std::sync::{Mutex, MutexGuard, PoisonError};

use dcaplot_types::reduce::is_committable;
use dcaplot_types::{LiveState, PredictedState, RecordId, WireAction};

use super::commands::{CoordinatorFeedback, ExecutionReport, SelectOutcome};
use crate::resolver::GroupResolver;
use crate::sink::ActionSink;
use crate::tracker::{self, CueTarget};

#[derive(Debug)]
struct CachedDiff {
    target: CueTarget,
    generation: u64,
    actions: Vec<WireAction>,
}

#[derive(Debug)]
pub(crate) struct Shared {
    pub live: LiveState,
    pub resolver: GroupResolver,
    /// Executions sent to the worker that have not started yet.
    pub queued: usize,
    pub busy: bool,
    /// Most recent selection, kept so a deferred refresh knows what to show.
    pub selection: Option<CueTarget>,
    pub pending_refresh: bool,
    pub preview: Option<(RecordId, PredictedState)>,
    /// Bumped whenever live state or groups change; a cached diff from an older generation
    /// is stale.
    pub generation: u64,
    cache: Option<CachedDiff>,
}

impl Shared {
    pub fn new(live: LiveState, resolver: GroupResolver) -> Self {
        Self {
            live,
            resolver,
            queued: 0,
            busy: false,
            selection: None,
            pending_refresh: false,
            preview: None,
            generation: 0,
            cache: None,
        }
    }

    pub fn is_executing(&self) -> bool {
        self.busy || self.queued > 0
    }

    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.cache = None;
    }

    /// Forget the selection and everything derived from it.
    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.pending_refresh = false;
        self.preview = None;
        self.cache = None;
    }

    fn cached_actions(&mut self, target: &CueTarget) -> Option<Vec<WireAction>> {
        match self.cache.take() {
            Some(cache) if cache.target == *target && cache.generation == self.generation => {
                Some(cache.actions)
            }
            _ => None,
        }
    }
}

/// Lock that survives a panic on the other side.
pub(crate) fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds `busy` for the duration of an execution and clears it on every exit path.
pub(crate) struct BusyGuard<'a> {
    shared: &'a Mutex<Shared>,
    released: bool,
}

impl<'a> BusyGuard<'a> {
    pub fn acquire(shared: &'a Mutex<Shared>) -> Self {
        let mut state = lock(shared);
        debug_assert!(!state.busy, "execute started while another is running");
        state.queued = state.queued.saturating_sub(1);
        state.busy = true;
        Self {
            shared,
            released: false,
        }
    }

    /// Clear `busy` and, in the same critical section, collect the selection that must be
    /// refreshed, so no select can slip in between and be lost. With more executions queued
    /// the refresh waits for the last of them.
    pub fn release(mut self, is_last: bool) -> Option<CueTarget> {
        let mut state = lock(self.shared);
        state.busy = false;
        self.released = true;
        if is_last {
            state.pending_refresh = true;
        }
        if state.queued > 0 || !std::mem::take(&mut state.pending_refresh) {
            return None;
        }
        state.selection.clone()
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if !self.released {
            lock(self.shared).busy = false;
        }
    }
}

/// Foreground selection. Never waits on the sink: if an execution is in flight the request
/// is folded into the refresh that follows it.
pub(crate) fn select_now(
    shared: &Mutex<Shared>,
    target: CueTarget,
    feedback: &Sender<CoordinatorFeedback>,
) -> SelectOutcome {
    let record = target.record();
    let mut state = lock(shared);
    state.selection = Some(target.clone());

    if state.is_executing() {
        state.pending_refresh = true;
        drop(state);
        log::debug!(target: "coordinator", "select {} deferred while executing", record);
        let _ = feedback.send(CoordinatorFeedback::SelectDeferred(record));
        return SelectOutcome::Deferred;
    }

    state.preview = None;
    let actions = tracker::diff(&target, &state.live, &state.resolver);
    let preview = PredictedState::from_actions(&state.live, &actions);
    let generation = state.generation;
    state.cache = Some(CachedDiff {
        target,
        generation,
        actions,
    });
    state.preview = Some((record, preview.clone()));
    drop(state);

    let _ = feedback.send(CoordinatorFeedback::PreviewUpdated {
        record,
        preview: preview.clone(),
    });
    SelectOutcome::Published(preview)
}

/// Compute, send and commit the actions for `target`. Runs on the cue worker.
pub(crate) fn execute_now(
    shared: &Mutex<Shared>,
    sink: Option<&dyn ActionSink>,
    target: CueTarget,
    is_last: bool,
    feedback: &Sender<CoordinatorFeedback>,
) -> ExecutionReport {
    let record = target.record();
    let guard = BusyGuard::acquire(shared);

    let actions = {
        let mut state = lock(shared);
        match state.cached_actions(&target) {
            Some(actions) => actions,
            None => tracker::diff(&target, &state.live, &state.resolver),
        }
    };

    let mut delivered = Vec::with_capacity(actions.len());
    let mut failed = Vec::new();
    let transmitted = match sink {
        Some(sink) => {
            for action in actions {
                match sink.send(&action) {
                    Ok(()) => delivered.push(action),
                    Err(e) => {
                        log::warn!(target: "coordinator", "{} sink failed on {}: {}", sink.name(), action, e);
                        failed.push((action, e.to_string()));
                    }
                }
            }
            true
        }
        None => {
            log::error!(
                target: "coordinator",
                "no DCA-capable sink configured; record {} applied to live state without transmitting",
                record
            );
            delivered = actions;
            false
        }
    };

    {
        let mut state = lock(shared);
        let changed = tracker::commit(&delivered, &mut state.live);
        state.invalidate();
        log::debug!(
            target: "coordinator",
            "record {}: {} delivered ({} changed live), {} failed",
            record,
            delivered.iter().filter(|a| is_committable(a)).count(),
            changed,
            failed.len()
        );
    }

    if let Some(selection) = guard.release(is_last) {
        select_now(shared, selection, feedback);
    }

    let report = ExecutionReport {
        record,
        delivered,
        failed,
        transmitted,
    };
    let _ = feedback.send(CoordinatorFeedback::Executed(report.clone()));
    report
}
