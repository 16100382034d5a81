//! Command and feedback types for the cue worker thread.

use std::sync::mpsc::Sender;

use dcaplot_types::{PredictedState, RecordId, WireAction};

use crate::tracker::CueTarget;

/// Commands sent from the foreground to the cue worker.
#[derive(Debug)]
pub enum CoordinatorCmd {
    Execute {
        target: CueTarget,
        /// The record is the last in the sequence; refresh the preview afterwards.
        is_last: bool,
        reply: Option<Sender<ExecutionReport>>,
    },
    Shutdown,
}

/// Outcome of one execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    pub record: RecordId,
    /// Actions that reached the surface (or would have, with no sink) and were committed.
    pub delivered: Vec<WireAction>,
    /// Actions the sink refused, with its reason. Not committed.
    pub failed: Vec<(WireAction, String)>,
    /// False when no sink was configured and live state was updated optimistically.
    pub transmitted: bool,
}

impl ExecutionReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Events reported back to the foreground, drained by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorFeedback {
    PreviewUpdated {
        record: RecordId,
        preview: PredictedState,
    },
    /// A selection arrived mid-execution; the preview refreshes once execution ends.
    SelectDeferred(RecordId),
    /// The selected record no longer exists; its preview is gone.
    SelectionCleared(RecordId),
    Executed(ExecutionReport),
}

/// What `select` did.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectOutcome {
    Published(PredictedState),
    Deferred,
}
