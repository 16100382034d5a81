#![allow(dead_code)]
//! Test harness utilities for dcaplot-core integration tests.

use std::sync::Arc;
use std::time::Duration;

use dcaplot_core::coordinator::{CoordinatorFeedback, CueHandle, ExecutionReport};
use dcaplot_core::dispatch::dispatch_action;
use dcaplot_core::sink::{SharedTestSink, TestSink};
use dcaplot_core::state::{ShowSettings, ShowState};
use dcaplot_types::{BusDelta, RecordId, SessionConfig, ShowAction};

pub const WAIT: Duration = Duration::from_secs(5);

/// A show with `bus_count` buses and default settings.
pub fn make_show(bus_count: usize) -> ShowState {
    ShowState::new(SessionConfig::new(bus_count), ShowSettings::default())
}

/// A coordinator for `show` wired to a recording sink.
pub fn make_handle(show: &ShowState) -> (CueHandle, Arc<TestSink>) {
    let sink = Arc::new(TestSink::new());
    let handle = CueHandle::new(
        show.bus_count(),
        show.resolver(),
        Some(Arc::new(SharedTestSink(Arc::clone(&sink)))),
    );
    (handle, sink)
}

/// Deltas touching only `bus`.
pub fn on_bus(bus_count: usize, bus: usize, delta: BusDelta) -> Vec<BusDelta> {
    let mut deltas = vec![BusDelta::default(); bus_count];
    deltas[bus] = delta;
    deltas
}

/// Append a change record through dispatch and return its id.
pub fn append(show: &mut ShowState, cues: &CueHandle, deltas: Vec<BusDelta>) -> RecordId {
    dispatch_action(
        &ShowAction::AppendChange {
            label: String::new(),
            deltas,
        },
        show,
        cues,
    )
    .record
    .expect("append should allocate a record")
}

/// Execute a record through dispatch and wait for its report.
pub fn execute(show: &mut ShowState, cues: &CueHandle, id: RecordId) -> ExecutionReport {
    let result = dispatch_action(&ShowAction::Execute(id), show, cues);
    assert!(result.error.is_none(), "execute failed: {:?}", result.error);
    wait_for_report(cues, id)
}

/// Block until the worker reports the execution of `id`, discarding other feedback.
pub fn wait_for_report(cues: &CueHandle, id: RecordId) -> ExecutionReport {
    loop {
        match cues.feedback().recv_timeout(WAIT) {
            Ok(CoordinatorFeedback::Executed(report)) if report.record == id => return report,
            Ok(_) => continue,
            Err(e) => panic!("no execution report for record {}: {}", id, e),
        }
    }
}
