//! Action sink: where wire actions leave the core.
//!
//! `ActionSink` captures what the coordinator *means* to send (assign, unassign, mute,
//! unmute, rename) independently of how a particular console encodes it. Device encodings
//! live outside this crate; `LogSink` and `TestSink` are the in-tree implementations.

use std::sync::{Arc, Mutex};

use dcaplot_types::WireAction;

use crate::error::{SinkError, SinkResult};

/// Transmits one action at a time. A failed action is treated as not having reached the
/// surface; the sink owns any retry policy.
pub trait ActionSink: Send + Sync {
    fn send(&self, action: &WireAction) -> SinkResult;

    /// Short name for log lines.
    fn name(&self) -> &str {
        "sink"
    }
}

/// Writes every action to the log and reports success. Used for dry runs.
#[derive(Debug, Default)]
pub struct LogSink;

impl ActionSink for LogSink {
    fn send(&self, action: &WireAction) -> SinkResult {
        log::info!(target: "sink", "{}", action);
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Records actions for assertions and can be told to reject specific ones.
#[derive(Debug, Default)]
pub struct TestSink {
    sent: Mutex<Vec<WireAction>>,
    reject: Mutex<Vec<WireAction>>,
}

impl TestSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Actions delivered so far.
    pub fn sent(&self) -> Vec<WireAction> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.clear();
        }
    }

    /// Fail the next time `action` is sent (and every time after).
    pub fn reject(&self, action: WireAction) {
        if let Ok(mut reject) = self.reject.lock() {
            reject.push(action);
        }
    }
}

impl ActionSink for TestSink {
    fn send(&self, action: &WireAction) -> SinkResult {
        let rejected = self
            .reject
            .lock()
            .map(|r| r.contains(action))
            .unwrap_or(false);
        if rejected {
            return Err(SinkError::Rejected {
                action: action.clone(),
                reason: "rejected by test sink".into(),
            });
        }
        self.sent
            .lock()
            .map_err(|_| SinkError::Disconnected)?
            .push(action.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "test"
    }
}

/// Lets the coordinator own a sink while a test keeps an `Arc` for assertions.
pub struct SharedTestSink(pub Arc<TestSink>);

impl ActionSink for SharedTestSink {
    fn send(&self, action: &WireAction) -> SinkResult {
        self.0.send(action)
    }

    fn name(&self) -> &str {
        "test"
    }
}
