//! Cue worker thread: owns the sink and runs executions one at a time.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use crossbeam_channel::Receiver;

use super::commands::{CoordinatorCmd, CoordinatorFeedback};
use super::shared::{execute_now, Shared};
use crate::sink::ActionSink;

pub(crate) struct CueWorker {
    cmd_rx: Receiver<CoordinatorCmd>,
    feedback_tx: Sender<CoordinatorFeedback>,
    shared: Arc<Mutex<Shared>>,
    sink: Option<Arc<dyn ActionSink>>,
}

impl CueWorker {
    pub fn new(
        cmd_rx: Receiver<CoordinatorCmd>,
        feedback_tx: Sender<CoordinatorFeedback>,
        shared: Arc<Mutex<Shared>>,
        sink: Option<Arc<dyn ActionSink>>,
    ) -> Self {
        Self {
            cmd_rx,
            feedback_tx,
            shared,
            sink,
        }
    }

    pub fn run(self) {
        log::debug!(target: "coordinator", "cue worker started");
        while let Ok(cmd) = self.cmd_rx.recv() {
            if self.handle_cmd(cmd) {
                break;
            }
        }
        log::debug!(target: "coordinator", "cue worker stopped");
    }

    /// Returns true on shutdown.
    fn handle_cmd(&self, cmd: CoordinatorCmd) -> bool {
        match cmd {
            CoordinatorCmd::Execute {
                target,
                is_last,
                reply,
            } => {
                let report = execute_now(
                    &self.shared,
                    self.sink.as_deref(),
                    target,
                    is_last,
                    &self.feedback_tx,
                );
                if let Some(reply) = reply {
                    let _ = reply.send(report);
                }
            }
            CoordinatorCmd::Shutdown => return true,
        }
        false
    }
}
