//! The per-task execution context that drives one task's recurring cadence.

use crate::common::TaskId;
use crate::components::task::TaskBody;
use crate::events::TaskEvent;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, warn};

/// Runs one registered task on its own cadence until told to stop.
///
/// Cancellation is cooperative: the shutdown signal is only observed
/// between invocations, so an in-flight action always runs to completion.
#[doc(hidden)]
pub(crate) struct TaskRunner {
    id: TaskId,
    interval: Duration,
    body: Arc<Mutex<TaskBody>>,
    shutdown_rx: broadcast::Receiver<()>,
    task_event_sender: broadcast::Sender<TaskEvent>,
}

impl TaskRunner {
    pub(crate) fn new(
        id: TaskId,
        interval: Duration,
        body: Arc<Mutex<TaskBody>>,
        shutdown_rx: broadcast::Receiver<()>,
        task_event_sender: broadcast::Sender<TaskEvent>,
    ) -> Self {
        Self {
            id,
            interval,
            body,
            shutdown_rx,
            task_event_sender,
        }
    }

    /// The fixed-delay loop: invoke, report, then wait out the interval
    /// unless shutdown arrives first.
    pub(crate) async fn run(mut self) {
        debug!(task = ?self.id, interval = ?self.interval, "task context started");
        loop {
            self.invoke_once().await;
            tokio::select! {
                biased;
                // Any outcome on the shutdown channel ends the loop: a
                // signal from stop(), or the channel closing because the
                // scheduler was dropped while running.
                _ = self.shutdown_rx.recv() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
        debug!(task = ?self.id, "task context exited");
    }

    /// Invokes the action once and routes its outcome. Errors from the
    /// action or the result callback are contained here and never escape
    /// into the loop.
    async fn invoke_once(&mut self) {
        let mut body = self.body.lock().await;
        match (body.action)() {
            Ok(output) => {
                self.task_event_sender
                    .send(TaskEvent::TaskFired { id: self.id })
                    .ok();
                if let Some(on_result) = body.on_result.as_mut() {
                    if let Err(err) = on_result(output) {
                        warn!(task = ?self.id, error = %err, "result callback failed");
                        self.task_event_sender
                            .send(TaskEvent::CallbackFailed {
                                id: self.id,
                                error: err.to_string(),
                            })
                            .ok();
                    }
                }
            }
            Err(err) => {
                error!(task = ?self.id, error = %err, "task invocation failed");
                self.task_event_sender
                    .send(TaskEvent::InvocationFailed {
                        id: self.id,
                        error: err.to_string(),
                    })
                    .ok();
            }
        }
    }
}
