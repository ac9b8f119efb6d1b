//! Defines the public event types broadcast by a `CadenceScheduler`.
//!
//! This module acts as the public API for the scheduler's event system.
//! Subscribers receive these strongly-typed events over broadcast channels;
//! delivery is best-effort and never influences scheduling.

use crate::common::TaskId;
use tokio::time::Instant;

/// Events related to the lifecycle and structure of the scheduler itself.
#[derive(Debug, Clone)]
pub enum SystemEvent {
    /// Fired once when `start()` has spawned every task context.
    SchedulerStarted { timestamp: Instant },
    /// Fired once when `stop()` has joined every task context.
    SchedulerStopped,
    /// Fired when a new task is successfully registered.
    TaskAdded { id: TaskId },
    /// Fired when a task is removed.
    TaskRemoved { id: TaskId },
}

/// Events related to individual task invocations.
#[derive(Debug, Clone)]
pub enum TaskEvent {
    /// Fired each time a task's action completes successfully.
    TaskFired { id: TaskId },
    /// Fired when a task's action returns an error. The error is contained
    /// and the task keeps its cadence.
    InvocationFailed { id: TaskId, error: String },
    /// Fired when a task's result callback returns an error. The error is
    /// contained and the task keeps its cadence.
    CallbackFailed { id: TaskId, error: String },
}
