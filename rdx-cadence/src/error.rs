//! Error types for the scheduler.

use crate::common::{LifecycleState, TaskId};
use thiserror::Error;

/// Result type for scheduler operations.
pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Errors surfaced synchronously by scheduler operations.
///
/// Errors raised *inside* a scheduled action or result callback are a
/// separate category: they are contained at the invocation boundary,
/// reported through the log stream and the task-event stream, and never
/// appear here.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A task was registered with a configuration the scheduler cannot run.
    #[error("invalid task configuration: {0}")]
    InvalidConfiguration(String),

    /// An operation was attempted in a lifecycle state that forbids it,
    /// e.g. adding a task or calling `start()` while already running.
    #[error("operation not permitted while scheduler is {0:?}")]
    IllegalState(LifecycleState),

    /// A handle did not resolve to a registered task.
    #[error("task not found: {0:?}")]
    TaskNotFound(TaskId),
}
