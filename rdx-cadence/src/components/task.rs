//! Defines the registered unit of recurring work and its configuration.

use crate::error::{Result, SchedulerError};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// The type-erased value produced by one invocation of a task's action.
///
/// The receiver of the value (a result callback) is responsible for
/// downcasting it to the expected concrete type. Actions with nothing
/// meaningful to report return `Box::new(())`.
pub type TaskOutput = Box<dyn Any + Send>;

/// A function closure invoked on every scheduled tick of a task.
///
/// Returning `Err` marks the invocation as failed; the error is contained
/// and reported, and the task keeps its cadence.
pub type TaskAction = Box<dyn FnMut() -> anyhow::Result<TaskOutput> + Send>;

/// An optional closure handed the output of each successful invocation.
pub type ResultCallback = Box<dyn FnMut(TaskOutput) -> anyhow::Result<()> + Send>;

/// Configuration for one recurring task: what to run, how often, and what
/// to do with each result.
///
/// The interval is a fixed *delay*: it is measured from the end of one
/// invocation to the start of the next, so a slow action pushes its own
/// subsequent invocations later rather than overlapping them.
pub struct TaskSpec {
    pub(crate) interval: Duration,
    pub(crate) action: TaskAction,
    pub(crate) on_result: Option<ResultCallback>,
}

impl TaskSpec {
    /// Creates a spec that runs `action` once per `interval`.
    pub fn new<A>(interval: Duration, action: A) -> Self
    where
        A: FnMut() -> anyhow::Result<TaskOutput> + Send + 'static,
    {
        Self {
            interval,
            action: Box::new(action),
            on_result: None,
        }
    }

    /// Attaches a callback invoked with the output of every successful
    /// invocation.
    pub fn with_on_result<C>(mut self, on_result: C) -> Self
    where
        C: FnMut(TaskOutput) -> anyhow::Result<()> + Send + 'static,
    {
        self.on_result = Some(Box::new(on_result));
        self
    }

    /// The configured repeat interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(SchedulerError::InvalidConfiguration(
                "interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// The mutable half of a registered task, owned by at most one runner at a
/// time. Keeping action and callback behind one lock makes each
/// invocation-plus-callback step atomic with respect to the task itself.
pub(crate) struct TaskBody {
    pub(crate) action: TaskAction,
    pub(crate) on_result: Option<ResultCallback>,
}

/// A task as stored in the scheduler's registry. The body is shared with
/// the task's runner while the scheduler is running and survives across
/// start/stop cycles.
pub(crate) struct RegisteredTask {
    pub(crate) interval: Duration,
    pub(crate) body: Arc<Mutex<TaskBody>>,
}

impl RegisteredTask {
    pub(crate) fn new(spec: TaskSpec) -> Self {
        Self {
            interval: spec.interval,
            body: Arc::new(Mutex::new(TaskBody {
                action: spec.action,
                on_result: spec.on_result,
            })),
        }
    }
}
