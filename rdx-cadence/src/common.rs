//! Contains common, primitive types shared across the scheduler.
//!
//! This module defines the handle type used to identify registered tasks and
//! the lifecycle states a scheduler moves through. Using distinct types
//! improves type safety and code clarity.

use slotmap::new_key_type;

new_key_type! {
    /// Uniquely and safely identifies a registered task within a scheduler.
    ///
    /// This key is returned by `add_task` and is the only way to refer to a
    /// task afterwards. Keys are guaranteed to be unique and are never
    /// reused, preventing stale handle bugs.
    pub struct TaskId;
}

/// The lifecycle states of a [`CadenceScheduler`](crate::scheduler::CadenceScheduler).
///
/// A scheduler is constructed `Idle`, moves to `Running` on `start()`, and
/// passes through `Stopping` while `stop()` waits for every task context to
/// exit, ending at `Stopped`. Restarting a `Stopped` scheduler is permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Constructed, never started. Tasks may be added or removed.
    Idle,
    /// Task contexts are live. The task set is frozen.
    Running,
    /// A `stop()` is in progress, waiting on in-flight invocations.
    Stopping,
    /// All task contexts have exited. Tasks may be added or removed again.
    Stopped,
}
