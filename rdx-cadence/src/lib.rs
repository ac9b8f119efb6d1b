//! # Cadence
//!
//! A minimal recurring-task scheduler for Rust.
//!
//! Cadence lets an application register units of work that should repeat on a
//! fixed cadence, then drives every registered task from its own background
//! execution context until told to stop. It is designed as a library: the
//! application owns the scheduler value, and several independent schedulers
//! may coexist in one process.
//!
//! ## Core Concepts
//!
//! - **TaskSpec**: One registered unit of recurring work: an action, a
//!   repeat interval, and an optional callback handed each invocation's
//!   result.
//! - **Fixed-delay cadence**: The interval is measured from the *end* of one
//!   invocation to the *start* of the next, so a slow action drifts its own
//!   schedule later instead of overlapping itself.
//! - **Independent contexts**: Each task runs on its own spawned context.
//!   A failing or slow task never blocks or delays a sibling.
//! - **Deterministic stop**: `stop()` signals every context, then blocks
//!   until each one has finished any in-flight invocation and exited.
//! - **Event-Driven**: The scheduler broadcasts strongly-typed events
//!   (`SystemEvent`, `TaskEvent`) that your application can subscribe to.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use cadence::prelude::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // 1. Create a scheduler. It starts out Idle.
//!     let scheduler = CadenceScheduler::new(CadenceConfig::default());
//!
//!     // 2. Subscribe to an event stream before starting.
//!     let mut task_events = scheduler.subscribe_task_events();
//!     tokio::spawn(async move {
//!         while let Ok(event) = task_events.recv().await {
//!             println!("Received Task Event: {:?}", event);
//!         }
//!     });
//!
//!     // 3. Register tasks. Handles allow later removal.
//!     let _heartbeat = scheduler
//!         .add_task(TaskSpec::new(Duration::from_secs(5), || {
//!             println!("5 seconds since the last heartbeat finished!");
//!             Ok(Box::new(()))
//!         }))
//!         .await?;
//!
//!     // 4. Run until Ctrl+C, then stop cleanly.
//!     scheduler.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub const SCHEDULER_NAME: &str = "Cadence Scheduler";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");


// Declare all the modules in the crate.
pub mod common;
pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod scheduler;

/// A prelude module for easy importing of the most common Cadence types.
pub mod prelude {
    pub use crate::common::{LifecycleState, TaskId};
    pub use crate::components::task::{TaskOutput, TaskSpec};
    pub use crate::config::CadenceConfig;
    pub use crate::error::{Result, SchedulerError};
    pub use crate::events::{SystemEvent, TaskEvent};
    pub use crate::scheduler::CadenceScheduler;
}
