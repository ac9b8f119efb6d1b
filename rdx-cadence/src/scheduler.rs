//! The core scheduler that owns the task registry and the run/stop lifecycle.

use crate::common::{LifecycleState, TaskId};
use crate::components::runner::TaskRunner;
use crate::components::task::{RegisteredTask, TaskSpec};
use crate::config::CadenceConfig;
use crate::error::{Result, SchedulerError};
use crate::events::{SystemEvent, TaskEvent};
use slotmap::SlotMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Everything owned by one start/stop cycle: the signal that tells task
/// contexts to wind down, and the handles `stop()` joins to guarantee
/// quiescence.
struct RunState {
    shutdown_tx: broadcast::Sender<()>,
    handles: Vec<JoinHandle<()>>,
}

enum Lifecycle {
    Idle,
    Running(RunState),
    Stopping,
    Stopped,
}

impl Lifecycle {
    fn state(&self) -> LifecycleState {
        match self {
            Lifecycle::Idle => LifecycleState::Idle,
            Lifecycle::Running(_) => LifecycleState::Running,
            Lifecycle::Stopping => LifecycleState::Stopping,
            Lifecycle::Stopped => LifecycleState::Stopped,
        }
    }
}

/// The main Cadence scheduler.
///
/// This struct is the central point of control. It holds the registered
/// tasks, manages the lifecycle state machine, and on `start()` spawns one
/// independent execution context per task. The scheduler is designed to be
/// cloned and shared across tasks, providing a handle to the same instance.
///
/// Structural changes (`add_task`/`remove_task`) are only permitted while
/// the scheduler is not running; `stop()` first, then mutate. Dropping a
/// running scheduler (all clones) closes the shutdown channel, so task
/// contexts wind down on their next cancellation check, but only `stop()`
/// waits for them.
#[derive(Clone)]
pub struct CadenceScheduler {
    config: Arc<CadenceConfig>,
    tasks: Arc<RwLock<SlotMap<TaskId, RegisteredTask>>>,
    lifecycle: Arc<Mutex<Lifecycle>>,
    system_event_sender: broadcast::Sender<SystemEvent>,
    task_event_sender: broadcast::Sender<TaskEvent>,
}

// Core lifecycle implementation block.
impl CadenceScheduler {
    /// Creates a new, empty scheduler in the `Idle` state.
    pub fn new(config: CadenceConfig) -> Self {
        // broadcast::channel panics on a zero capacity.
        let capacity = config.event_channel_capacity.max(1);
        let (system_event_sender, _) = broadcast::channel(capacity);
        let (task_event_sender, _) = broadcast::channel(capacity);

        Self {
            config: Arc::new(config),
            tasks: Arc::new(RwLock::new(SlotMap::with_key())),
            lifecycle: Arc::new(Mutex::new(Lifecycle::Idle)),
            system_event_sender,
            task_event_sender,
        }
    }

    /// Spawns one execution context per registered task and transitions to
    /// `Running`. Returns immediately; the contexts run in the background.
    ///
    /// Fails with `IllegalState` if the scheduler is already running or in
    /// the middle of a stop, so contexts can never be double-spawned.
    pub async fn start(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock().await;
        match &*lifecycle {
            Lifecycle::Idle | Lifecycle::Stopped => {}
            other => return Err(SchedulerError::IllegalState(other.state())),
        }

        // A fresh shutdown channel per cycle: contexts from a previous run
        // can never observe this cycle's signal, and vice versa.
        let (shutdown_tx, _) = broadcast::channel(1);
        let tasks = self.tasks.read().await;
        let mut handles = Vec::with_capacity(tasks.len());
        for (id, task) in tasks.iter() {
            let runner = TaskRunner::new(
                id,
                task.interval,
                Arc::clone(&task.body),
                shutdown_tx.subscribe(),
                self.task_event_sender.clone(),
            );
            handles.push(tokio::spawn(runner.run()));
        }

        info!(
            scheduler = %self.config.name,
            contexts = handles.len(),
            "scheduler started"
        );
        *lifecycle = Lifecycle::Running(RunState {
            shutdown_tx,
            handles,
        });
        self.system_event_sender
            .send(SystemEvent::SchedulerStarted {
                timestamp: Instant::now(),
            })
            .ok();
        Ok(())
    }

    /// Signals every task context to terminate after its current invocation,
    /// then blocks until all of them have exited.
    ///
    /// Cancellation is cooperative: in-flight invocations are never
    /// interrupted, so this may wait up to one invocation's duration per
    /// task, and indefinitely on an action that never returns. There is no
    /// timeout. Calling `stop()` while idle or already stopped is a no-op.
    pub async fn stop(&self) {
        let run_state = {
            let mut lifecycle = self.lifecycle.lock().await;
            match std::mem::replace(&mut *lifecycle, Lifecycle::Stopping) {
                Lifecycle::Running(run_state) => run_state,
                Lifecycle::Stopping => {
                    warn!(
                        scheduler = %self.config.name,
                        "stop() ignored: another stop is already in progress"
                    );
                    return;
                }
                idle_or_stopped => {
                    *lifecycle = idle_or_stopped;
                    return;
                }
            }
        };

        info!(
            scheduler = %self.config.name,
            contexts = run_state.handles.len(),
            "stopping scheduler"
        );
        run_state.shutdown_tx.send(()).ok();
        for handle in run_state.handles {
            if let Err(err) = handle.await {
                error!(
                    scheduler = %self.config.name,
                    error = %err,
                    "task context terminated abnormally"
                );
            }
        }

        *self.lifecycle.lock().await = Lifecycle::Stopped;
        self.system_event_sender
            .send(SystemEvent::SchedulerStopped)
            .ok();
        info!(scheduler = %self.config.name, "scheduler stopped");
    }

    /// Starts the scheduler and runs until a Ctrl+C signal is received,
    /// then performs a graceful `stop()`.
    pub async fn run(&self) -> anyhow::Result<()> {
        self.start().await?;
        info!("Scheduler running. Press Ctrl+C to shut down.");
        tokio::signal::ctrl_c().await?;
        info!("Shutdown signal received. Stopping all task contexts...");
        self.stop().await;
        Ok(())
    }
}

// Task registry implementation block.
impl CadenceScheduler {
    /// Registers a task to be executed on its own recurring cadence once
    /// the scheduler is started.
    ///
    /// The returned `TaskId` is the opaque handle for later removal.
    /// Registration never invokes the action.
    ///
    /// # Errors
    /// * `InvalidConfiguration`: the spec's interval is zero.
    /// * `IllegalState`: the scheduler is currently running or stopping;
    ///   the task set is frozen while contexts are live.
    pub async fn add_task(&self, spec: TaskSpec) -> Result<TaskId> {
        spec.validate()?;
        // Holding the lifecycle lock while inserting keeps a concurrent
        // start() from spawning contexts mid-mutation.
        let lifecycle = self.lifecycle.lock().await;
        match &*lifecycle {
            Lifecycle::Idle | Lifecycle::Stopped => {}
            other => return Err(SchedulerError::IllegalState(other.state())),
        }

        let interval = spec.interval;
        let id = self.tasks.write().await.insert(RegisteredTask::new(spec));
        debug!(
            scheduler = %self.config.name,
            task = ?id,
            ?interval,
            "task registered"
        );
        self.system_event_sender
            .send(SystemEvent::TaskAdded { id })
            .ok();
        Ok(id)
    }

    /// Removes a previously added task. A task cannot be changed in place;
    /// removing and re-adding is the way to alter its behavior.
    ///
    /// # Errors
    /// * `IllegalState`: the scheduler is currently running or stopping.
    /// * `TaskNotFound`: the handle is unknown or already removed.
    pub async fn remove_task(&self, id: TaskId) -> Result<()> {
        let lifecycle = self.lifecycle.lock().await;
        match &*lifecycle {
            Lifecycle::Idle | Lifecycle::Stopped => {}
            other => return Err(SchedulerError::IllegalState(other.state())),
        }

        if self.tasks.write().await.remove(id).is_none() {
            return Err(SchedulerError::TaskNotFound(id));
        }
        debug!(scheduler = %self.config.name, task = ?id, "task removed");
        self.system_event_sender
            .send(SystemEvent::TaskRemoved { id })
            .ok();
        Ok(())
    }
}

// Observability implementation block.
impl CadenceScheduler {
    /// The current lifecycle state.
    pub async fn state(&self) -> LifecycleState {
        self.lifecycle.lock().await.state()
    }

    /// The number of registered tasks.
    pub async fn task_count(&self) -> usize {
        self.tasks.read().await.len()
    }

    /// The handles of all registered tasks, for enumeration and debugging.
    pub async fn task_ids(&self) -> Vec<TaskId> {
        self.tasks.read().await.keys().collect()
    }

    /// The configuration this scheduler was built with.
    pub fn config(&self) -> &CadenceConfig {
        &self.config
    }

    /// Subscribes to the `SystemEvent` stream.
    pub fn subscribe_system_events(&self) -> broadcast::Receiver<SystemEvent> {
        self.system_event_sender.subscribe()
    }

    /// Subscribes to the `TaskEvent` stream.
    pub fn subscribe_task_events(&self) -> broadcast::Receiver<TaskEvent> {
        self.task_event_sender.subscribe()
    }
}
