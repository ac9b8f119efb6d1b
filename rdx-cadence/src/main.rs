use anyhow::Result;
use cadence::prelude::*;
use cadence::{SCHEDULER_NAME, VERSION};
use colored::Colorize;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    println!("{} v{}", SCHEDULER_NAME.cyan().bold(), VERSION);

    // 2. Load configuration from cadence.toml when present.
    let config = match CadenceConfig::from_file("cadence") {
        Ok(config) => config,
        Err(_) => CadenceConfig::default(),
    };

    // 3. Create the scheduler instance.
    let scheduler = CadenceScheduler::new(config);

    // 4. Spawn concurrent tasks to listen to the event streams.
    spawn_event_listeners(&scheduler);

    // 5. Register demo tasks to exercise the scheduler's core logic.
    register_demo_tasks(&scheduler).await?;

    // 6. Run until Ctrl+C.
    scheduler.run().await?;

    Ok(())
}

/// Spawns tasks subscribing to each event stream from the scheduler.
fn spawn_event_listeners(scheduler: &CadenceScheduler) {
    let mut system_rx = scheduler.subscribe_system_events();
    tokio::spawn(async move {
        while let Ok(event) = system_rx.recv().await {
            info!("[SYSTEM] => {:?}", event);
        }
    });

    let mut task_rx = scheduler.subscribe_task_events();
    tokio::spawn(async move {
        while let Ok(event) = task_rx.recv().await {
            info!("[TASK] => {:?}", event);
        }
    });
}

/// Registers demo tasks with the scheduler to demonstrate functionality.
async fn register_demo_tasks(scheduler: &CadenceScheduler) -> Result<()> {
    // --- A 2-second heartbeat with a result callback ---
    let counter = Arc::new(AtomicU32::new(0));
    let _heartbeat_id = scheduler
        .add_task(
            TaskSpec::new(Duration::from_secs(2), move || {
                let current = counter.fetch_add(1, Ordering::Relaxed) + 1;
                Ok(Box::new(current))
            })
            .with_on_result(|output| {
                if let Ok(count) = output.downcast::<u32>() {
                    info!("[HEARTBEAT] Counter is now: {}", count);
                }
                Ok(())
            }),
        )
        .await?;

    // --- A 5-second task that always fails, showing error containment ---
    let _flaky_id = scheduler
        .add_task(TaskSpec::new(Duration::from_secs(5), || {
            anyhow::bail!("demo failure: this task always errors")
        }))
        .await?;

    Ok(())
}
