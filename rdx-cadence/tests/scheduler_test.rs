use cadence::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// A task spec that counts its invocations.
fn counting_spec(interval: Duration, counter: Arc<AtomicUsize>) -> TaskSpec {
    TaskSpec::new(interval, move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(()))
    })
}

// Timings below use tokio's paused test clock: the first invocation fires
// immediately on start, then one per interval. A 1s task observed for 3.5s
// therefore fires exactly 4 times (t = 0s, 1s, 2s, 3s).

#[tokio::test(start_paused = true)]
async fn test_fires_on_fixed_delay_cadence() {
    let scheduler = CadenceScheduler::new(CadenceConfig::default());
    let counter = Arc::new(AtomicUsize::new(0));
    scheduler
        .add_task(counting_spec(Duration::from_secs(1), counter.clone()))
        .await
        .unwrap();

    scheduler.start().await.unwrap();
    assert_eq!(scheduler.state().await, LifecycleState::Running);

    tokio::time::sleep(Duration::from_millis(3500)).await;
    assert_eq!(counter.load(Ordering::SeqCst), 4);

    scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_zero_interval_is_rejected() {
    let scheduler = CadenceScheduler::new(CadenceConfig::default());
    let result = scheduler
        .add_task(TaskSpec::new(Duration::ZERO, || Ok(Box::new(()))))
        .await;
    assert!(matches!(
        result,
        Err(SchedulerError::InvalidConfiguration(_))
    ));
    assert_eq!(scheduler.task_count().await, 0);
    assert_eq!(scheduler.config().name, "cadence");
}

#[tokio::test(start_paused = true)]
async fn test_structural_changes_rejected_while_running() {
    let scheduler = CadenceScheduler::new(CadenceConfig::default());
    let counter = Arc::new(AtomicUsize::new(0));
    let id = scheduler
        .add_task(counting_spec(Duration::from_secs(1), counter.clone()))
        .await
        .unwrap();

    scheduler.start().await.unwrap();

    let err = scheduler
        .add_task(counting_spec(Duration::from_secs(1), counter.clone()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SchedulerError::IllegalState(LifecycleState::Running)
    ));

    let err = scheduler.remove_task(id).await.unwrap_err();
    assert!(matches!(
        err,
        SchedulerError::IllegalState(LifecycleState::Running)
    ));

    // The task set is unchanged by the rejected calls.
    assert_eq!(scheduler.task_count().await, 1);

    scheduler.stop().await;

    // After stop, structural changes are permitted again.
    scheduler.remove_task(id).await.unwrap();
    assert_eq!(scheduler.task_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_double_start_is_rejected() {
    let scheduler = CadenceScheduler::new(CadenceConfig::default());
    let counter = Arc::new(AtomicUsize::new(0));
    scheduler
        .add_task(counting_spec(Duration::from_secs(1), counter.clone()))
        .await
        .unwrap();

    scheduler.start().await.unwrap();
    let err = scheduler.start().await.unwrap_err();
    assert!(matches!(
        err,
        SchedulerError::IllegalState(LifecycleState::Running)
    ));

    // Still a single context: one invocation per interval, not two.
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(counter.load(Ordering::SeqCst), 3);

    scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_stop_halts_all_invocations() {
    let scheduler = CadenceScheduler::new(CadenceConfig::default());
    let counter = Arc::new(AtomicUsize::new(0));
    scheduler
        .add_task(counting_spec(Duration::from_secs(1), counter.clone()))
        .await
        .unwrap();

    scheduler.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    scheduler.stop().await;
    assert_eq!(scheduler.state().await, LifecycleState::Stopped);

    // A generous multiple of the interval: the counter must stay frozen.
    let frozen = counter.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(counter.load(Ordering::SeqCst), frozen);
}

#[tokio::test(start_paused = true)]
async fn test_stop_is_idempotent_and_noop_when_idle() {
    let scheduler = CadenceScheduler::new(CadenceConfig::default());

    // stop() before any start is a no-op and leaves the scheduler Idle.
    scheduler.stop().await;
    assert_eq!(scheduler.state().await, LifecycleState::Idle);

    let counter = Arc::new(AtomicUsize::new(0));
    scheduler
        .add_task(counting_spec(Duration::from_secs(1), counter.clone()))
        .await
        .unwrap();
    scheduler.start().await.unwrap();
    scheduler.stop().await;
    assert_eq!(scheduler.state().await, LifecycleState::Stopped);

    // A second stop returns immediately without error.
    scheduler.stop().await;
    assert_eq!(scheduler.state().await, LifecycleState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_restart_runs_a_clean_second_cycle() {
    let scheduler = CadenceScheduler::new(CadenceConfig::default());
    let counter = Arc::new(AtomicUsize::new(0));
    scheduler
        .add_task(counting_spec(Duration::from_secs(1), counter.clone()))
        .await
        .unwrap();

    scheduler.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(2500)).await;
    scheduler.stop().await;
    assert_eq!(counter.load(Ordering::SeqCst), 3);

    // The second cycle behaves exactly like the first: no duplicated
    // contexts, no leaked contexts from the first cycle still firing.
    scheduler.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(2500)).await;
    scheduler.stop().await;
    assert_eq!(counter.load(Ordering::SeqCst), 6);
}

#[tokio::test(start_paused = true)]
async fn test_failing_task_keeps_cadence_and_sibling_unaffected() {
    let scheduler = CadenceScheduler::new(CadenceConfig::default());
    let mut task_rx = scheduler.subscribe_task_events();

    let attempts = Arc::new(AtomicUsize::new(0));
    let attempts_clone = attempts.clone();
    scheduler
        .add_task(TaskSpec::new(Duration::from_secs(1), move || {
            attempts_clone.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("boom")
        }))
        .await
        .unwrap();

    let sibling = Arc::new(AtomicUsize::new(0));
    scheduler
        .add_task(counting_spec(Duration::from_secs(1), sibling.clone()))
        .await
        .unwrap();

    scheduler.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(3500)).await;
    scheduler.stop().await;

    // The failing task kept its schedule; the sibling never noticed.
    assert_eq!(attempts.load(Ordering::SeqCst), 4);
    assert_eq!(sibling.load(Ordering::SeqCst), 4);

    // Every failure was routed to the task-event stream.
    let mut failures = 0;
    let mut fired = 0;
    while let Ok(event) = task_rx.try_recv() {
        match event {
            TaskEvent::InvocationFailed { .. } => failures += 1,
            TaskEvent::TaskFired { .. } => fired += 1,
            TaskEvent::CallbackFailed { .. } => {}
        }
    }
    assert_eq!(failures, 4);
    assert_eq!(fired, 4);
}

#[tokio::test(start_paused = true)]
async fn test_on_result_receives_each_output_in_order() {
    let scheduler = CadenceScheduler::new(CadenceConfig::default());
    let counter = Arc::new(AtomicUsize::new(0));
    let collected: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));

    let action_counter = counter.clone();
    let sink = collected.clone();
    scheduler
        .add_task(
            TaskSpec::new(Duration::from_secs(1), move || {
                let next = action_counter.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(Box::new(next))
            })
            .with_on_result(move |output| {
                let value = output
                    .downcast::<usize>()
                    .map_err(|_| anyhow::anyhow!("unexpected output type"))?;
                sink.lock().unwrap().push(*value);
                Ok(())
            }),
        )
        .await
        .unwrap();

    scheduler.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(2500)).await;
    scheduler.stop().await;

    assert_eq!(*collected.lock().unwrap(), vec![1, 2, 3]);
}

#[tokio::test(start_paused = true)]
async fn test_callback_errors_do_not_derail_the_schedule() {
    let scheduler = CadenceScheduler::new(CadenceConfig::default());
    let mut task_rx = scheduler.subscribe_task_events();

    let counter = Arc::new(AtomicUsize::new(0));
    let counter_clone = counter.clone();
    scheduler
        .add_task(
            TaskSpec::new(Duration::from_secs(1), move || {
                counter_clone.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(()))
            })
            .with_on_result(|_| anyhow::bail!("callback boom")),
        )
        .await
        .unwrap();

    scheduler.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(2500)).await;
    scheduler.stop().await;

    assert_eq!(counter.load(Ordering::SeqCst), 3);

    let mut callback_failures = 0;
    while let Ok(event) = task_rx.try_recv() {
        if matches!(event, TaskEvent::CallbackFailed { .. }) {
            callback_failures += 1;
        }
    }
    assert_eq!(callback_failures, 3);
}

#[tokio::test(start_paused = true)]
async fn test_remove_unknown_task_reports_not_found() {
    let scheduler = CadenceScheduler::new(CadenceConfig::default());
    let counter = Arc::new(AtomicUsize::new(0));
    let id = scheduler
        .add_task(counting_spec(Duration::from_secs(1), counter.clone()))
        .await
        .unwrap();

    assert_eq!(scheduler.task_ids().await, vec![id]);

    scheduler.remove_task(id).await.unwrap();
    let err = scheduler.remove_task(id).await.unwrap_err();
    assert!(matches!(err, SchedulerError::TaskNotFound(_)));

    let err = scheduler.remove_task(TaskId::default()).await.unwrap_err();
    assert!(matches!(err, SchedulerError::TaskNotFound(_)));
}

#[tokio::test(start_paused = true)]
async fn test_system_event_stream_reports_lifecycle() {
    let scheduler = CadenceScheduler::new(CadenceConfig::default());
    let mut system_rx = scheduler.subscribe_system_events();

    let counter = Arc::new(AtomicUsize::new(0));
    let id = scheduler
        .add_task(counting_spec(Duration::from_secs(1), counter.clone()))
        .await
        .unwrap();
    scheduler.start().await.unwrap();
    scheduler.stop().await;

    let mut events = Vec::new();
    while let Ok(event) = system_rx.try_recv() {
        events.push(event);
    }
    assert_eq!(events.len(), 3);
    assert!(matches!(events[0], SystemEvent::TaskAdded { id: added } if added == id));
    assert!(matches!(events[1], SystemEvent::SchedulerStarted { .. }));
    assert!(matches!(events[2], SystemEvent::SchedulerStopped));
}

// Real time and a multi-thread runtime here: the action deliberately blocks
// to model an in-flight invocation that stop() must wait out.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stop_waits_for_in_flight_invocation() {
    let scheduler = CadenceScheduler::new(CadenceConfig::default());
    let started = Arc::new(AtomicUsize::new(0));
    let completed = Arc::new(AtomicUsize::new(0));

    let started_clone = started.clone();
    let completed_clone = completed.clone();
    scheduler
        .add_task(TaskSpec::new(Duration::from_secs(3600), move || {
            started_clone.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(200));
            completed_clone.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(()))
        }))
        .await
        .unwrap();

    scheduler.start().await.unwrap();
    while started.load(Ordering::SeqCst) == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    scheduler.stop().await;
    assert_eq!(
        completed.load(Ordering::SeqCst),
        started.load(Ordering::SeqCst),
        "stop() must wait for the in-flight invocation to finish"
    );
    assert_eq!(scheduler.state().await, LifecycleState::Stopped);
}
