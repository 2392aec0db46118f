//! The tokio-backed scheduler on a paused runtime clock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clockin_core::{MemoryStore, Scheduler, TimerStore, TokioScheduler};

#[tokio::test(start_paused = true)]
async fn fires_once_per_period() {
    let scheduler = TokioScheduler::current();
    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    let _handle = scheduler.schedule(
        Duration::from_secs(1),
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );

    tokio::time::sleep(Duration::from_millis(3500)).await;
    assert_eq!(count.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn cancelled_handle_stops_the_task() {
    let scheduler = TokioScheduler::current();
    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    let mut handle = scheduler.schedule(
        Duration::from_secs(1),
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );

    tokio::time::sleep(Duration::from_millis(2500)).await;
    handle.cancel();
    handle.cancel();
    assert!(!handle.is_active());
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn timer_counts_down_on_the_runtime() {
    let timer = TimerStore::new(
        Arc::new(MemoryStore::new()),
        Arc::new(TokioScheduler::current()),
    );
    timer.start();

    tokio::time::sleep(Duration::from_millis(10_500)).await;
    assert_eq!(timer.state().remaining_seconds, 50);

    tokio::time::sleep(Duration::from_secs(60)).await;
    let state = timer.state();
    assert!(state.is_complete);
    assert!(!timer.is_ticking());
}
