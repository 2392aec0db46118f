//! Countdown behavior driven through the public API on a manual clock.

use std::sync::{Arc, Mutex};

use clockin_core::{
    Event, ManualScheduler, MemoryStore, TimerPhase, TimerState, TimerStore,
};

fn timer() -> (ManualScheduler, TimerStore) {
    let scheduler = ManualScheduler::new();
    let timer = TimerStore::new(Arc::new(MemoryStore::new()), Arc::new(scheduler.clone()));
    (scheduler, timer)
}

#[test]
fn full_session_completes_once() {
    let (clock, timer) = timer();
    let completions = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&completions);
    let _sub = timer.subscribe_events(move |e| {
        if e.is_completion() {
            *counter.lock().unwrap() += 1;
        }
    });

    timer.select_duration(5);
    timer.start();
    clock.advance_secs(5 * 60);

    let state = timer.state();
    assert_eq!(state.remaining_seconds, 0);
    assert!(!state.is_running);
    assert!(state.is_complete);
    assert_eq!(state.phase(), TimerPhase::Complete);

    clock.advance_secs(30);
    assert_eq!(timer.state().remaining_seconds, 0);
    assert_eq!(*completions.lock().unwrap(), 1);
}

#[test]
fn pause_and_resume_neither_skips_nor_double_counts() {
    let (clock, timer) = timer();
    timer.select_duration(1);
    timer.start();
    clock.advance_secs(10);
    timer.pause();
    assert_eq!(timer.state().remaining_seconds, 50);

    // Time passing while paused changes nothing.
    clock.advance_secs(100);
    assert_eq!(timer.state().remaining_seconds, 50);

    timer.start();
    clock.advance_secs(1);
    assert_eq!(timer.state().remaining_seconds, 49);
    clock.advance_secs(49);
    assert!(timer.state().is_complete);
}

#[test]
fn restart_after_partial_interval_waits_a_full_period() {
    let (clock, timer) = timer();
    timer.start();
    clock.advance(std::time::Duration::from_millis(900));
    timer.pause();
    timer.start();
    clock.advance(std::time::Duration::from_millis(900));
    assert_eq!(timer.state().remaining_seconds, 60);
    clock.advance(std::time::Duration::from_millis(100));
    assert_eq!(timer.state().remaining_seconds, 59);
}

#[test]
fn reset_restores_full_duration() {
    let (clock, timer) = timer();
    timer.select_duration(10);
    timer.start();
    clock.advance_secs(42);
    timer.reset();

    let state = timer.state();
    assert_eq!(state.remaining_seconds, 600);
    assert!(!state.is_running && !state.is_complete);
    assert_eq!(timer.progress(), 100.0);

    clock.advance_secs(5);
    assert_eq!(timer.state().remaining_seconds, 600);
}

#[test]
fn selecting_during_cooldown_leaves_it() {
    let (clock, timer) = timer();
    timer.start_cooldown(2);
    timer.start();
    clock.advance_secs(5);
    timer.select_duration(20);

    let state = timer.state();
    assert!(!state.is_cooldown);
    assert_eq!(state.remaining_seconds, 1200);
    assert!(!state.is_running);
}

#[test]
fn cooldown_completion_is_flagged() {
    let (clock, timer) = timer();
    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    let _sub = timer.subscribe_events(move |e| {
        if let Event::TimerCompleted { is_cooldown, .. } = e {
            *sink.lock().unwrap() = Some(*is_cooldown);
        }
    });

    timer.start_cooldown(1);
    timer.start();
    clock.advance_secs(60);
    assert_eq!(*seen.lock().unwrap(), Some(true));
    assert!(timer.state().is_cooldown);
}

#[test]
fn subscribers_see_every_state_in_order() {
    let (clock, timer) = timer();
    let states: Arc<Mutex<Vec<TimerState>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&states);
    let sub = timer.subscribe(move |s| sink.lock().unwrap().push(s.clone()));

    timer.start();
    clock.advance_secs(3);
    sub.unsubscribe();
    clock.advance_secs(3);

    let remaining: Vec<u32> = states
        .lock()
        .unwrap()
        .iter()
        .map(|s| s.remaining_seconds)
        .collect();
    assert_eq!(remaining, vec![60, 60, 59, 58, 57]);
}

#[test]
fn listener_may_call_back_into_the_store() {
    let (clock, timer) = timer();
    let weak = timer.downgrade();
    let _sub = timer.subscribe_events(move |e| {
        if e.is_completion() {
            if let Some(timer) = weak.upgrade() {
                timer.acknowledge_complete();
                timer.reset();
            }
        }
    });

    timer.start();
    clock.advance_secs(60);
    let state = timer.state();
    assert!(!state.is_complete);
    assert_eq!(state.remaining_seconds, 60);
}
