//! All stores wired together, plus what happens when a session completes.
//!
//! The stores stay independent of one another. `FocusApp` listens to timer
//! events and performs the cross-store bookkeeping a front end would
//! otherwise do by hand: statistics, task history, sound and celebration,
//! cooldown hand-off and auto-start.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info};

use crate::effects::{Celebration, Presenter, SoundCue};
use crate::events::Event;
use crate::history::TaskHistoryStore;
use crate::observable::{lock, Subscription};
use crate::scheduler::Scheduler;
use crate::settings::SettingsStore;
use crate::stats::{CompletionStatsStore, TaskStatsStore};
use crate::storage::KeyValueStore;
use crate::timer::{next_duration, TimerStore, WeakTimerStore};

pub struct FocusApp {
    settings: SettingsStore,
    stats: CompletionStatsStore,
    task_stats: TaskStatsStore,
    history: TaskHistoryStore,
    timer: TimerStore,
    completion: Mutex<Option<Subscription>>,
}

impl FocusApp {
    pub fn new(
        kv: Arc<dyn KeyValueStore>,
        scheduler: Arc<dyn Scheduler>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        Self::with_tick_interval(kv, scheduler, presenter, Duration::from_secs(1))
    }

    pub fn with_tick_interval(
        kv: Arc<dyn KeyValueStore>,
        scheduler: Arc<dyn Scheduler>,
        presenter: Arc<dyn Presenter>,
        tick_interval: Duration,
    ) -> Self {
        let settings = SettingsStore::new(Arc::clone(&kv));
        let stats = CompletionStatsStore::new(Arc::clone(&kv));
        let task_stats = TaskStatsStore::new(Arc::clone(&kv));
        let history = TaskHistoryStore::new(Arc::clone(&kv));
        let timer = TimerStore::with_tick_interval(kv, scheduler, tick_interval);

        let handler = CompletionHandler {
            settings: settings.clone(),
            stats: stats.clone(),
            task_stats: task_stats.clone(),
            history: history.clone(),
            timer: timer.downgrade(),
            presenter,
            focus_duration: AtomicU32::new(timer.state().selected_duration),
        };
        let subscription = timer.subscribe_events(move |event| handler.handle(event));

        Self {
            settings,
            stats,
            task_stats,
            history,
            timer,
            completion: Mutex::new(Some(subscription)),
        }
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn stats(&self) -> &CompletionStatsStore {
        &self.stats
    }

    pub fn task_stats(&self) -> &TaskStatsStore {
        &self.task_stats
    }

    pub fn history(&self) -> &TaskHistoryStore {
        &self.history
    }

    pub fn timer(&self) -> &TimerStore {
        &self.timer
    }

    /// Select the gradation after the current one, wrapping around.
    pub fn cycle_duration(&self) -> Option<u32> {
        let current = self.timer.state().selected_duration;
        let next = next_duration(current, &self.settings.gradations())?;
        self.timer.select_duration(next);
        Some(next)
    }

    /// Give up on the current focus session: credit the time already spent
    /// to the task, then reset. Returns the minutes credited.
    pub fn abandon(&self) -> Option<f64> {
        let state = self.timer.state();
        if state.is_cooldown || state.is_complete {
            return None;
        }
        let elapsed = state.elapsed_seconds();
        if elapsed == 0 {
            return None;
        }
        let minutes = f64::from(elapsed) / 60.0;
        self.task_stats.record_minutes(&state.task_name, minutes);
        self.timer.reset();
        info!(minutes, "session abandoned");
        Some(minutes)
    }

    /// Stop reacting to completions and cancel the tick.
    pub fn shutdown(&self) {
        if let Some(subscription) = lock(&self.completion).take() {
            subscription.unsubscribe();
        }
        self.timer.cleanup();
    }
}

impl Drop for FocusApp {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct CompletionHandler {
    settings: SettingsStore,
    stats: CompletionStatsStore,
    task_stats: TaskStatsStore,
    history: TaskHistoryStore,
    timer: WeakTimerStore,
    presenter: Arc<dyn Presenter>,
    /// Focus length to return to after a cooldown.
    focus_duration: AtomicU32,
}

impl CompletionHandler {
    fn handle(&self, event: &Event) {
        match event {
            Event::DurationSelected { minutes, .. } => {
                self.focus_duration.store(*minutes, Ordering::SeqCst);
            }
            Event::TimerCompleted {
                is_cooldown: false,
                duration_min,
                task_name,
                ..
            } => self.focus_completed(*duration_min, task_name),
            Event::TimerCompleted {
                is_cooldown: true, ..
            } => self.cooldown_completed(),
            _ => {}
        }
    }

    fn focus_completed(&self, duration_min: u32, task_name: &str) {
        self.stats.record_completion(duration_min);
        self.task_stats
            .record_minutes(task_name, f64::from(duration_min));
        self.history.add_task(task_name);

        let prefs = self.settings.get();
        if prefs.sound_enabled {
            self.presenter
                .play_sound(SoundCue::from_id(&prefs.selected_sound));
        }
        self.presenter
            .celebrate(Celebration::random(&mut rand::thread_rng()));

        let Some(timer) = self.timer.upgrade() else {
            return;
        };
        if prefs.cooldown_enabled {
            debug!(minutes = prefs.cooldown_duration, "handing off to cooldown");
            timer.start_cooldown(prefs.cooldown_duration);
            if prefs.cooldown_auto_start {
                timer.start();
            }
        } else if prefs.auto_start {
            timer.reset();
            timer.start();
        }
    }

    fn cooldown_completed(&self) {
        let prefs = self.settings.get();
        if prefs.sound_enabled {
            self.presenter
                .play_sound(SoundCue::from_id(&prefs.selected_sound));
        }

        let Some(timer) = self.timer.upgrade() else {
            return;
        };
        let focus = self.focus_duration.load(Ordering::SeqCst);
        debug!(minutes = focus, "cooldown over, back to focus");
        timer.select_duration(focus);
        if prefs.auto_start {
            timer.start();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::NoopPresenter;
    use crate::scheduler::ManualScheduler;
    use crate::storage::MemoryStore;

    fn app() -> (ManualScheduler, FocusApp) {
        let scheduler = ManualScheduler::new();
        let app = FocusApp::new(
            Arc::new(MemoryStore::new()),
            Arc::new(scheduler.clone()),
            Arc::new(NoopPresenter),
        );
        (scheduler, app)
    }

    #[test]
    fn cycle_duration_walks_gradations() {
        let (_clock, app) = app();
        assert_eq!(app.cycle_duration(), Some(5));
        assert_eq!(app.cycle_duration(), Some(10));
        app.timer().select_duration(40);
        assert_eq!(app.cycle_duration(), Some(1));
        assert_eq!(app.timer().state().remaining_seconds, 60);
    }

    #[test]
    fn abandon_credits_partial_minutes() {
        let (clock, app) = app();
        app.timer().set_task_name("inbox");
        app.timer().select_duration(5);
        app.timer().start();
        clock.advance_secs(90);

        assert_eq!(app.abandon(), Some(1.5));
        assert_eq!(app.task_stats().get_minutes("inbox"), 1.5);
        assert_eq!(app.timer().state().remaining_seconds, 300);
        assert!(!app.timer().state().is_running);
    }

    #[test]
    fn abandon_without_progress_is_a_no_op() {
        let (_clock, app) = app();
        app.timer().set_task_name("inbox");
        assert_eq!(app.abandon(), None);
        assert!(app.task_stats().get().is_empty());
    }

    #[test]
    fn shutdown_stops_ticking_and_bookkeeping() {
        let (clock, app) = app();
        app.timer().start();
        app.shutdown();
        clock.advance_secs(120);
        assert_eq!(app.stats().total(), 0);
        assert_eq!(clock.active_timers(), 0);
    }
}
