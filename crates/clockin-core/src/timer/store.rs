//! Timer store implementation.
//!
//! The store owns the single countdown session and at most one scheduled
//! tick. Ticks come from the injected [`Scheduler`]; the store never spawns
//! anything itself.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Idle via pause | Complete via last tick)
//! Complete -> Idle (acknowledge / reset / select)
//! ```
//!
//! Cooldown is a flag carried alongside, set by `start_cooldown` and cleared
//! by `select_duration` or `end_cooldown`.
//!
//! ## Usage
//!
//! ```ignore
//! let timer = TimerStore::new(kv, Arc::new(TokioScheduler::current()));
//! timer.select_duration(25);
//! timer.start();
//! let sub = timer.subscribe(|state| println!("{}", state.formatted_time()));
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info};

use super::state::{duration_secs, TimerState};
use super::views::TimerView;
use crate::events::Event;
use crate::observable::{lock, Dispatch, Subscribers, Subscription};
use crate::scheduler::{Scheduler, TickHandle};
use crate::storage::{keys, load_or, save, KeyValueStore};

const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

struct TimerCore {
    state: TimerState,
    tick: Option<TickHandle>,
    /// Bumped whenever the tick is cancelled, so a callback already in
    /// flight for an old tick cannot touch the new session.
    generation: u64,
}

impl TimerCore {
    fn cancel_tick(&mut self) {
        if let Some(mut handle) = self.tick.take() {
            handle.cancel();
            self.generation += 1;
            debug!(generation = self.generation, "tick cancelled");
        }
    }
}

struct TimerInner {
    core: Mutex<TimerCore>,
    states: Subscribers<TimerState>,
    events: Subscribers<Event>,
    dispatch: Dispatch<(TimerState, Event)>,
    scheduler: Arc<dyn Scheduler>,
    kv: Arc<dyn KeyValueStore>,
    tick_interval: Duration,
}

/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct TimerStore {
    inner: Arc<TimerInner>,
}

/// Non-owning reference, for listeners that must not keep the store alive.
#[derive(Clone)]
pub struct WeakTimerStore {
    inner: Weak<TimerInner>,
}

impl WeakTimerStore {
    pub fn upgrade(&self) -> Option<TimerStore> {
        self.inner.upgrade().map(|inner| TimerStore { inner })
    }
}

impl TimerStore {
    /// New idle session. Only the task name is restored from `kv`.
    pub fn new(kv: Arc<dyn KeyValueStore>, scheduler: Arc<dyn Scheduler>) -> Self {
        Self::with_tick_interval(kv, scheduler, DEFAULT_TICK_INTERVAL)
    }

    /// Like [`TimerStore::new`] with a custom wall-clock tick period. Each
    /// tick still takes exactly one second off the countdown.
    pub fn with_tick_interval(
        kv: Arc<dyn KeyValueStore>,
        scheduler: Arc<dyn Scheduler>,
        tick_interval: Duration,
    ) -> Self {
        let task_name: String = load_or(kv.as_ref(), keys::TASK_NAME, String::new());
        Self {
            inner: Arc::new(TimerInner {
                core: Mutex::new(TimerCore {
                    state: TimerState {
                        task_name,
                        ..TimerState::default()
                    },
                    tick: None,
                    generation: 0,
                }),
                states: Subscribers::new(),
                events: Subscribers::new(),
                dispatch: Dispatch::new(),
                scheduler,
                kv,
                tick_interval,
            }),
        }
    }

    pub fn downgrade(&self) -> WeakTimerStore {
        WeakTimerStore {
            inner: Arc::downgrade(&self.inner),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.core().state.clone()
    }

    pub fn view(&self) -> TimerView {
        TimerView::from(&self.core().state)
    }

    pub fn formatted_time(&self) -> String {
        self.core().state.formatted_time()
    }

    pub fn progress(&self) -> f64 {
        self.core().state.progress()
    }

    pub fn is_ticking(&self) -> bool {
        self.core().tick.is_some()
    }

    /// Called with the current state now, then after every transition.
    pub fn subscribe(&self, listener: impl Fn(&TimerState) + Send + Sync + 'static) -> Subscription {
        listener(&self.state());
        self.inner.states.add(listener)
    }

    /// Derived feed: one [`TimerView`] per state change.
    pub fn subscribe_view(&self, listener: impl Fn(&TimerView) + Send + Sync + 'static) -> Subscription {
        self.subscribe(move |state| listener(&TimerView::from(state)))
    }

    /// Transition events, delivered after the matching state notification.
    /// A transition triggered from inside a listener is delivered only after
    /// the current one has reached every listener.
    pub fn subscribe_events(&self, listener: impl Fn(&Event) + Send + Sync + 'static) -> Subscription {
        self.inner.events.add(listener)
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn select_duration(&self, minutes: u32) -> Option<Event> {
        self.apply(|core| {
            core.cancel_tick();
            load_session(&mut core.state, minutes, false);
            Some(Event::DurationSelected {
                minutes,
                at: Utc::now(),
            })
        })
    }

    /// Begin ticking. Ignored while already running or with nothing left.
    pub fn start(&self) -> Option<Event> {
        self.apply(|core| {
            if core.state.is_running || core.state.remaining_seconds == 0 {
                debug!(
                    running = core.state.is_running,
                    remaining = core.state.remaining_seconds,
                    "start ignored"
                );
                return None;
            }
            core.cancel_tick();
            core.tick = Some(self.schedule_tick(core.generation));
            core.state.is_running = true;
            core.state.is_complete = false;
            Some(Event::TimerStarted {
                remaining_secs: core.state.remaining_seconds,
                is_cooldown: core.state.is_cooldown,
                at: Utc::now(),
            })
        })
    }

    pub fn pause(&self) -> Option<Event> {
        self.apply(|core| {
            core.cancel_tick();
            core.state.is_running = false;
            Some(Event::TimerPaused {
                remaining_secs: core.state.remaining_seconds,
                at: Utc::now(),
            })
        })
    }

    /// Back to the full selected duration. Cooldown mode is kept.
    pub fn reset(&self) -> Option<Event> {
        self.apply(|core| {
            core.cancel_tick();
            core.state.remaining_seconds = duration_secs(core.state.selected_duration);
            core.state.is_running = false;
            core.state.is_complete = false;
            Some(Event::TimerReset {
                remaining_secs: core.state.remaining_seconds,
                at: Utc::now(),
            })
        })
    }

    /// Stores the name as typed and persists it.
    pub fn set_task_name(&self, task_name: &str) -> Option<Event> {
        self.apply(|core| {
            core.state.task_name = task_name.to_string();
            save(self.inner.kv.as_ref(), keys::TASK_NAME, task_name);
            Some(Event::TaskNameChanged {
                task_name: task_name.to_string(),
                at: Utc::now(),
            })
        })
    }

    /// The completion has been shown to the user.
    pub fn acknowledge_complete(&self) -> Option<Event> {
        self.apply(|core| {
            core.state.is_complete = false;
            Some(Event::CompletionAcknowledged { at: Utc::now() })
        })
    }

    /// Fresh, not yet running session in cooldown mode.
    pub fn start_cooldown(&self, minutes: u32) -> Option<Event> {
        self.apply(|core| {
            core.cancel_tick();
            load_session(&mut core.state, minutes, true);
            Some(Event::CooldownStarted {
                minutes,
                at: Utc::now(),
            })
        })
    }

    /// Leave cooldown mode. Remaining time and duration are left as they are.
    pub fn end_cooldown(&self) -> Option<Event> {
        self.apply(|core| {
            core.cancel_tick();
            core.state.is_running = false;
            core.state.is_complete = false;
            core.state.is_cooldown = false;
            Some(Event::CooldownEnded { at: Utc::now() })
        })
    }

    /// Cancel any scheduled tick. For teardown; the state is not touched.
    pub fn cleanup(&self) {
        self.core().cancel_tick();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn core(&self) -> MutexGuard<'_, TimerCore> {
        lock(&self.inner.core)
    }

    /// Run `op` under the lock; when it yields an event, queue the new state
    /// with it, then deliver the queue with the lock released: state
    /// subscribers first, then event subscribers.
    fn apply(&self, op: impl FnOnce(&mut TimerCore) -> Option<Event>) -> Option<Event> {
        let event = {
            let mut core = self.core();
            let event = op(&mut core)?;
            self.inner
                .dispatch
                .enqueue((core.state.clone(), event.clone()));
            event
        };
        let inner = &self.inner;
        inner.dispatch.drain(|(state, event)| {
            inner.states.notify(state);
            inner.events.notify(event);
        });
        Some(event)
    }

    fn schedule_tick(&self, generation: u64) -> TickHandle {
        let weak = Arc::downgrade(&self.inner);
        debug!(generation, "scheduling tick");
        self.inner.scheduler.schedule(
            self.inner.tick_interval,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    TimerStore { inner }.tick(generation);
                }
            }),
        )
    }

    fn tick(&self, generation: u64) {
        self.apply(|core| {
            if core.generation != generation || !core.state.is_running {
                return None;
            }
            if core.state.remaining_seconds <= 1 {
                core.state.remaining_seconds = 0;
                core.cancel_tick();
                core.state.is_running = false;
                core.state.is_complete = true;
                info!(
                    duration_min = core.state.selected_duration,
                    cooldown = core.state.is_cooldown,
                    "session complete"
                );
                return Some(Event::TimerCompleted {
                    duration_min: core.state.selected_duration,
                    task_name: core.state.task_name.clone(),
                    is_cooldown: core.state.is_cooldown,
                    at: Utc::now(),
                });
            }
            core.state.remaining_seconds -= 1;
            Some(Event::TimerTicked {
                remaining_secs: core.state.remaining_seconds,
            })
        });
    }
}

fn load_session(state: &mut TimerState, minutes: u32, cooldown: bool) {
    state.selected_duration = minutes;
    state.remaining_seconds = duration_secs(minutes);
    state.is_running = false;
    state.is_complete = false;
    state.is_cooldown = cooldown;
}

impl fmt::Debug for TimerStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.core();
        f.debug_struct("TimerStore")
            .field("state", &core.state)
            .field("ticking", &core.tick.is_some())
            .field("tick_interval", &self.inner.tick_interval)
            .finish()
    }
}
