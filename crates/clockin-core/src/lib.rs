//! # clockin Core Library
//!
//! This library provides the core logic for the clockin focus timer: a single
//! countdown session with selectable durations, optional cooldown periods,
//! task labels, completion statistics and hooks for sound/celebration effects.
//!
//! ## Architecture
//!
//! - **Timer Store**: A tick-driven state machine. It never spawns threads of
//!   its own; ticks come from an injected [`Scheduler`]
//! - **Stores**: Settings, completion stats, task minutes and task history,
//!   each an observable value persisted to a [`KeyValueStore`] on every change
//! - **Views**: Pure projections of timer state (`MM:SS`, percent remaining)
//! - **Effects**: Sound cue and celebration catalogs behind the [`Presenter`] trait
//!
//! ## Key Components
//!
//! - [`TimerStore`]: Core timer state machine
//! - [`FocusApp`]: All stores wired together with completion handling
//! - [`SqliteStore`]: On-disk key-value persistence
//! - [`Config`]: Application configuration management

pub mod app;
pub mod effects;
pub mod error;
pub mod events;
pub mod history;
pub mod observable;
pub mod scheduler;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod timer;

pub use app::FocusApp;
pub use effects::{Celebration, NoopPresenter, Presenter, SoundCue};
pub use error::{ConfigError, CoreError, StorageError};
pub use events::Event;
pub use history::{TaskHistoryStore, MAX_TASK_HISTORY};
pub use observable::{Observable, Subscription};
pub use scheduler::{ManualScheduler, Scheduler, TickHandle, TokioScheduler};
pub use settings::{SettingsStore, TimerSettings};
pub use stats::{CompletionStats, CompletionStatsStore, TaskStats, TaskStatsStore};
pub use storage::{Config, KeyValueStore, MemoryStore, SqliteStore, UnavailableStore};
pub use timer::{next_duration, TimerPhase, TimerState, TimerStore, TimerView};
