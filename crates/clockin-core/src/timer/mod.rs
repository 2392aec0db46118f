mod state;
mod store;
mod views;

pub use state::{TimerPhase, TimerState, DEFAULT_DURATION_MIN};
pub use store::{TimerStore, WeakTimerStore};
pub use views::{format_time, next_duration, progress, TimerView};
