use serde::{Deserialize, Serialize};

pub const DEFAULT_DURATION_MIN: u32 = 1;

/// Where the countdown is. Cooldown is orthogonal: see [`TimerState::is_cooldown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Idle,
    Running,
    Complete,
}

/// The single countdown session.
///
/// `is_running` and `is_complete` are never both true, and
/// `remaining_seconds <= selected_duration * 60`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    /// Minutes.
    pub selected_duration: u32,
    pub remaining_seconds: u32,
    pub is_running: bool,
    pub is_complete: bool,
    /// Free text as typed; trimmed only where it is used as a stats key.
    pub task_name: String,
    pub is_cooldown: bool,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            selected_duration: DEFAULT_DURATION_MIN,
            remaining_seconds: duration_secs(DEFAULT_DURATION_MIN),
            is_running: false,
            is_complete: false,
            task_name: String::new(),
            is_cooldown: false,
        }
    }
}

impl TimerState {
    pub fn phase(&self) -> TimerPhase {
        if self.is_running {
            TimerPhase::Running
        } else if self.is_complete {
            TimerPhase::Complete
        } else {
            TimerPhase::Idle
        }
    }

    pub fn total_seconds(&self) -> u32 {
        duration_secs(self.selected_duration)
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.total_seconds().saturating_sub(self.remaining_seconds)
    }

    pub fn formatted_time(&self) -> String {
        super::views::format_time(self.remaining_seconds)
    }

    pub fn progress(&self) -> f64 {
        super::views::progress(self.remaining_seconds, self.selected_duration)
    }
}

/// Minutes to seconds, saturating.
pub(crate) fn duration_secs(minutes: u32) -> u32 {
    minutes.saturating_mul(60)
}
