use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every timer transition produces an Event.
/// Presentation code listens for `TimerCompleted` to play sounds and celebrate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    DurationSelected {
        minutes: u32,
        at: DateTime<Utc>,
    },
    TimerStarted {
        remaining_secs: u32,
        is_cooldown: bool,
        at: DateTime<Utc>,
    },
    TimerTicked {
        remaining_secs: u32,
    },
    TimerPaused {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero while running.
    TimerCompleted {
        duration_min: u32,
        task_name: String,
        is_cooldown: bool,
        at: DateTime<Utc>,
    },
    CompletionAcknowledged {
        at: DateTime<Utc>,
    },
    CooldownStarted {
        minutes: u32,
        at: DateTime<Utc>,
    },
    CooldownEnded {
        at: DateTime<Utc>,
    },
    TaskNameChanged {
        task_name: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn is_completion(&self) -> bool {
        matches!(self, Event::TimerCompleted { .. })
    }
}
