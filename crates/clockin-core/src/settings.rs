//! User preferences: duration gradations, sound, auto-start and cooldown.
//!
//! Every setter persists the full settings object under
//! [`keys::SETTINGS`](crate::storage::keys::SETTINGS) and notifies subscribers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::observable::{Observable, Subscription};
use crate::storage::{keys, load_or, persist_to, KeyValueStore};

pub const DEFAULT_GRADATIONS: [u32; 5] = [1, 5, 10, 20, 40];
pub const MIN_COOLDOWN_MINUTES: u32 = 1;
pub const MAX_COOLDOWN_MINUTES: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimerSettings {
    /// Selectable session lengths in minutes, ascending.
    pub gradations: Vec<u32>,
    pub selected_sound: String,
    pub sound_enabled: bool,
    /// Start the next session automatically after a completion.
    pub auto_start: bool,
    pub cooldown_enabled: bool,
    /// Minutes, within `MIN_COOLDOWN_MINUTES..=MAX_COOLDOWN_MINUTES`.
    pub cooldown_duration: u32,
    /// Start the cooldown automatically after a focus session completes.
    pub cooldown_auto_start: bool,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            gradations: DEFAULT_GRADATIONS.to_vec(),
            selected_sound: "chime".into(),
            sound_enabled: true,
            auto_start: false,
            cooldown_enabled: false,
            cooldown_duration: 2,
            cooldown_auto_start: true,
        }
    }
}

impl TimerSettings {
    /// Repair values loaded from storage so the invariants hold.
    fn normalized(mut self) -> Self {
        self.gradations.retain(|&m| m > 0);
        if self.gradations.is_empty() {
            self.gradations = DEFAULT_GRADATIONS.to_vec();
        }
        self.gradations.sort_unstable();
        self.cooldown_duration = clamp_cooldown(i64::from(self.cooldown_duration));
        self
    }
}

fn clamp_cooldown(minutes: i64) -> u32 {
    // Clamped into 1..=30, so the cast cannot truncate.
    minutes.clamp(i64::from(MIN_COOLDOWN_MINUTES), i64::from(MAX_COOLDOWN_MINUTES)) as u32
}

#[derive(Clone)]
pub struct SettingsStore {
    cell: Observable<TimerSettings>,
}

impl SettingsStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        let initial = load_or(kv.as_ref(), keys::SETTINGS, TimerSettings::default()).normalized();
        Self {
            cell: Observable::with_sink(initial, persist_to(kv, keys::SETTINGS)),
        }
    }

    pub fn get(&self) -> TimerSettings {
        self.cell.get()
    }

    pub fn gradations(&self) -> Vec<u32> {
        self.cell.with(|s| s.gradations.clone())
    }

    pub fn subscribe(&self, listener: impl Fn(&TimerSettings) + Send + Sync + 'static) -> Subscription {
        self.cell.subscribe(listener)
    }

    /// Replace the gradations, sorted ascending. Duplicates are kept.
    /// An empty list, or one containing zero, is ignored.
    pub fn set_gradations(&self, mut gradations: Vec<u32>) {
        if gradations.is_empty() || gradations.contains(&0) {
            debug!(?gradations, "ignoring invalid gradations");
            return;
        }
        gradations.sort_unstable();
        self.cell.update(|s| s.gradations = gradations);
    }

    pub fn set_sound(&self, sound: &str) {
        let sound = sound.to_string();
        self.cell.update(|s| s.selected_sound = sound);
    }

    pub fn toggle_sound(&self) {
        self.cell.update(|s| s.sound_enabled = !s.sound_enabled);
    }

    pub fn toggle_auto_start(&self) {
        self.cell.update(|s| s.auto_start = !s.auto_start);
    }

    pub fn toggle_cooldown(&self) {
        self.cell.update(|s| s.cooldown_enabled = !s.cooldown_enabled);
    }

    /// Clamped to 1..=30 minutes.
    pub fn set_cooldown_duration(&self, minutes: i64) {
        let minutes = clamp_cooldown(minutes);
        self.cell.update(|s| s.cooldown_duration = minutes);
    }

    pub fn toggle_cooldown_auto_start(&self) {
        self.cell.update(|s| s.cooldown_auto_start = !s.cooldown_auto_start);
    }

    pub fn reset(&self) {
        self.cell.set(TimerSettings::default());
    }
}
