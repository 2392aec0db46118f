use std::collections::BTreeMap;
use std::sync::Arc;

use crate::observable::{Observable, Subscription};
use crate::storage::{keys, load_or, persist_to, KeyValueStore};

/// Duration in minutes -> number of completed sessions of that length.
pub type CompletionStats = BTreeMap<u32, u64>;

#[derive(Clone)]
pub struct CompletionStatsStore {
    cell: Observable<CompletionStats>,
}

impl CompletionStatsStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        let initial = load_or(kv.as_ref(), keys::STATS, CompletionStats::new());
        Self {
            cell: Observable::with_sink(initial, persist_to(kv, keys::STATS)),
        }
    }

    pub fn record_completion(&self, duration_min: u32) {
        self.cell.update(|stats| {
            *stats.entry(duration_min).or_insert(0) += 1;
        });
    }

    /// 0 for durations never completed.
    pub fn get_count(&self, duration_min: u32) -> u64 {
        self.cell.with(|stats| stats.get(&duration_min).copied().unwrap_or(0))
    }

    pub fn total(&self) -> u64 {
        self.cell.with(|stats| stats.values().sum())
    }

    pub fn get(&self) -> CompletionStats {
        self.cell.get()
    }

    pub fn subscribe(&self, listener: impl Fn(&CompletionStats) + Send + Sync + 'static) -> Subscription {
        self.cell.subscribe(listener)
    }

    pub fn reset(&self) {
        self.cell.set(CompletionStats::new());
    }
}
