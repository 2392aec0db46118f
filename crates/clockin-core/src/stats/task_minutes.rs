use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::observable::{Observable, Subscription};
use crate::storage::{keys, load_or, persist_to, KeyValueStore};

/// Trimmed task name -> minutes focused on it. Fractional when partial
/// sessions are credited.
pub type TaskStats = BTreeMap<String, f64>;

#[derive(Clone)]
pub struct TaskStatsStore {
    cell: Observable<TaskStats>,
}

impl TaskStatsStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        let initial = load_or(kv.as_ref(), keys::TASK_STATS, TaskStats::new());
        Self {
            cell: Observable::with_sink(initial, persist_to(kv, keys::TASK_STATS)),
        }
    }

    /// Credit `minutes` to the trimmed `task_name`. Blank names and negative
    /// or non-finite amounts are ignored.
    pub fn record_minutes(&self, task_name: &str, minutes: f64) {
        let name = task_name.trim();
        if name.is_empty() || !minutes.is_finite() || minutes < 0.0 {
            debug!(task_name, minutes, "ignoring task minutes");
            return;
        }
        let name = name.to_string();
        self.cell.update(|stats| {
            *stats.entry(name).or_insert(0.0) += minutes;
        });
    }

    pub fn get_minutes(&self, task_name: &str) -> f64 {
        self.cell
            .with(|stats| stats.get(task_name.trim()).copied().unwrap_or(0.0))
    }

    pub fn get(&self) -> TaskStats {
        self.cell.get()
    }

    pub fn subscribe(&self, listener: impl Fn(&TaskStats) + Send + Sync + 'static) -> Subscription {
        self.cell.subscribe(listener)
    }

    pub fn reset(&self) {
        self.cell.set(TaskStats::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn store() -> TaskStatsStore {
        TaskStatsStore::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn accumulates_under_trimmed_name() {
        let stats = store();
        stats.record_minutes("  write report ", 20.0);
        stats.record_minutes("write report", 5.5);
        assert_eq!(stats.get_minutes("write report"), 25.5);
        assert_eq!(stats.get_minutes(" write report\t"), 25.5);
        assert_eq!(stats.get().len(), 1);
    }

    #[test]
    fn blank_names_are_ignored() {
        let stats = store();
        stats.record_minutes("", 10.0);
        stats.record_minutes("   ", 10.0);
        assert!(stats.get().is_empty());
    }

    #[test]
    fn unknown_task_has_zero_minutes() {
        assert_eq!(store().get_minutes("nothing"), 0.0);
    }

    #[test]
    fn rejects_negative_and_nan_minutes() {
        let stats = store();
        stats.record_minutes("a", -1.0);
        stats.record_minutes("a", f64::NAN);
        assert!(stats.get().is_empty());
    }

    #[test]
    fn notifies_only_on_real_changes() {
        let stats = store();
        let count = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let _sub = stats.subscribe(move |_| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });
        stats.record_minutes(" ", 3.0);
        stats.record_minutes("x", 3.0);
        stats.reset();
        // initial delivery + record + reset
        assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 3);
    }
}
