//! Most-recently-used task names.

use std::sync::Arc;

use crate::observable::{Observable, Subscription};
use crate::storage::{keys, load_or, persist_to, KeyValueStore};

pub const MAX_TASK_HISTORY: usize = 20;

#[derive(Clone)]
pub struct TaskHistoryStore {
    cell: Observable<Vec<String>>,
}

impl TaskHistoryStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        let mut initial: Vec<String> = load_or(kv.as_ref(), keys::TASK_HISTORY, Vec::new());
        initial.truncate(MAX_TASK_HISTORY);
        Self {
            cell: Observable::with_sink(initial, persist_to(kv, keys::TASK_HISTORY)),
        }
    }

    /// Move the trimmed name to the front, dropping the oldest entries past
    /// [`MAX_TASK_HISTORY`]. Blank names are ignored.
    pub fn add_task(&self, task_name: &str) {
        let name = task_name.trim();
        if name.is_empty() {
            return;
        }
        let name = name.to_string();
        self.cell.update(|history| {
            history.retain(|t| *t != name);
            history.insert(0, name);
            history.truncate(MAX_TASK_HISTORY);
        });
    }

    /// Remove entries equal to `task_name` exactly. The argument is not
    /// trimmed, so `" a "` does not remove `"a"`.
    pub fn remove_task(&self, task_name: &str) {
        if !self.cell.with(|history| history.iter().any(|t| t == task_name)) {
            return;
        }
        self.cell.update(|history| history.retain(|t| t != task_name));
    }

    pub fn get(&self) -> Vec<String> {
        self.cell.get()
    }

    pub fn subscribe(&self, listener: impl Fn(&Vec<String>) + Send + Sync + 'static) -> Subscription {
        self.cell.subscribe(listener)
    }

    pub fn reset(&self) {
        self.cell.set(Vec::new());
    }
}
