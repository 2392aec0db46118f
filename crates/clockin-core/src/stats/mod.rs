//! Statistics stores.
//!
//! - [`CompletionStatsStore`]: completed sessions per duration
//! - [`TaskStatsStore`]: focused minutes per task label

mod completion;
mod task_minutes;

pub use completion::{CompletionStats, CompletionStatsStore};
pub use task_minutes::{TaskStats, TaskStatsStore};
