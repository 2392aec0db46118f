use std::sync::Arc;

use clap::Subcommand;
use clockin_core::{CompletionStatsStore, TaskStatsStore};

use super::{open_kv, print_json, CommandResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Completed sessions per duration
    Completions,
    /// Minutes focused per task
    Tasks,
    /// Clear both completion and task statistics
    Reset,
}

pub fn run(action: StatsAction) -> CommandResult {
    let (_config, kv) = open_kv()?;

    match action {
        StatsAction::Completions => {
            let stats = CompletionStatsStore::new(kv);
            print_json(&serde_json::json!({
                "total": stats.total(),
                "byDuration": stats.get(),
            }))?;
        }
        StatsAction::Tasks => print_json(&TaskStatsStore::new(kv).get())?,
        StatsAction::Reset => {
            CompletionStatsStore::new(Arc::clone(&kv)).reset();
            TaskStatsStore::new(kv).reset();
            println!("stats reset");
        }
    }
    Ok(())
}
