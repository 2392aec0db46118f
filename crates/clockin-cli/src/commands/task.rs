use std::sync::Arc;

use clap::Subcommand;
use clockin_core::{ManualScheduler, TaskHistoryStore, TimerStore};

use super::{open_kv, print_json, CommandResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Set the current task name
    Set { name: String },
    /// Print the current task name
    Show,
    /// Recently completed tasks, newest first
    History,
    /// Remove one entry from the history (exact match)
    Forget { name: String },
    /// Clear the history
    Clear,
}

pub fn run(action: TaskAction) -> CommandResult {
    let (_config, kv) = open_kv()?;

    match action {
        TaskAction::Set { name } => {
            let timer = TimerStore::new(kv, Arc::new(ManualScheduler::new()));
            timer.set_task_name(&name);
            println!("{}", timer.state().task_name);
        }
        TaskAction::Show => {
            let timer = TimerStore::new(kv, Arc::new(ManualScheduler::new()));
            println!("{}", timer.state().task_name);
        }
        TaskAction::History => print_json(&TaskHistoryStore::new(kv).get())?,
        TaskAction::Forget { name } => {
            let history = TaskHistoryStore::new(kv);
            history.remove_task(&name);
            print_json(&history.get())?;
        }
        TaskAction::Clear => {
            TaskHistoryStore::new(kv).reset();
            println!("history cleared");
        }
    }
    Ok(())
}
