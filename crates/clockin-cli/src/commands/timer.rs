use std::sync::Arc;

use clockin_core::{next_duration, ManualScheduler, SettingsStore, TimerStore};

use super::{open_kv, print_json, CommandResult};

/// Only the task name outlives a process, so this is a fresh idle session
/// carrying the saved task.
pub fn status() -> CommandResult {
    let (_config, kv) = open_kv()?;
    let timer = TimerStore::new(kv, Arc::new(ManualScheduler::new()));
    let state = timer.state();
    print_json(&serde_json::json!({
        "state": state,
        "view": timer.view(),
    }))?;
    Ok(())
}

pub fn next(current: Option<u32>) -> CommandResult {
    let (_config, kv) = open_kv()?;
    let gradations = SettingsStore::new(Arc::clone(&kv)).gradations();
    let current = match current {
        Some(minutes) => minutes,
        None => TimerStore::new(kv, Arc::new(ManualScheduler::new()))
            .state()
            .selected_duration,
    };
    match next_duration(current, &gradations) {
        Some(minutes) => println!("{minutes}"),
        None => return Err("no gradations configured".into()),
    }
    Ok(())
}
