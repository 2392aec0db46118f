pub mod config;
pub mod run;
pub mod settings;
pub mod stats;
pub mod task;
pub mod timer;

use std::sync::Arc;

use clockin_core::storage::open_store;
use clockin_core::{Config, CoreError, KeyValueStore};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Load the app config and open the store it points at.
pub fn open_kv() -> Result<(Config, Arc<dyn KeyValueStore>), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let kv = open_store(&config);
    Ok((config, kv))
}

pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), CoreError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn unserializable_output_is_a_json_error() {
        let mut by_pair = HashMap::new();
        by_pair.insert((1u8, 2u8), "a");
        assert!(matches!(print_json(&by_pair), Err(CoreError::Json(_))));
    }
}
