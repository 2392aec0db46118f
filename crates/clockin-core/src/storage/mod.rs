mod config;
mod memory;
mod sqlite;

pub use config::{Config, StorageBackend};
pub use memory::{MemoryStore, UnavailableStore};
pub use sqlite::SqliteStore;

use std::path::PathBuf;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::{Result, StorageError};

/// Keys under which each store persists its full value.
pub mod keys {
    pub const SETTINGS: &str = "clockin-settings";
    pub const STATS: &str = "clockin-stats";
    pub const TASK_NAME: &str = "clockin-task";
    pub const TASK_STATS: &str = "clockin-task-stats";
    pub const TASK_HISTORY: &str = "clockin-task-history";
}

/// Synchronous string key-value persistence.
///
/// Values are JSON text. Implementations report failures; the stores built
/// on top log them and carry on with their in-memory value.
pub trait KeyValueStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Returns the clockin data directory.
///
/// `CLOCKIN_DATA_DIR` wins when set. Otherwise `~/.config/clockin[-dev]/`,
/// with the `-dev` suffix when `CLOCKIN_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("CLOCKIN_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("CLOCKIN_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("clockin-dev")
            } else {
                base_dir.join("clockin")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Open the backend selected by `config`.
///
/// Falls back to an in-memory store when the database cannot be opened, so
/// callers always get a working (if forgetful) store.
pub fn open_store(config: &Config) -> Arc<dyn KeyValueStore> {
    match config.storage {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Sqlite => {
            let opened = config
                .database_path()
                .and_then(|path| SqliteStore::open(&path).map_err(Into::into));
            match opened {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    warn!("persistence unavailable, running in memory only: {e}");
                    Arc::new(MemoryStore::new())
                }
            }
        }
    }
}

/// Read and decode `key`, substituting `fallback` when the key is missing,
/// unreadable or malformed.
pub fn load_or<T: DeserializeOwned>(kv: &dyn KeyValueStore, key: &str, fallback: T) -> T {
    match kv.read(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, "stored value is malformed, using default: {e}");
                fallback
            }
        },
        Ok(None) => fallback,
        Err(e) => {
            warn!(key, "failed to load, using default: {e}");
            fallback
        }
    }
}

/// Encode and write the full value of `key`. Failures are logged, never returned.
pub fn save<T: Serialize + ?Sized>(kv: &dyn KeyValueStore, key: &str, value: &T) {
    let encoded = match serde_json::to_string(value) {
        Ok(encoded) => encoded,
        Err(e) => {
            warn!(key, "failed to encode value: {e}");
            return;
        }
    };
    if let Err(e) = kv.write(key, &encoded) {
        warn!(key, "failed to save: {e}");
    }
}

/// Sink for [`crate::Observable::with_sink`] that saves every new value under `key`.
pub(crate) fn persist_to<T: Serialize>(
    kv: Arc<dyn KeyValueStore>,
    key: &'static str,
) -> impl Fn(&T) + Send + Sync + 'static {
    move |value: &T| save(kv.as_ref(), key, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn load_or_returns_stored_value() {
        let kv = MemoryStore::new();
        kv.write("k", "[1,2,3]").unwrap();
        let value: Vec<u32> = load_or(&kv, "k", Vec::new());
        assert_eq!(value, vec![1, 2, 3]);
    }

    #[test]
    fn load_or_substitutes_default_for_malformed_content() {
        let kv = MemoryStore::new();
        kv.write("k", "{not json").unwrap();
        let value: BTreeMap<u32, u64> = load_or(&kv, "k", BTreeMap::new());
        assert!(value.is_empty());
    }

    #[test]
    fn load_or_substitutes_default_when_storage_fails() {
        let value: String = load_or(&UnavailableStore, "k", "fallback".to_string());
        assert_eq!(value, "fallback");
    }

    #[test]
    fn save_swallows_write_failures() {
        save(&UnavailableStore, "k", &42u32);
    }

    #[test]
    fn save_writes_json() {
        let kv = MemoryStore::new();
        save(&kv, "k", &vec!["a", "b"]);
        assert_eq!(kv.read("k").unwrap().as_deref(), Some(r#"["a","b"]"#));
    }
}
