//! TOML-based application configuration.
//!
//! This is process configuration (logging, tick rate, storage backend), not
//! user preferences: those live in the settings store.
//!
//! Configuration is stored at `~/.config/clockin/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::{ConfigError, Result};

/// Which key-value backend the stores persist to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Memory,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Default tracing filter level when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Milliseconds between timer ticks. Each tick takes one second off.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default)]
    pub storage: StorageBackend,
    /// Override for the SQLite file; defaults to `<data_dir>/clockin.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}

const KEYS: [&str; 4] = ["log_level", "tick_interval_ms", "storage", "database_path"];

fn default_log_level() -> String {
    "warn".into()
}
fn default_tick_interval_ms() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            tick_interval_ms: default_tick_interval_ms(),
            storage: StorageBackend::default(),
            database_path: None,
        }
    }
}

impl Config {
    /// `<data_dir>/config.toml`
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing defaults when no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)
                    .map_err(|e| ConfigError::ParseFailed(format!("{}: {e}", path.display())))?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn keys() -> &'static [&'static str] {
        &KEYS
    }

    /// Get a config value as string.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "log_level" => Some(self.log_level.clone()),
            "tick_interval_ms" => Some(self.tick_interval_ms.to_string()),
            "storage" => Some(
                match self.storage {
                    StorageBackend::Sqlite => "sqlite",
                    StorageBackend::Memory => "memory",
                }
                .to_string(),
            ),
            "database_path" => Some(
                self.database_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            ),
            _ => None,
        }
    }

    /// Set a config value in memory. Call [`Config::save`] to persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };
        match key {
            "log_level" => {
                let level = value.trim().to_ascii_lowercase();
                if !["trace", "debug", "info", "warn", "error", "off"].contains(&level.as_str()) {
                    return Err(invalid("expected trace, debug, info, warn, error or off"));
                }
                self.log_level = level;
            }
            "tick_interval_ms" => {
                let ms: u64 = value
                    .trim()
                    .parse()
                    .map_err(|_| invalid("expected a positive integer"))?;
                if ms == 0 {
                    return Err(invalid("expected a positive integer"));
                }
                self.tick_interval_ms = ms;
            }
            "storage" => {
                self.storage = match value.trim() {
                    "sqlite" => StorageBackend::Sqlite,
                    "memory" => StorageBackend::Memory,
                    _ => return Err(invalid("expected sqlite or memory")),
                };
            }
            "database_path" => {
                let trimmed = value.trim();
                self.database_path = (!trimmed.is_empty()).then(|| PathBuf::from(trimmed));
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// Resolved SQLite path.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("clockin.db")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert!(!toml_str.contains("database_path"));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let parsed: Config = toml::from_str("storage = \"memory\"").unwrap();
        assert_eq!(parsed.storage, StorageBackend::Memory);
        assert_eq!(parsed.tick_interval_ms, 1000);
        assert_eq!(parsed.log_level, "warn");
    }

    #[test]
    fn get_returns_string_for_all_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("log_level").as_deref(), Some("warn"));
        assert_eq!(cfg.get("tick_interval_ms").as_deref(), Some("1000"));
        assert_eq!(cfg.get("storage").as_deref(), Some("sqlite"));
        assert_eq!(cfg.get("database_path").as_deref(), Some(""));
        assert!(cfg.get("theme").is_none());
    }

    #[test]
    fn set_parses_typed_values() {
        let mut cfg = Config::default();
        cfg.set("tick_interval_ms", "250").unwrap();
        cfg.set("storage", "memory").unwrap();
        cfg.set("log_level", "DEBUG").unwrap();
        cfg.set("database_path", "/tmp/x.db").unwrap();
        assert_eq!(cfg.tick_interval(), Duration::from_millis(250));
        assert_eq!(cfg.storage, StorageBackend::Memory);
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.database_path().unwrap(), PathBuf::from("/tmp/x.db"));
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_values() {
        let mut cfg = Config::default();
        assert!(matches!(cfg.set("theme", "dark"), Err(ConfigError::UnknownKey(_))));
        assert!(cfg.set("tick_interval_ms", "0").is_err());
        assert!(cfg.set("tick_interval_ms", "soon").is_err());
        assert!(cfg.set("storage", "cloud").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "tick_interval_ms = \"fast\"").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
