//! SQLite-backed key-value store.
//!
//! A single `kv` table holds one JSON value per store key.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use super::KeyValueStore;
use crate::error::StorageError;
use crate::observable::lock;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|source| StorageError::OpenFailed {
            path: ":memory:".into(),
            source,
        })?;
        Self::with_connection(conn).map_err(|source| StorageError::OpenFailed {
            path: ":memory:".into(),
            source,
        })
    }

    fn with_connection(conn: Connection) -> Result<Self, rusqlite::Error> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        let conn = lock(&self.conn);
        let read_failed = |e: rusqlite::Error| StorageError::ReadFailed {
            key: "*".into(),
            message: e.to_string(),
        };
        let mut stmt = conn
            .prepare("SELECT key FROM kv ORDER BY key")
            .map_err(read_failed)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(read_failed)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(read_failed)
    }
}

impl KeyValueStore for SqliteStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        lock(&self.conn)
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
            .map_err(|e| StorageError::ReadFailed {
                key: key.to_string(),
                message: e.to_string(),
            })
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        lock(&self.conn)
            .execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map(|_| ())
            .map_err(|e| StorageError::WriteFailed {
                key: key.to_string(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_store() {
        let db = SqliteStore::open_memory().unwrap();
        assert!(db.read("test").unwrap().is_none());
        db.write("test", "\"hello\"").unwrap();
        assert_eq!(db.read("test").unwrap().unwrap(), "\"hello\"");
    }

    #[test]
    fn write_replaces_previous_value() {
        let db = SqliteStore::open_memory().unwrap();
        db.write("a", "1").unwrap();
        db.write("a", "2").unwrap();
        db.write("b", "3").unwrap();
        assert_eq!(db.read("a").unwrap().as_deref(), Some("2"));
        assert_eq!(db.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn reopen_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clockin.db");
        {
            let db = SqliteStore::open(&path).unwrap();
            db.write("clockin-task", "\"write docs\"").unwrap();
        }
        let db = SqliteStore::open(&path).unwrap();
        assert_eq!(
            db.read("clockin-task").unwrap().as_deref(),
            Some("\"write docs\"")
        );
    }
}
