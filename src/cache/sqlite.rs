//! SQLite Cache Backend
//!
//! Durable backend that survives process restarts. Each operation is a
//! single statement, so SQLite provides the per-key atomicity.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheBackend, CacheEntry};
use crate::error::{AppError, Result};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS cache (
        drug_name TEXT PRIMARY KEY NOT NULL,
        data      TEXT NOT NULL,
        stored_at INTEGER NOT NULL
    )
";

// == SQLite Backend ==
/// Cache backend persisted to a SQLite file.
#[derive(Debug)]
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Opens (or creates) the database at `path`, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Internal(format!(
                    "cannot create cache directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        let conn = Connection::open(path)?;
        debug!("Opened cache database at {}", path.display());
        Self::with_connection(conn)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn decode_row(key: String, data: String, stored_at_ms: i64) -> Result<CacheEntry> {
    let payload: Value = serde_json::from_str(&data)?;
    let stored_at = DateTime::from_timestamp_millis(stored_at_ms).ok_or_else(|| {
        AppError::Internal(format!("invalid stored_at {} for key {}", stored_at_ms, key))
    })?;
    Ok(CacheEntry::new(key, payload, stored_at))
}

impl CacheBackend for SqliteBackend {
    fn load(&self, key: &str) -> Result<Option<CacheEntry>> {
        let row = self
            .conn
            .lock()
            .query_row(
                "SELECT data, stored_at FROM cache WHERE drug_name = ?1",
                params![key],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;

        row.map(|(data, stored_at)| decode_row(key.to_string(), data, stored_at))
            .transpose()
    }

    fn upsert(&self, entry: &CacheEntry) -> Result<()> {
        let data = serde_json::to_string(&entry.payload)?;
        self.conn.lock().execute(
            "INSERT INTO cache (drug_name, data, stored_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(drug_name) DO UPDATE SET data = excluded.data, stored_at = excluded.stored_at",
            params![entry.key, data, entry.stored_at.timestamp_millis()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .lock()
            .execute("DELETE FROM cache WHERE drug_name = ?1", params![key])?;
        Ok(())
    }

    fn remove_if_stored_at(&self, key: &str, stored_at: DateTime<Utc>) -> Result<bool> {
        let removed = self.conn.lock().execute(
            "DELETE FROM cache WHERE drug_name = ?1 AND stored_at = ?2",
            params![key, stored_at.timestamp_millis()],
        )?;
        Ok(removed > 0)
    }

    fn clear(&self) -> Result<()> {
        self.conn.lock().execute("DELETE FROM cache", [])?;
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM cache", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::SubsecRound;
    use serde_json::json;

    fn now_ms() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }

    #[test]
    fn test_sqlite_roundtrip_and_upsert() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        let at = now_ms();
        backend
            .upsert(&CacheEntry::new("aspirin", json!({"safety_score": 90.0}), at))
            .unwrap();
        backend
            .upsert(&CacheEntry::new("aspirin", json!({"safety_score": 80.0}), at))
            .unwrap();

        let entry = backend.load("aspirin").unwrap().unwrap();
        assert_eq!(entry.payload, json!({"safety_score": 80.0}));
        assert_eq!(entry.stored_at, at);
        assert_eq!(backend.len().unwrap(), 1);
    }

    #[test]
    fn test_sqlite_remove_and_clear() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        let at = now_ms();
        backend.upsert(&CacheEntry::new("a", json!(1), at)).unwrap();
        backend.upsert(&CacheEntry::new("b", json!(2), at)).unwrap();

        backend.remove("a").unwrap();
        backend.remove("a").unwrap();
        assert!(backend.load("a").unwrap().is_none());

        backend.clear().unwrap();
        assert_eq!(backend.len().unwrap(), 0);
    }

    #[test]
    fn test_sqlite_remove_if_stored_at() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        let at = now_ms();
        backend.upsert(&CacheEntry::new("a", json!(1), at)).unwrap();

        assert!(!backend
            .remove_if_stored_at("a", at - chrono::Duration::seconds(1))
            .unwrap());
        assert!(backend.remove_if_stored_at("a", at).unwrap());
        assert!(backend.load("a").unwrap().is_none());
    }

    #[test]
    fn test_sqlite_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.db");
        let at = now_ms();

        {
            let backend = SqliteBackend::open(&path).unwrap();
            backend
                .upsert(&CacheEntry::new("ibuprofen", json!(["x"]), at))
                .unwrap();
        }

        let reopened = SqliteBackend::open(&path).unwrap();
        let entry = reopened.load("ibuprofen").unwrap().unwrap();
        assert_eq!(entry.payload, json!(["x"]));
        assert_eq!(entry.stored_at, at);
    }
}
