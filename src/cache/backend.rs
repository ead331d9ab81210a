//! Cache Backend Module
//!
//! Storage seam behind the expiring cache. Backends store entries verbatim
//! and know nothing about TTLs.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::cache::CacheEntry;
use crate::error::Result;

/// Key-value storage for cache entries.
///
/// Every method must be atomic with respect to concurrent calls on the same
/// key. Keys arrive already case-folded.
pub trait CacheBackend: Send + Sync {
    /// Reads the entry stored under `key`.
    fn load(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Inserts or replaces the entry under `entry.key`.
    fn upsert(&self, entry: &CacheEntry) -> Result<()>;

    /// Removes the entry under `key`; absent keys are a no-op.
    fn remove(&self, key: &str) -> Result<()>;

    /// Removes the entry under `key` only if it was stored at `stored_at`.
    ///
    /// Returns true if an entry was removed.
    fn remove_if_stored_at(&self, key: &str, stored_at: DateTime<Utc>) -> Result<bool>;

    /// Removes every entry.
    fn clear(&self) -> Result<()>;

    /// Number of stored entries, expired or not.
    fn len(&self) -> Result<usize>;
}

// == Memory Backend ==
/// Non-durable backend backed by a HashMap.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheBackend for MemoryBackend {
    fn load(&self, key: &str) -> Result<Option<CacheEntry>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn upsert(&self, entry: &CacheEntry) -> Result<()> {
        self.entries.write().insert(entry.key.clone(), entry.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn remove_if_stored_at(&self, key: &str, stored_at: DateTime<Utc>) -> Result<bool> {
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some(entry) if entry.stored_at == stored_at => {
                entries.remove(key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn clear(&self) -> Result<()> {
        self.entries.write().clear();
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.entries.read().len())
    }
}
