//! Expiring Cache Module
//!
//! Read-through cache for per-drug results with a single, fixed TTL and
//! lazy expiry. There is no background sweep and no capacity bound.

use std::sync::Arc;

use chrono::{Duration, SubsecRound};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::cache::entry::fold_key;
use crate::cache::{CacheBackend, CacheEntry, CacheStats, Clock, SystemClock};
use crate::error::Result;

// == Expiring Cache ==
/// TTL cache keyed by case-folded drug name.
pub struct ExpiringCache {
    /// Entry storage
    backend: Box<dyn CacheBackend>,
    /// Time source
    clock: Arc<dyn Clock>,
    /// Uniform time-to-live
    ttl: Duration,
    /// Performance statistics
    stats: Mutex<CacheStats>,
}

impl ExpiringCache {
    // == Constructors ==
    /// Creates a cache over `backend` using wall-clock time.
    pub fn new(backend: impl CacheBackend + 'static, ttl: Duration) -> Self {
        Self::with_clock(backend, ttl, Arc::new(SystemClock))
    }

    /// Creates a cache with an explicit time source.
    pub fn with_clock(
        backend: impl CacheBackend + 'static,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            backend: Box::new(backend),
            clock,
            ttl,
            stats: Mutex::new(CacheStats::new()),
        }
    }

    /// The configured TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Live Entry ==
    /// Loads the entry for `key`, deleting it if it has expired.
    fn live_entry(&self, key: &str) -> Result<Option<CacheEntry>> {
        let Some(entry) = self.backend.load(key)? else {
            return Ok(None);
        };

        if entry.is_expired(self.clock.now(), self.ttl) {
            // Only drop the exact entry we saw; a concurrent rewrite survives.
            self.backend.remove_if_stored_at(key, entry.stored_at)?;
            self.stats.lock().record_expiration();
            debug!("Cache entry for '{}' expired", key);
            return Ok(None);
        }

        Ok(Some(entry))
    }

    // == Get ==
    /// Returns the payload for `key` if a live entry exists.
    ///
    /// Expired entries are removed as a side effect and never returned.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        let key = fold_key(key);
        let entry = self.live_entry(&key)?;

        let mut stats = self.stats.lock();
        match entry {
            Some(entry) => {
                stats.record_hit();
                debug!("Cache hit for '{}'", key);
                Ok(Some(entry.payload))
            }
            None => {
                stats.record_miss();
                debug!("Cache miss for '{}'", key);
                Ok(None)
            }
        }
    }

    // == Set ==
    /// Upserts `payload` under `key`, restarting its TTL window.
    pub fn set(&self, key: &str, payload: Value) -> Result<()> {
        // Millisecond precision matches what durable backends can store.
        let stored_at = self.clock.now().trunc_subsecs(3);
        let entry = CacheEntry::new(fold_key(key), payload, stored_at);
        self.backend.upsert(&entry)?;
        self.stats.lock().record_write();
        Ok(())
    }

    // == Delete ==
    /// Removes the entry for `key`; absent keys are a no-op.
    pub fn delete(&self, key: &str) -> Result<()> {
        self.backend.remove(&fold_key(key))
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&self) -> Result<()> {
        self.backend.clear()
    }

    // == Age Of ==
    /// Time since the live entry for `key` was written.
    ///
    /// Applies the same expiry check as `get`: an expired entry yields `None`
    /// and is deleted.
    pub fn age_of(&self, key: &str) -> Result<Option<Duration>> {
        let now = self.clock.now();
        Ok(self
            .live_entry(&fold_key(key))?
            .map(|entry| entry.age(now).max(Duration::zero())))
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> Result<CacheStats> {
        let mut stats = self.stats.lock().clone();
        stats.set_total_entries(self.backend.len()?);
        Ok(stats)
    }
}
