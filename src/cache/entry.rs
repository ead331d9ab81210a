//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

// == Cache Entry ==
/// A single cached payload keyed by case-folded drug name.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Case-folded key
    pub key: String,
    /// Opaque payload; the cache never interprets it
    pub payload: Value,
    /// When the entry was last written
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped at `stored_at`.
    pub fn new(key: impl Into<String>, payload: Value, stored_at: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            payload,
            stored_at,
        }
    }

    // == Age ==
    /// Time elapsed since the entry was written.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.stored_at
    }

    // == Is Expired ==
    /// Checks if the entry has outlived `ttl`.
    ///
    /// Boundary condition: an entry whose age equals the TTL exactly is
    /// still live; it expires once the age is strictly greater.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age(now) > ttl
    }
}

/// Normalizes a cache key.
pub fn fold_key(key: &str) -> String {
    key.trim().to_lowercase()
}
