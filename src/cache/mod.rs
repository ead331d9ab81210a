//! Cache Module
//!
//! Provides a per-drug expiring cache with lazy TTL expiry over a pluggable
//! storage backend (SQLite for durability, HashMap for tests).

mod backend;
mod clock;
mod entry;
mod sqlite;
mod stats;
mod store;


// Re-export public types
pub use backend::{CacheBackend, MemoryBackend};
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use sqlite::SqliteBackend;
pub use stats::CacheStats;
pub use store::ExpiringCache;

// == Public Constants ==
/// Default time-to-live for cached drug results, in hours
pub const DEFAULT_TTL_HOURS: i64 = 24;
