//! Error types for the cache store

use thiserror::Error;

/// Errors that can occur when reading from or writing to the cache store
///
/// A cache miss is not an error: lookups return `Ok(None)` for absent or
/// expired entries.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The SQLite layer failed (disk I/O, locking, schema)
    #[error("Cache storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// The directory holding the cache file could not be created
    #[error("Cache directory error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored payload could not be decoded into the requested type
    #[error("Corrupted cache entry for '{key}': {source}")]
    Corrupted {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The value handed to the cache could not be serialized
    #[error("Failed to serialize cache value: {0}")]
    Serialize(#[source] serde_json::Error),

    /// TTL is NaN, infinite, or pushes the expiry past the timestamp range
    #[error("Invalid TTL: {0} hours")]
    InvalidTtl(f64),

    /// A thread panicked while holding the connection
    #[error("Cache connection lock poisoned")]
    LockPoisoned,
}
