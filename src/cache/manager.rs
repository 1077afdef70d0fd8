//! Cache manager for persisting API and LLM responses to SQLite
//!
//! Provides a `CacheManager` that stores JSON responses and generated text
//! with expiry timestamps, so repeated place searches and prompts can skip
//! the network.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC text with microseconds
//! (`2026-10-19T08:00:00.000000Z`) and expiry is checked by comparing that
//! text in SQL. Rows written by other tools must use the same format; the
//! `created_at` column default produces it too.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Datelike, Duration, SecondsFormat, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use super::{CacheError, Clock, SystemClock};

/// TTL applied when a caller has no better idea (24 hours)
pub const DEFAULT_TTL_HOURS: f64 = 24.0;

/// File name used inside the XDG cache directory
const CACHE_FILE_NAME: &str = "cache.sqlite";

/// Last year that still formats as four digits and so compares correctly as text
const MAX_EXPIRY_YEAR: i32 = 9999;

/// How long a write waits on a locked database before giving up
const BUSY_TIMEOUT: StdDuration = StdDuration::from_secs(5);

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS cache (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        query TEXT NOT NULL,
        response_json TEXT NOT NULL,
        created_at TIMESTAMP DEFAULT (strftime('%Y-%m-%dT%H:%M:%f000Z', 'now')),
        expires_at TIMESTAMP
    );
    CREATE INDEX IF NOT EXISTS idx_cache_query ON cache (query);
    CREATE TABLE IF NOT EXISTS llm_cache (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        model_name TEXT NOT NULL,
        prompt_hash TEXT NOT NULL,
        response_text TEXT NOT NULL,
        created_at TIMESTAMP DEFAULT (strftime('%Y-%m-%dT%H:%M:%f000Z', 'now')),
        expires_at TIMESTAMP,
        UNIQUE (model_name, prompt_hash)
    );
";

/// Durable key-value memoization with TTL
///
/// Holds one long-lived SQLite connection. Callers on several threads may
/// share a manager (e.g. behind an `Arc`); access to the connection is
/// serialized. Nothing is cached in memory: every call round-trips to the
/// database file.
#[derive(Debug)]
pub struct CacheManager {
    conn: Mutex<Connection>,
    path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl CacheManager {
    /// Opens (creating if needed) the cache file at `path`
    ///
    /// Parent directories and both tables are created when absent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        Self::open_with_clock(path, Arc::new(SystemClock))
    }

    /// Opens the cache with a custom time source
    ///
    /// Useful for testing expiry without waiting for it.
    pub fn open_with_clock(
        path: impl AsRef<Path>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CacheError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        conn.execute_batch(SCHEMA)?;

        info!(path = %path.display(), journal_mode = %mode, "opened cache store");

        Ok(Self {
            conn: Mutex::new(conn),
            path,
            clock,
        })
    }

    /// Returns the XDG-compliant default location of the cache file
    ///
    /// `~/.cache/cafescout/cache.sqlite` on Linux. Returns `None` when no
    /// home directory can be determined.
    pub fn default_path() -> Option<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", "cafescout")?;
        Some(project_dirs.cache_dir().join(CACHE_FILE_NAME))
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Closes the connection, reporting any error SQLite raises on close
    ///
    /// Dropping the manager also closes it; this just makes failures visible.
    pub fn close(self) -> Result<(), CacheError> {
        let conn = self
            .conn
            .into_inner()
            .map_err(|_| CacheError::LockPoisoned)?;
        conn.close().map_err(|(_, e)| CacheError::Storage(e))
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.conn.lock().map_err(|_| CacheError::LockPoisoned)
    }

    /// Looks up a non-expired response stored under `query`
    ///
    /// When repeated inserts left several live rows for the same query, the
    /// most recently inserted one wins.
    ///
    /// # Returns
    /// * `Ok(Some(T))` on a hit
    /// * `Ok(None)` if no row exists or every row has expired
    /// * `Err(CacheError::Corrupted)` if the stored JSON does not decode as `T`
    pub fn get_api_cache<T: DeserializeOwned>(&self, query: &str) -> Result<Option<T>, CacheError> {
        let now = format_timestamp(self.clock.now());
        let stored: Option<String> = self
            .connection()?
            .query_row(
                "SELECT response_json FROM cache
                 WHERE query = ?1 AND (expires_at IS NULL OR expires_at > ?2)
                 ORDER BY id DESC
                 LIMIT 1",
                params![query, now],
                |row| row.get(0),
            )
            .optional()?;

        let Some(json) = stored else {
            debug!(query, "api cache miss");
            return Ok(None);
        };

        debug!(query, "api cache hit");
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|source| CacheError::Corrupted {
                key: query.to_string(),
                source,
            })
    }

    /// Stores `response` under `query`, expiring after `ttl_hours`
    ///
    /// Always inserts a new row; an earlier row for the same query is left
    /// in place. Fractional hours are allowed, and a TTL of zero or less
    /// produces an entry that is already expired.
    pub fn set_api_cache<T: Serialize + ?Sized>(
        &self,
        query: &str,
        response: &T,
        ttl_hours: f64,
    ) -> Result<(), CacheError> {
        let json = serde_json::to_string(response).map_err(CacheError::Serialize)?;
        let now = self.clock.now();
        let expires_at = expiry_after(now, ttl_hours)?;

        self.connection()?.execute(
            "INSERT INTO cache (query, response_json, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                query,
                json,
                format_timestamp(now),
                format_timestamp(expires_at)
            ],
        )?;

        debug!(query, ttl_hours, "api cache stored");
        Ok(())
    }

    /// Looks up non-expired generated text for a model and prompt hash
    pub fn get_llm_cache(
        &self,
        model_name: &str,
        prompt_hash: &str,
    ) -> Result<Option<String>, CacheError> {
        let now = format_timestamp(self.clock.now());
        let text: Option<String> = self
            .connection()?
            .query_row(
                "SELECT response_text FROM llm_cache
                 WHERE model_name = ?1 AND prompt_hash = ?2
                   AND (expires_at IS NULL OR expires_at > ?3)",
                params![model_name, prompt_hash, now],
                |row| row.get(0),
            )
            .optional()?;

        debug!(model_name, prompt_hash, hit = text.is_some(), "llm cache lookup");
        Ok(text)
    }

    /// Stores generated text for a model and prompt hash
    ///
    /// An existing row for the same pair has its text and expiry replaced in
    /// one upsert statement; its `created_at` is kept.
    pub fn set_llm_cache(
        &self,
        model_name: &str,
        prompt_hash: &str,
        response_text: &str,
        ttl_hours: f64,
    ) -> Result<(), CacheError> {
        let now = self.clock.now();
        let expires_at = expiry_after(now, ttl_hours)?;

        self.connection()?.execute(
            "INSERT INTO llm_cache (model_name, prompt_hash, response_text, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (model_name, prompt_hash) DO UPDATE SET
                 response_text = excluded.response_text,
                 expires_at = excluded.expires_at",
            params![
                model_name,
                prompt_hash,
                response_text,
                format_timestamp(now),
                format_timestamp(expires_at)
            ],
        )?;

        debug!(model_name, prompt_hash, ttl_hours, "llm cache stored");
        Ok(())
    }
}

/// Fixed-width UTC text so that SQL string comparison matches time order
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn expiry_after(now: DateTime<Utc>, ttl_hours: f64) -> Result<DateTime<Utc>, CacheError> {
    if !ttl_hours.is_finite() {
        return Err(CacheError::InvalidTtl(ttl_hours));
    }
    let millis = (ttl_hours * 3_600_000.0).round();
    Duration::try_milliseconds(millis as i64)
        .filter(|_| millis.abs() < i64::MAX as f64)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .filter(|expires_at| expires_at.year() <= MAX_EXPIRY_YEAR)
        .ok_or(CacheError::InvalidTtl(ttl_hours))
}
