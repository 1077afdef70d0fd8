//! Compute-through helpers: return a cached value or produce, store and
//! return a fresh one.
//!
//! The closure's error type must absorb `CacheError` so that a failing cache
//! read surfaces to the caller instead of silently triggering recomputation.

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use super::{CacheError, CacheManager};
use crate::keys;

/// Returns the cached response for `key`, or runs `compute` and caches its result
///
/// `compute` is only called on a miss. Its error is returned as is and
/// nothing is stored.
pub fn cached_json<T, E, F>(
    cache: &CacheManager,
    key: &str,
    ttl_hours: f64,
    compute: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    E: From<CacheError>,
    F: FnOnce() -> Result<T, E>,
{
    if let Some(hit) = cache.get_api_cache::<T>(key)? {
        return Ok(hit);
    }

    let fresh = compute()?;
    cache.set_api_cache(key, &fresh, ttl_hours)?;
    Ok(fresh)
}

/// Returns cached text for `(model, prompt)`, or runs `generate` and caches it
///
/// The prompt is hashed with [`keys::prompt_hash`]. Empty text counts as a
/// miss whether it comes from the cache or from `generate`, and is never
/// stored, so the next call tries again.
pub fn cached_generation<E, F>(
    cache: &CacheManager,
    model: &str,
    prompt: &str,
    ttl_hours: f64,
    generate: F,
) -> Result<String, E>
where
    E: From<CacheError>,
    F: FnOnce() -> Result<String, E>,
{
    let hash = keys::prompt_hash(model, prompt);
    if let Some(text) = cache
        .get_llm_cache(model, &hash)?
        .filter(|text| !text.is_empty())
    {
        return Ok(text);
    }

    let text = generate()?;
    if text.is_empty() {
        debug!(model, "empty generation not cached");
    } else {
        cache.set_llm_cache(model, &hash, &text, ttl_hours)?;
    }
    Ok(text)
}
