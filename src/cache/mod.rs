//! Cache module for storing API and LLM responses on disk
//!
//! This module provides a cache manager backed by a single SQLite file with
//! two tables: a generic table mapping query strings to JSON responses, and
//! an LLM table mapping `(model_name, prompt_hash)` to generated text. Every
//! entry carries an optional expiry; expired rows are hidden from lookups
//! but never swept.

mod clock;
mod error;
mod manager;
pub mod memo;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::CacheError;
pub use manager::{CacheManager, DEFAULT_TTL_HOURS};
