//! Cafe Scout cache library
//!
//! Persistent SQLite memoization for place-search API responses and LLM
//! recommendations, plus the key helpers and configuration its callers use.

pub mod cache;
pub mod cli;
pub mod config;
pub mod keys;
