//! Command-line interface for inspecting and seeding the cache
//!
//! This module handles parsing of CLI arguments using clap and runs each
//! subcommand against an open `CacheManager`.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::cache::{CacheError, CacheManager};
use crate::keys;

/// Error types for CLI commands
#[derive(Debug, Error)]
pub enum CliError {
    /// The value given to `set` is not valid JSON
    #[error("Invalid JSON value: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The TTL flag is not a finite number of hours
    #[error("Invalid TTL: '{0}'. Expected a number of hours, e.g. 24 or 0.5")]
    InvalidTtl(String),

    /// `llm-get` needs either a prompt or `--hash`
    #[error("Missing prompt: pass a PROMPT or --hash")]
    MissingPrompt,

    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Writing to stdout failed
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

/// Cafe Scout - persistent cache for place searches and LLM recommendations
#[derive(Parser, Debug)]
#[command(name = "cafescout")]
#[command(about = "Inspect and seed the cafescout response cache")]
#[command(version)]
pub struct Cli {
    /// Cache file to use instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the cached JSON response for a query
    Get {
        /// Cache key, e.g. shibuya_1000
        query: String,
    },
    /// Store a JSON response under a query
    Set {
        query: String,
        /// JSON value, e.g. '{"name": "Cafe A", "rating": 4.5}'
        json: String,
        /// Hours until the entry expires (defaults to the configured TTL)
        #[arg(long, value_name = "HOURS", value_parser = parse_ttl_arg)]
        ttl_hours: Option<f64>,
    },
    /// Print cached LLM text for a model and prompt
    LlmGet {
        model: String,
        /// Prompt text; hashed together with the model
        #[arg(required_unless_present = "hash")]
        prompt: Option<String>,
        /// Look up by an existing prompt hash instead of a prompt
        #[arg(long, conflicts_with = "prompt")]
        hash: Option<String>,
    },
    /// Store LLM text for a model and prompt
    LlmSet {
        model: String,
        prompt: String,
        text: String,
        /// Hours until the entry expires (defaults to the configured TTL)
        #[arg(long, value_name = "HOURS", value_parser = parse_ttl_arg)]
        ttl_hours: Option<f64>,
    },
    /// Print the prompt hash used as the LLM cache key
    Hash { model: String, prompt: String },
    /// Print the location of the cache file
    Path,
}

/// Result of running a command that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The command completed (a lookup hit, or a write)
    Done,
    /// A lookup found nothing usable
    Miss,
}

/// Parses a `--ttl-hours` value.
///
/// # Returns
/// * `Ok(f64)` for any finite number, including zero and fractions
/// * `Err(CliError::InvalidTtl)` otherwise
pub fn parse_ttl_arg(s: &str) -> Result<f64, CliError> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|hours| hours.is_finite())
        .ok_or_else(|| CliError::InvalidTtl(s.to_string()))
}

impl Command {
    /// Prompt hash for `llm-get`, computed from the prompt when no hash is given
    fn llm_hash(model: &str, prompt: Option<&str>, hash: Option<&str>) -> Result<String, CliError> {
        match (hash, prompt) {
            (Some(hash), _) => Ok(hash.to_string()),
            (None, Some(prompt)) => Ok(keys::prompt_hash(model, prompt)),
            (None, None) => Err(CliError::MissingPrompt),
        }
    }
}

/// Runs `command` against `cache`, writing results to `out`
///
/// `default_ttl_hours` applies to writes without `--ttl-hours`.
pub fn execute(
    command: &Command,
    cache: &CacheManager,
    default_ttl_hours: f64,
    out: &mut impl Write,
) -> Result<Outcome, CliError> {
    match command {
        Command::Get { query } => match cache.get_api_cache::<serde_json::Value>(query)? {
            Some(value) => {
                let pretty = serde_json::to_string_pretty(&value).map_err(CliError::InvalidJson)?;
                writeln!(out, "{}", pretty)?;
                Ok(Outcome::Done)
            }
            None => Ok(Outcome::Miss),
        },
        Command::Set {
            query,
            json,
            ttl_hours,
        } => {
            let value: serde_json::Value =
                serde_json::from_str(json).map_err(CliError::InvalidJson)?;
            cache.set_api_cache(query, &value, ttl_hours.unwrap_or(default_ttl_hours))?;
            Ok(Outcome::Done)
        }
        Command::LlmGet {
            model,
            prompt,
            hash,
        } => {
            let hash = Command::llm_hash(model, prompt.as_deref(), hash.as_deref())?;
            match cache.get_llm_cache(model, &hash)? {
                Some(text) => {
                    writeln!(out, "{}", text)?;
                    Ok(Outcome::Done)
                }
                None => Ok(Outcome::Miss),
            }
        }
        Command::LlmSet {
            model,
            prompt,
            text,
            ttl_hours,
        } => {
            let hash = keys::prompt_hash(model, prompt);
            cache.set_llm_cache(model, &hash, text, ttl_hours.unwrap_or(default_ttl_hours))?;
            writeln!(out, "{}", hash)?;
            Ok(Outcome::Done)
        }
        Command::Hash { model, prompt } => {
            writeln!(out, "{}", keys::prompt_hash(model, prompt))?;
            Ok(Outcome::Done)
        }
        Command::Path => {
            writeln!(out, "{}", cache.path().display())?;
            Ok(Outcome::Done)
        }
    }
}
