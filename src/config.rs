//! Configuration for the cache store
//!
//! Read from `~/.config/cafescout/config.toml` when present:
//!
//! ```toml
//! cache_path = "/var/tmp/cafescout.sqlite"
//! default_ttl_hours = 12
//! ```
//!
//! A missing file means defaults. `CAFESCOUT_CACHE_PATH` overrides
//! `cache_path`, and an explicit path (e.g. `--db`) overrides both.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::cache::{CacheManager, DEFAULT_TTL_HOURS};

/// Environment variable overriding the cache file location
pub const CACHE_PATH_ENV: &str = "CAFESCOUT_CACHE_PATH";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has wrong field types
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The default TTL is negative, NaN or infinite
    #[error("Invalid default_ttl_hours: {0}")]
    InvalidTtl(f64),

    /// No cache path was configured and no home directory exists
    #[error("No cache location available; set CAFESCOUT_CACHE_PATH or pass --db")]
    NoCacheDir,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Location of the SQLite cache file
    pub cache_path: Option<PathBuf>,
    /// TTL used when a caller doesn't pick one
    pub default_ttl_hours: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_path: None,
            default_ttl_hours: DEFAULT_TTL_HOURS,
        }
    }
}

impl Config {
    /// Loads the config from its XDG location, falling back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        match default_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Loads the config from `path`; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        if !config.default_ttl_hours.is_finite() || config.default_ttl_hours < 0.0 {
            return Err(ConfigError::InvalidTtl(config.default_ttl_hours));
        }
        Ok(config)
    }

    /// Picks the cache file location
    ///
    /// Precedence: `explicit`, then `CAFESCOUT_CACHE_PATH`, then the config
    /// file, then the XDG cache directory.
    pub fn resolve_cache_path(&self, explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
        let from_env = std::env::var_os(CACHE_PATH_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        self.resolve_cache_path_with(explicit, from_env)
    }

    fn resolve_cache_path_with(
        &self,
        explicit: Option<&Path>,
        from_env: Option<PathBuf>,
    ) -> Result<PathBuf, ConfigError> {
        explicit
            .map(Path::to_path_buf)
            .or(from_env)
            .or_else(|| self.cache_path.clone())
            .or_else(CacheManager::default_path)
            .ok_or(ConfigError::NoCacheDir)
    }
}

/// `~/.config/cafescout/config.toml` on Linux
pub fn default_config_path() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "cafescout")?;
    Some(project_dirs.config_dir().join("config.toml"))
}
