//! Gateway configuration.
//!
//! Loaded once at startup from an optional JSON file, then overridden by
//! `ANNY_*` environment variables (a `.env` file in the working directory is
//! honoured). The resulting [`Config`] is immutable for the process lifetime.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GatewayError, Result};

/// Query cache sizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Seconds an entry stays fresh after it is stored.
    pub ttl_secs: u64,
    /// Maximum number of entries held at once.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,
            max_entries: 500,
        }
    }
}

/// REST server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Bind address (default: 127.0.0.1).
    pub bind: String,
    /// Listen port.
    pub port: u16,
    /// Shared secret expected in `X-API-Key`. Empty disables authentication.
    pub api_key: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8000,
            api_key: String::new(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub cache: CacheConfig,
}

impl Config {
    /// Parse a JSON config file. Missing keys take their defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        serde_json::from_str(&data)
            .map_err(|e| GatewayError::Config(format!("{}: {e}", path.display())))
    }

    /// Load `.env`, then the optional file, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Ok(env_path) = dotenvy::dotenv() {
            debug!(path = %env_path.display(), "Loaded .env");
        }
        let mut config = match path {
            Some(p) => Self::load_from_path(p)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Apply `ANNY_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("ANNY_API_KEY") {
            self.api.api_key = key;
        }
        if let Some(bind) = lookup("ANNY_BIND") {
            self.api.bind = bind;
        }
        if let Some(port) = lookup("ANNY_PORT") {
            self.api.port = parse_var("ANNY_PORT", &port)?;
        }
        if let Some(ttl) = lookup("ANNY_CACHE_TTL") {
            self.cache.ttl_secs = parse_var("ANNY_CACHE_TTL", &ttl)?;
        }
        if let Some(max) = lookup("ANNY_CACHE_MAX_ENTRIES") {
            self.cache.max_entries = parse_var("ANNY_CACHE_MAX_ENTRIES", &max)?;
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| GatewayError::Config(format!("{name}={raw:?}: {e}")))
}
