//! Application configuration.
//!
//! Built in layers, highest priority first:
//!   1. CLI / env — passed as `Some(value)` from clap
//!   2. TOML file (`--config <path>`)
//!   3. Built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

const DEFAULT_API_BASE_URL: &str = "https://jsonplaceholder.typicode.com";
const DEFAULT_STALE_AFTER_SECS: u64 = 60;
const DEFAULT_LOG: &str = "info";
const DEFAULT_LOG_FORMAT: &str = "pretty";

/// Resolved configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the remote to-do API.
    pub api_base_url: String,
    /// Freshness window of the query cache: a cached read older than this
    /// is stale and eligible for background refresh.
    pub stale_after_secs: u64,
    /// Log level filter (trace, debug, info, warn, error).
    pub log: String,
    /// Log output format: "pretty" or "json".
    pub log_format: String,
    /// Write logs to this file (rotated daily) instead of stderr.
    pub log_file: Option<PathBuf>,
}

/// `config.toml` mirror. Every field optional; absent fields fall through
/// to the next layer.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TomlConfig {
    api_base_url: Option<String>,
    stale_after_secs: Option<u64>,
    log: Option<String>,
    log_format: Option<String>,
    log_file: Option<PathBuf>,
}

impl AppConfig {
    /// Build config from CLI/env args + optional TOML file.
    pub fn new(
        config_path: Option<&Path>,
        api_base_url: Option<String>,
        stale_after_secs: Option<u64>,
        log: Option<String>,
        log_format: Option<String>,
        log_file: Option<PathBuf>,
    ) -> Self {
        // Load TOML as the lowest-priority override layer.
        let toml = config_path.and_then(load_toml).unwrap_or_default();

        Self {
            api_base_url: api_base_url
                .or(toml.api_base_url)
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            stale_after_secs: stale_after_secs
                .or(toml.stale_after_secs)
                .unwrap_or(DEFAULT_STALE_AFTER_SECS),
            log: log.or(toml.log).unwrap_or_else(|| DEFAULT_LOG.to_string()),
            log_format: log_format
                .or(toml.log_format)
                .unwrap_or_else(|| DEFAULT_LOG_FORMAT.to_string()),
            log_file: log_file.or(toml.log_file),
        }
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(None, None, None, None, None, None)
    }
}

fn load_toml(path: &Path) -> Option<TomlConfig> {
    let raw = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&raw) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!(path = %path.display(), "ignoring malformed config file: {e}");
            None
        }
    }
}
