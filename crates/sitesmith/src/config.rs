//! Environment-driven configuration for the generator endpoint and the
//! project store.
//!
//! Precedence: environment variable override, then built-in default.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default OpenAI-compatible API base URL.
const DEFAULT_BASE_URL: &str = "http://localhost:8080/v1";
/// Default model alias; most local servers ignore unknown aliases.
const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// Default directory for persisted projects.
const DEFAULT_DATA_DIR: &str = "sitesmith-projects";

const ENV_BASE_URL: &str = "SITESMITH_BASE_URL";
const ENV_API_KEY: &str = "SITESMITH_API_KEY";
const ENV_MODEL: &str = "SITESMITH_MODEL";
const ENV_DATA_DIR: &str = "SITESMITH_DATA_DIR";
const ENV_TIMEOUT_SECS: &str = "SITESMITH_TIMEOUT_SECS";

/// Top-level configuration consumed by the CLI and the HTTP provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL for the OpenAI-compatible API (e.g. `http://host:8080/v1`).
    pub base_url: String,
    /// API key — most local servers accept any non-empty value.
    pub api_key: String,
    /// Model name sent in each request.
    pub model: String,
    /// Directory holding persisted projects.
    pub data_dir: PathBuf,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.into()),
            api_key: env::var(ENV_API_KEY).unwrap_or_else(|_| "local".into()),
            model: env::var(ENV_MODEL).unwrap_or_else(|_| DEFAULT_MODEL.into()),
            data_dir: env::var(ENV_DATA_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR)),
            timeout_secs: env::var(ENV_TIMEOUT_SECS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Build from environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Validate the config; return an error string if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("base_url must not be empty".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be > 0".to_string());
        }
        Ok(())
    }
}
