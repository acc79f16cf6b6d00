//! Application configuration management.
//!
//! This module handles loading and saving the console configuration: backend
//! base URL, cache switch and TTL, request timeout, and the last phone number
//! used to log in.
//!
//! Configuration is stored at `~/.config/lessondesk/config.json`. Environment
//! variables (`LESSONDESK_*`) override the file.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "lessondesk";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Subdirectory of the cache dir holding the persistent store
const STORAGE_DIR: &str = "storage";

/// Production backend
pub const DEFAULT_API_BASE_URL: &str = "https://lrussrubackend-production.up.railway.app";

/// 5 minutes, matching the cache store default.
const DEFAULT_CACHE_TTL_MS: u64 = 5 * 60 * 1000;

/// 10s keeps a hung backend from freezing the console.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

pub const ENV_API_BASE_URL: &str = "LESSONDESK_API_BASE_URL";
pub const ENV_CACHE_ENABLED: &str = "LESSONDESK_CACHE_ENABLED";
pub const ENV_CACHE_TTL_MS: &str = "LESSONDESK_CACHE_TTL_MS";
pub const ENV_TIMEOUT_SECS: &str = "LESSONDESK_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub cache_enabled: bool,
    pub cache_ttl_ms: u64,
    pub request_timeout_secs: u64,
    pub last_phone: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            cache_enabled: true,
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            last_phone: None,
        }
    }
}

impl Config {
    /// Load the config file (defaults when absent), then apply env overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply overrides from a variable lookup. Unparseable values are
    /// ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_BASE_URL).filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_CACHE_ENABLED) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => self.cache_enabled = true,
                "false" | "0" | "no" => self.cache_enabled = false,
                other => warn!(value = other, "Ignoring invalid {}", ENV_CACHE_ENABLED),
            }
        }
        if let Some(raw) = lookup(ENV_CACHE_TTL_MS) {
            match raw.trim().parse() {
                Ok(ms) => self.cache_ttl_ms = ms,
                Err(e) => warn!(value = %raw, error = %e, "Ignoring invalid {}", ENV_CACHE_TTL_MS),
            }
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            match raw.trim().parse() {
                Ok(secs) => self.request_timeout_secs = secs,
                Err(e) => warn!(value = %raw, error = %e, "Ignoring invalid {}", ENV_TIMEOUT_SECS),
            }
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Base URL without a trailing slash, ready for endpoint concatenation.
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the persistent store (cache entries and credentials).
    pub fn storage_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME).join(STORAGE_DIR))
    }
}
