//! Configuration for the document client.
//!
//! Settings are layered, lowest precedence first:
//!
//! 1. Built-in defaults ([`ClientConfig::default`])
//! 2. An optional TOML file (`NVIEW_CONFIG`, or `config.toml` in the platform config dir)
//! 3. Environment variables (`NOTION_VERSION`, `NOTION_API_BASE_URL`)
//!
//! The API token is deliberately kept out of the file format and is loaded
//! separately via [`ApiToken::from_env`].
//!
//! ## Example Configuration File
//!
//! ```toml
//! [client]
//! max_concurrency = 4
//! max_attempts = 5
//! timeout_secs = 60
//! ```
//!
//! ```rust
//! use nview_core::ClientConfig;
//!
//! let config = ClientConfig::default();
//! assert_eq!(config.page_size, 100);
//! assert_eq!(config.max_concurrency, 10);
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";
/// Protocol version sent in the `Notion-Version` header.
pub const DEFAULT_API_VERSION: &str = "2022-06-28";

/// Environment variable holding the integration token.
pub const TOKEN_ENV: &str = "NOTION_TOKEN";
/// Environment variable overriding [`ClientConfig::api_version`].
pub const VERSION_ENV: &str = "NOTION_VERSION";
/// Environment variable overriding [`ClientConfig::base_url`].
pub const BASE_URL_ENV: &str = "NOTION_API_BASE_URL";
/// Environment variable pointing at an explicit config file.
pub const CONFIG_PATH_ENV: &str = "NVIEW_CONFIG";

/// Top-level layout of the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Document client settings.
    pub client: ClientConfig,
}

/// Tunables for [`NotionClient`](crate::NotionClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API root, without a trailing slash.
    pub base_url: String,
    /// Value of the `Notion-Version` header.
    pub api_version: String,
    /// Results requested per page of a child listing.
    pub page_size: u32,
    /// Capacity of the process-wide concurrency gate.
    pub max_concurrency: usize,
    /// Attempts per physical request before giving up.
    pub max_attempts: u32,
    /// Base of the linear backoff applied after a 429.
    pub rate_limit_base_delay_ms: u64,
    /// Fixed delay after any other transient failure.
    pub transient_delay_ms: u64,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            page_size: 100,
            max_concurrency: 10,
            max_attempts: 3,
            rate_limit_base_delay_ms: 2_000,
            transient_delay_ms: 1_000,
            timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Per-request timeout as a [`Duration`].
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Delay before retrying after the `attempt`-th consecutive 429 (1-based).
    pub const fn rate_limit_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.rate_limit_base_delay_ms.saturating_mul(attempt as u64))
    }

    /// Delay before retrying after any other transient failure.
    pub const fn transient_delay(&self) -> Duration {
        Duration::from_millis(self.transient_delay_ms)
    }

    /// Override settings from `NOTION_VERSION` and `NOTION_API_BASE_URL`.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(version) = non_empty_env(VERSION_ENV) {
            self.api_version = version;
        }
        if let Some(base) = non_empty_env(BASE_URL_ENV) {
            self.base_url = base;
        }
        self
    }

    /// Clamp values that would make the client unusable.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.base_url = self.base_url.trim_end_matches('/').to_string();
        self.page_size = self.page_size.clamp(1, 100);
        self.max_concurrency = self.max_concurrency.max(1);
        self.max_attempts = self.max_attempts.max(1);
        self
    }
}

impl Config {
    /// Load the config file from `NVIEW_CONFIG` or the platform config dir.
    ///
    /// A missing file yields defaults; a malformed file is an error.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load and parse a specific config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        toml::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse config {}: {e}", path.display()))
        })
    }

    fn config_path() -> Option<PathBuf> {
        if let Some(explicit) = non_empty_env(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(explicit));
        }
        directories::ProjectDirs::from("dev", "nview", "nview")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

/// Bearer token for the integration.
///
/// `Debug` output is redacted so the token never reaches logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Wrap a token, rejecting blank values.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(Error::Config(format!(
                "{TOKEN_ENV} is empty. Please set it to your Notion integration token."
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Read the token from `NOTION_TOKEN`.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var(TOKEN_ENV).map_err(|_| {
            Error::Config(format!(
                "{TOKEN_ENV} not found. Please set it to your Notion integration token."
            ))
        })?;
        Self::new(token)
    }

    /// The raw token.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(****)")
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_api_limits() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api_version, "2022-06-28");
        assert_eq!(config.page_size, 100);
        assert_eq!(config.max_concurrency, 10);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_rate_limit_delay_grows_linearly() {
        let config = ClientConfig::default();
        assert_eq!(config.rate_limit_delay(1), Duration::from_secs(2));
        assert_eq!(config.rate_limit_delay(2), Duration::from_secs(4));
        assert_eq!(config.transient_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_load_from_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[client]\nmax_concurrency = 4\ntimeout_secs = 5").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.client.max_concurrency, 4);
        assert_eq!(config.client.timeout_secs, 5);
        assert_eq!(config.client.page_size, 100);
    }

    #[test]
    fn test_load_from_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[client\nmax_concurrency = ").unwrap();

        let err = Config::load_from(file.path()).unwrap_err();
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn test_normalized_clamps_values() {
        let config = ClientConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            page_size: 500,
            max_concurrency: 0,
            max_attempts: 0,
            ..ClientConfig::default()
        }
        .normalized();
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.page_size, 100);
        assert_eq!(config.max_concurrency, 1);
        assert_eq!(config.max_attempts, 1);
    }

    #[test]
    fn test_token_rejects_blank() {
        assert!(ApiToken::new("   ").is_err());
        assert_eq!(ApiToken::new(" secret_abc ").unwrap().expose(), "secret_abc");
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = ApiToken::new("secret_abc").unwrap();
        assert!(!format!("{token:?}").contains("secret"));
    }
}
