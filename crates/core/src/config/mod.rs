//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PRICEWATCH_*)
//! 2. TOML config file (if PRICEWATCH_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Hand-tuned extraction for one site.
///
/// The selector is tried before the generic `price` class/id scan for
/// `domain` and its subdomains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceOverride {
    /// Domain the override applies to, without a leading `www.`.
    pub domain: String,

    /// CSS selector for the element holding the price.
    pub selector: String,

    /// Decimal separator used by the site, e.g. `,` for `1.299,99`.
    #[serde(default)]
    pub decimal_separator: Option<char>,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PRICEWATCH_*)
/// 2. TOML config file (if PRICEWATCH_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Address the HTTP server binds to.
    ///
    /// Set via PRICEWATCH_LISTEN_ADDR environment variable.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Path to a SQLite file for durable caching.
    ///
    /// Set via PRICEWATCH_DB_PATH. When unset the cache lives in memory
    /// and is empty on every start.
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via PRICEWATCH_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via PRICEWATCH_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via PRICEWATCH_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of redirects followed per fetch.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Cache window applied when a request does not send `cacheExpiryMinutes`.
    #[serde(default = "default_cache_expiry_minutes")]
    pub default_cache_expiry_minutes: u64,

    /// Maximum number of URLs of one batch scraped at the same time.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Optional deadline for a whole batch in milliseconds.
    ///
    /// URLs still running at the deadline are reported as failed.
    #[serde(default)]
    pub batch_timeout_ms: Option<u64>,

    /// Optional file the `/export` CSV is also written to.
    #[serde(default)]
    pub export_path: Option<PathBuf>,

    /// Per-domain extraction overrides, tried in order.
    #[serde(default)]
    pub overrides: Vec<PriceOverride>,
}

fn default_listen_addr() -> String {
    "127.0.0.1:3000".into()
}

fn default_user_agent() -> String {
    "pricewatch/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_redirects() -> usize {
    5
}

fn default_cache_expiry_minutes() -> u64 {
    60
}

fn default_max_concurrency() -> usize {
    16
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            db_path: None,
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            max_redirects: default_max_redirects(),
            default_cache_expiry_minutes: default_cache_expiry_minutes(),
            max_concurrency: default_max_concurrency(),
            batch_timeout_ms: None,
            export_path: None,
            overrides: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Batch deadline as Duration, if one is configured.
    pub fn batch_timeout(&self) -> Option<Duration> {
        self.batch_timeout_ms.map(Duration::from_millis)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PRICEWATCH_`
    /// 2. TOML file from `PRICEWATCH_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PRICEWATCH_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PRICEWATCH_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        Self::from_figment(figment)
    }

    /// Extract and validate a configuration from a prepared figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
