//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use std::net::SocketAddr;

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `listen_addr` is not a socket address
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    /// - `max_concurrency` is 0
    /// - `batch_timeout_ms` is 0
    /// - an override has an empty domain or selector, or a digit as separator
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Invalid {
                field: "listen_addr".into(),
                reason: format!("'{}' is not a socket address", self.listen_addr),
            });
        }

        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.max_concurrency == 0 {
            return Err(ConfigError::Invalid { field: "max_concurrency".into(), reason: "must be at least 1".into() });
        }

        if self.batch_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid {
                field: "batch_timeout_ms".into(),
                reason: "must be greater than 0 when set".into(),
            });
        }

        for (index, rule) in self.overrides.iter().enumerate() {
            if rule.domain.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field: format!("overrides[{index}].domain"),
                    reason: "must not be empty".into(),
                });
            }
            if rule.selector.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field: format!("overrides[{index}].selector"),
                    reason: "must not be empty".into(),
                });
            }
            if rule.decimal_separator.is_some_and(|c| c.is_ascii_digit()) {
                return Err(ConfigError::Invalid {
                    field: format!("overrides[{index}].decimal_separator"),
                    reason: "must not be a digit".into(),
                });
            }
        }

        if self.default_cache_expiry_minutes == 0 {
            tracing::warn!("default_cache_expiry_minutes is 0; every request without a window will re-fetch");
        }

        Ok(())
    }
}
