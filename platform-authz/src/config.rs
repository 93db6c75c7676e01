//! Authorization configuration.
//!
//! Loaded from environment variables with defaults suitable for local
//! development.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Authorization checkpoint and policy store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthzConfig {
    /// Log every denied decision at warn level.
    pub log_denials: bool,

    /// Maximum number of policies a single principal may hold.
    pub max_policies_per_principal: usize,
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            log_denials: true,
            max_policies_per_principal: 100,
        }
    }
}

impl AuthzConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `AUTHZ_LOG_DENIALS`: Log denied decisions (default: true)
    /// - `AUTHZ_MAX_POLICIES_PER_PRINCIPAL`: Policy limit per principal (default: 100)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            log_denials: std::env::var("AUTHZ_LOG_DENIALS")
                .map(|s| s != "false" && s != "0")
                .unwrap_or(default.log_denials),
            max_policies_per_principal: std::env::var("AUTHZ_MAX_POLICIES_PER_PRINCIPAL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.max_policies_per_principal),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_policies_per_principal == 0 {
            return Err(ConfigError::InvalidValue {
                key: "AUTHZ_MAX_POLICIES_PER_PRINCIPAL".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
