//! Session lifetime configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Longest accepted cleanup period, one year in minutes.
const MAX_CLEANUP_INTERVAL_MINUTES: u64 = 60 * 24 * 365;

/// Session management configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime from issuance or last renewal, in seconds.
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    /// Trailing part of the lifetime in which validation slides the expiry
    /// forward, in seconds. Must not exceed `ttl_seconds`.
    #[serde(default = "default_renewal_window")]
    pub renewal_window_seconds: u64,
    /// Name of the session cookie.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Interval for expired session and reset-token cleanup in minutes.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_minutes: u64,
}

impl SessionConfig {
    /// Period of the background cleanup task.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_minutes.saturating_mul(60))
    }

    /// Validate lifetime settings.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.ttl_seconds == 0 {
            return Err(AppError::configuration("session.ttl_seconds must be positive"));
        }
        if self.renewal_window_seconds > self.ttl_seconds {
            return Err(AppError::configuration(
                "session.renewal_window_seconds must not exceed session.ttl_seconds",
            ));
        }
        if self.cleanup_interval_minutes == 0
            || self.cleanup_interval_minutes > MAX_CLEANUP_INTERVAL_MINUTES
        {
            return Err(AppError::configuration(format!(
                "session.cleanup_interval_minutes must be between 1 and {MAX_CLEANUP_INTERVAL_MINUTES}"
            )));
        }
        if self.cookie_name.is_empty() {
            return Err(AppError::configuration("session.cookie_name must not be empty"));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl(),
            renewal_window_seconds: default_renewal_window(),
            cookie_name: default_cookie_name(),
            cleanup_interval_minutes: default_cleanup_interval(),
        }
    }
}

fn default_ttl() -> u64 {
    60 * 60 * 24 * 15
}

fn default_renewal_window() -> u64 {
    60 * 60 * 24 * 5
}

fn default_cookie_name() -> String {
    "__Secure-sid".to_string()
}

fn default_cleanup_interval() -> u64 {
    15
}
