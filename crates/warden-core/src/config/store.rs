//! Persistence backend configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Top-level persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store provider type: `"memory"` or `"postgres"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// In-memory store configuration.
    #[serde(default)]
    pub memory: MemoryStoreConfig,
}

impl StoreConfig {
    /// Validate the provider name.
    pub fn validate(&self) -> Result<(), AppError> {
        match self.provider.as_str() {
            "memory" | "postgres" => Ok(()),
            other => Err(AppError::configuration(format!(
                "Unknown store provider: '{other}'. Supported: memory, postgres"
            ))),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            memory: MemoryStoreConfig::default(),
        }
    }
}

/// In-memory store capacity limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStoreConfig {
    /// Maximum number of session records held at once.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// Maximum number of reset-token records held at once.
    #[serde(default = "default_max_reset_tokens")]
    pub max_reset_tokens: usize,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            max_reset_tokens: default_max_reset_tokens(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_max_sessions() -> usize {
    100_000
}

fn default_max_reset_tokens() -> usize {
    10_000
}
