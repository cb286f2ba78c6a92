//! Password hashing and reset-token configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Minimum pepper length in bytes.
pub const MIN_PEPPER_LENGTH: usize = 16;

/// Credential configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Server-held HMAC key mixed into every password hash.
    #[serde(default)]
    pub pepper: String,
    /// scrypt CPU/memory cost as a power of two (`N = 2^log_n`).
    #[serde(default = "default_log_n")]
    pub scrypt_log_n: u8,
    /// scrypt block size.
    #[serde(default = "default_r")]
    pub scrypt_r: u32,
    /// scrypt parallelism.
    #[serde(default = "default_p")]
    pub scrypt_p: u32,
    /// Unicode normalization form applied before hashing new passwords.
    #[serde(default = "default_normalization")]
    pub normalization: String,
    /// Minimum accepted password length in characters.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Maximum accepted password length in characters.
    #[serde(default = "default_password_max")]
    pub password_max_length: usize,
    /// Lifetime of a password-reset token in minutes.
    #[serde(default = "default_reset_ttl")]
    pub reset_token_ttl_minutes: u64,
}

impl AuthConfig {
    /// Validate the hashing parameters and pepper.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.pepper.len() < MIN_PEPPER_LENGTH {
            return Err(AppError::configuration(format!(
                "auth.pepper must be at least {MIN_PEPPER_LENGTH} bytes"
            )));
        }
        if self.scrypt_log_n == 0 || self.scrypt_log_n >= 64 {
            return Err(AppError::configuration(
                "auth.scrypt_log_n must be between 1 and 63",
            ));
        }
        if self.scrypt_r == 0 || self.scrypt_p == 0 {
            return Err(AppError::configuration(
                "auth.scrypt_r and auth.scrypt_p must be positive",
            ));
        }
        if !matches!(self.normalization.as_str(), "NFC" | "NFD" | "NFKC" | "NFKD") {
            return Err(AppError::configuration(format!(
                "Unknown normalization form: '{}'. Supported: NFC, NFD, NFKC, NFKD",
                self.normalization
            )));
        }
        if self.password_min_length > self.password_max_length {
            return Err(AppError::configuration(
                "auth.password_min_length exceeds auth.password_max_length",
            ));
        }
        if self.reset_token_ttl_minutes == 0 {
            return Err(AppError::configuration(
                "auth.reset_token_ttl_minutes must be positive",
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("pepper", &"<redacted>")
            .field("scrypt_log_n", &self.scrypt_log_n)
            .field("scrypt_r", &self.scrypt_r)
            .field("scrypt_p", &self.scrypt_p)
            .field("normalization", &self.normalization)
            .field("password_min_length", &self.password_min_length)
            .field("password_max_length", &self.password_max_length)
            .field("reset_token_ttl_minutes", &self.reset_token_ttl_minutes)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            pepper: String::new(),
            scrypt_log_n: default_log_n(),
            scrypt_r: default_r(),
            scrypt_p: default_p(),
            normalization: default_normalization(),
            password_min_length: default_password_min(),
            password_max_length: default_password_max(),
            reset_token_ttl_minutes: default_reset_ttl(),
        }
    }
}

fn default_log_n() -> u8 {
    14
}

fn default_r() -> u32 {
    8
}

fn default_p() -> u32 {
    1
}

fn default_normalization() -> String {
    "NFC".to_string()
}

fn default_password_min() -> usize {
    10
}

fn default_password_max() -> usize {
    256
}

fn default_reset_ttl() -> u64 {
    30
}
