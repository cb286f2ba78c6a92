//! Peppered scrypt password hashing and verification.
//!
//! A password is normalized, keyed with HMAC-SHA256 under the server pepper,
//! and the 32-byte MAC is fed to scrypt with a fresh 16-byte salt. The
//! derivation runs on tokio's blocking pool.

use std::sync::Arc;

use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;
use tracing::debug;

use warden_core::config::AuthConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;

use super::encoded::{CostParams, EncodedHash, NormalizationForm};

/// Salt length for new hashes.
pub const SALT_LEN: usize = 16;

/// Derived key length.
pub const DK_LEN: usize = 32;

/// Upper bound on the memory a stored hash may ask a verification to use.
const MAX_MEMORY_BYTES: u128 = 1 << 30;

/// Handles password hashing and verification.
#[derive(Clone)]
pub struct PasswordHasher {
    pepper: Arc<[u8]>,
    params: CostParams,
    normalization: NormalizationForm,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("params", &self.params)
            .field("normalization", &self.normalization)
            .finish_non_exhaustive()
    }
}

impl PasswordHasher {
    /// Creates a hasher from auth configuration.
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        let normalization = config
            .normalization
            .parse()
            .map_err(|e| AppError::configuration(format!("{e}")))?;
        let params = CostParams {
            log_n: config.scrypt_log_n,
            r: config.scrypt_r,
            p: config.scrypt_p,
        };
        scrypt_params(&params)
            .ok_or_else(|| AppError::configuration("Invalid scrypt cost parameters"))?;

        Ok(Self {
            pepper: Arc::from(config.pepper.as_bytes()),
            params,
            normalization,
        })
    }

    /// Hashes a password on the blocking pool.
    pub async fn hash(&self, password: &str) -> AppResult<String> {
        let hasher = self.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash_blocking(&password)).await?
    }

    /// Verifies a password on the blocking pool.
    ///
    /// Never fails: a malformed hash, a derivation error, or a cancelled
    /// task all count as a mismatch.
    pub async fn verify(&self, password: &str, encoded: &str) -> bool {
        let hasher = self.clone();
        let password = password.to_string();
        let encoded = encoded.to_string();
        tokio::task::spawn_blocking(move || hasher.verify_blocking(&password, &encoded))
            .await
            .unwrap_or(false)
    }

    /// Spend one derivation at the current cost and report a mismatch.
    ///
    /// Used when no account matches a login so the response takes as long
    /// as a wrong password would.
    pub async fn verify_missing(&self, password: &str) -> bool {
        let hasher = self.clone();
        let password = password.to_string();
        let _ = tokio::task::spawn_blocking(move || {
            hasher.derive(hasher.normalization, &hasher.params, &password, &[0u8; SALT_LEN])
        })
        .await;
        false
    }

    /// Hashes a password on the current thread.
    pub fn hash_blocking(&self, password: &str) -> AppResult<String> {
        let mut salt = vec![0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);

        let derived_key = self
            .derive(self.normalization, &self.params, password, &salt)
            .ok_or_else(|| AppError::internal("Password hashing failed"))?;

        Ok(EncodedHash {
            normalization: self.normalization,
            params: self.params,
            salt,
            derived_key,
        }
        .to_string())
    }

    /// Verifies a password against an encoded hash on the current thread.
    pub fn verify_blocking(&self, password: &str, encoded: &str) -> bool {
        let parsed: EncodedHash = match encoded.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, "Rejecting unparseable password hash");
                return false;
            }
        };
        if parsed.salt.len() < SALT_LEN || parsed.derived_key.len() != DK_LEN {
            return false;
        }
        if parsed.params.memory_bytes() > MAX_MEMORY_BYTES {
            debug!(params = %parsed.params, "Rejecting password hash with excessive cost");
            return false;
        }

        match self.derive(parsed.normalization, &parsed.params, password, &parsed.salt) {
            Some(derived) => constant_time_eq(&derived, &parsed.derived_key),
            None => false,
        }
    }

    /// Whether an encoded hash was produced with different settings than the
    /// current ones and should be replaced after the next successful login.
    pub fn needs_rehash(&self, encoded: &str) -> bool {
        match encoded.parse::<EncodedHash>() {
            Ok(parsed) => parsed.params != self.params || parsed.normalization != self.normalization,
            Err(_) => true,
        }
    }

    fn derive(
        &self,
        normalization: NormalizationForm,
        params: &CostParams,
        password: &str,
        salt: &[u8],
    ) -> Option<Vec<u8>> {
        let normalized = normalization.apply(password);

        let mut mac = Hmac::<Sha256>::new_from_slice(&self.pepper).ok()?;
        mac.update(normalized.as_bytes());
        let prehash = mac.finalize().into_bytes();

        let scrypt_params = scrypt_params(params)?;
        let mut output = vec![0u8; DK_LEN];
        scrypt::scrypt(&prehash, salt, &scrypt_params, &mut output).ok()?;
        Some(output)
    }
}

fn scrypt_params(params: &CostParams) -> Option<scrypt::Params> {
    scrypt::Params::new(params.log_n, params.r, params.p, DK_LEN).ok()
}
