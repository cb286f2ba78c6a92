//! Password-reset token model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A single-use password-reset token record. Only the token hash is stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResetToken {
    /// Hex SHA-256 of the reset token.
    pub token_hash: String,
    /// The user the token was issued for.
    pub user_id: Uuid,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
    /// IP address that requested the reset.
    pub ip: String,
    /// User-Agent that requested the reset.
    pub user_agent: String,
    /// Issue instant.
    pub created_at: DateTime<Utc>,
}

impl ResetToken {
    /// Check whether the token has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Data required to persist a new reset token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateResetToken {
    /// Hex SHA-256 of the reset token.
    pub token_hash: String,
    /// The user the token is issued for.
    pub user_id: Uuid,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
    /// Requesting IP address.
    pub ip: String,
    /// Requesting User-Agent.
    pub user_agent: String,
    /// Issue instant.
    pub created_at: DateTime<Utc>,
}
