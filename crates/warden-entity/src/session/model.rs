//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::user::UserRole;

/// A persisted login session.
///
/// Only the one-way hash of the bearer token is stored. `expires_at` only
/// ever moves forward, and a revoked session is never valid again.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Hex SHA-256 of the session token (primary key).
    pub sid_hash: String,
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// IP address from which the session was created.
    pub ip: String,
    /// User-Agent header value at login.
    pub user_agent: String,
    /// Absolute expiry instant.
    pub expires_at: DateTime<Utc>,
    /// Terminal revocation flag.
    pub revoked: bool,
    /// When the session was created (login time).
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Check whether the session has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Time left before expiry, clamped at zero.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> chrono::Duration {
        (self.expires_at - now).max(chrono::Duration::zero())
    }
}

/// Data required to create a new session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSession {
    /// Hex SHA-256 of the session token.
    pub sid_hash: String,
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// IP address of the client.
    pub ip: String,
    /// User-Agent header.
    pub user_agent: String,
    /// When the session expires.
    pub expires_at: DateTime<Utc>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

/// The identity resolved from a valid session, attached to guarded requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    /// The authenticated user.
    pub user_id: Uuid,
    /// The user's role as resolved during this validation.
    pub role: UserRole,
    /// Session expiry after any renewal applied by this validation.
    pub expires_at: DateTime<Utc>,
}
