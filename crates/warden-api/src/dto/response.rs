//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use warden_entity::session::SessionIdentity;
use warden_entity::user::UserRole;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// The current session as seen by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    /// User ID.
    pub user_id: Uuid,
    /// Current role.
    pub role: UserRole,
    /// Session expiry.
    pub expires_at: DateTime<Utc>,
}

impl From<SessionIdentity> for SessionResponse {
    fn from(identity: SessionIdentity) -> Self {
        Self {
            user_id: identity.user_id,
            role: identity.role,
            expires_at: identity.expires_at,
        }
    }
}

/// Response for endpoints served with or without a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatusResponse {
    /// Whether a valid session accompanied the request.
    pub authenticated: bool,
    /// The session, when authenticated.
    pub session: Option<SessionResponse>,
}

/// The authenticated user's profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    /// User ID.
    pub id: Uuid,
    /// Email.
    pub email: String,
    /// Current role.
    pub role: UserRole,
    /// Session expiry.
    pub session_expires_at: DateTime<Utc>,
}

/// Number of sessions revoked by a bulk logout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokedResponse {
    /// Sessions revoked.
    pub revoked: u64,
}

/// A freshly issued reset token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetIssuedResponse {
    /// The plaintext token; not retrievable again.
    pub token: String,
    /// Minutes until the token expires.
    pub expires_in_minutes: u64,
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message text.
    pub message: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Crate version.
    pub version: String,
}
