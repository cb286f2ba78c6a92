//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;

/// A registered user.
///
/// Users are owned by an external collaborator; Warden only reads them to
/// verify credentials and to resolve the current role on every validation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Login email (lowercased by the collaborator).
    pub email: String,
    /// Encoded scrypt password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Current role.
    #[sqlx(try_from = "String")]
    pub role: UserRole,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}
