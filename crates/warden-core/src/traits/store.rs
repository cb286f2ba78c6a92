//! Persistence traits for sessions, reset tokens, and users.
//!
//! The managers in `warden-auth` only ever talk to these traits. Every
//! implementation must make each method atomic with respect to concurrent
//! callers on the same key.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use warden_entity::reset::{CreateResetToken, ResetToken};
use warden_entity::session::{CreateSession, Session};
use warden_entity::user::User;

use crate::result::AppResult;

/// Keyed storage of session records by `sid_hash`.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a session, replacing any record with the same `sid_hash`.
    async fn insert_session(&self, session: &CreateSession) -> AppResult<Session>;

    /// Look up a session by token hash, revoked or not.
    async fn find_session(&self, sid_hash: &str) -> AppResult<Option<Session>>;

    /// Move `expires_at` forward to `expires_at` if it is later than the
    /// stored value and the session is not revoked.
    ///
    /// Returns the record as it stands after the update, or `None` if no
    /// session exists under `sid_hash`.
    async fn extend_session(
        &self,
        sid_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<Session>>;

    /// Mark a single session revoked. Returns `false` if it did not exist.
    async fn revoke_session(&self, sid_hash: &str) -> AppResult<bool>;

    /// Revoke every session of a user. Returns the number newly revoked.
    async fn revoke_user_sessions(&self, user_id: Uuid) -> AppResult<u64>;

    /// Delete sessions that expired before `now` or were revoked.
    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// Keyed storage of password-reset tokens by `token_hash`.
#[async_trait]
pub trait ResetTokenStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a new reset token.
    async fn insert_reset_token(&self, token: &CreateResetToken) -> AppResult<ResetToken>;

    /// Atomically remove and return the token stored under `token_hash`.
    ///
    /// Two concurrent calls with the same hash never both observe the record.
    async fn take_reset_token(&self, token_hash: &str) -> AppResult<Option<ResetToken>>;

    /// Delete every outstanding reset token of a user.
    async fn delete_user_reset_tokens(&self, user_id: Uuid) -> AppResult<u64>;

    /// Delete reset tokens that expired at or before `now`.
    async fn purge_expired_reset_tokens(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// Read access to users, plus the password-hash write used by resets.
#[async_trait]
pub trait UserStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a user by ID.
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by (lowercased) email.
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Replace a user's encoded password hash.
    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> AppResult<()>;
}
