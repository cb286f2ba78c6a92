//! Password-reset token issuance and consumption.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use warden_core::config::AuthConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::{ResetTokenStore, UserStore};
use warden_entity::reset::{CreateResetToken, ResetToken};

use crate::session::SessionManager;
use crate::token::{generate_token, sha256_hex};

/// Issues and consumes password-reset tokens.
///
/// Several unconsumed tokens for the same user may coexist. Consuming any
/// one of them deletes all of them and revokes every session of the user.
#[derive(Debug, Clone)]
pub struct ResetTokenManager {
    tokens: Arc<dyn ResetTokenStore>,
    users: Arc<dyn UserStore>,
    sessions: SessionManager,
    ttl: Duration,
}

impl ResetTokenManager {
    /// Creates a reset-token manager.
    pub fn new(
        tokens: Arc<dyn ResetTokenStore>,
        users: Arc<dyn UserStore>,
        sessions: SessionManager,
        config: &AuthConfig,
    ) -> Self {
        let minutes = i64::try_from(config.reset_token_ttl_minutes).unwrap_or(i64::MAX);
        Self {
            tokens,
            users,
            sessions,
            ttl: Duration::minutes(minutes.min(i64::MAX / 60_000)),
        }
    }

    /// Issue a reset token for `user_id`. Only its hash is stored.
    pub async fn issue(&self, user_id: Uuid, ip: &str, user_agent: &str) -> AppResult<String> {
        self.issue_at(user_id, ip, user_agent, Utc::now()).await
    }

    /// Issue a reset token as of `now`.
    pub async fn issue_at(
        &self,
        user_id: Uuid,
        ip: &str,
        user_agent: &str,
        now: DateTime<Utc>,
    ) -> AppResult<String> {
        let token = generate_token();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::internal("Reset token expiry out of range"))?;

        self.tokens
            .insert_reset_token(&CreateResetToken {
                token_hash: sha256_hex(&token),
                user_id,
                expires_at,
                ip: ip.to_string(),
                user_agent: user_agent.to_string(),
                created_at: now,
            })
            .await?;

        info!(user_id = %user_id, expires_at = %expires_at, "Password reset token issued");
        Ok(token)
    }

    /// Consume a reset token.
    ///
    /// Returns the owning user on the first successful call. Unknown and
    /// expired tokens both yield `None`.
    pub async fn consume(&self, token: &str) -> AppResult<Option<Uuid>> {
        self.consume_at(token, Utc::now()).await
    }

    /// Consume a reset token as of `now`.
    pub async fn consume_at(&self, token: &str, now: DateTime<Utc>) -> AppResult<Option<Uuid>> {
        let Some(record) = self.take_live(token, now).await? else {
            return Ok(None);
        };
        self.finish(record.user_id).await?;
        Ok(Some(record.user_id))
    }

    /// Consume a reset token and store `password_hash` for its user.
    ///
    /// The password is written before any session is revoked. If the write
    /// fails the token is put back so the user can retry with it.
    pub async fn reset_password(&self, token: &str, password_hash: &str) -> AppResult<Option<Uuid>> {
        self.reset_password_at(token, password_hash, Utc::now()).await
    }

    /// Reset a password as of `now`.
    pub async fn reset_password_at(
        &self,
        token: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Uuid>> {
        let Some(record) = self.take_live(token, now).await? else {
            return Ok(None);
        };

        if let Err(e) = self
            .users
            .update_password_hash(record.user_id, password_hash)
            .await
        {
            self.restore(&record).await;
            return Err(e);
        }

        self.finish(record.user_id).await?;
        Ok(Some(record.user_id))
    }

    /// Remove the token and return it if it was still live at `now`.
    async fn take_live(&self, token: &str, now: DateTime<Utc>) -> AppResult<Option<ResetToken>> {
        let Some(record) = self.tokens.take_reset_token(&sha256_hex(token)).await? else {
            debug!("Reset token rejected");
            return Ok(None);
        };
        if record.is_expired_at(now) {
            debug!(user_id = %record.user_id, "Expired reset token rejected");
            return Ok(None);
        }
        Ok(Some(record))
    }

    /// Revoke every session and drop the remaining reset tokens of a user.
    async fn finish(&self, user_id: Uuid) -> AppResult<()> {
        self.sessions.invalidate_all(user_id).await?;
        let deleted = self.tokens.delete_user_reset_tokens(user_id).await?;

        info!(
            user_id = %user_id,
            other_tokens_deleted = deleted,
            "Password reset token consumed"
        );
        Ok(())
    }

    async fn restore(&self, record: &ResetToken) {
        let restored = self
            .tokens
            .insert_reset_token(&CreateResetToken {
                token_hash: record.token_hash.clone(),
                user_id: record.user_id,
                expires_at: record.expires_at,
                ip: record.ip.clone(),
                user_agent: record.user_agent.clone(),
                created_at: record.created_at,
            })
            .await;
        if let Err(e) = restored {
            warn!(user_id = %record.user_id, error = %e, "Failed to restore reset token");
        }
    }
}
