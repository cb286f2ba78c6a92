//! Password-reset token repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_core::traits::ResetTokenStore;
use warden_entity::reset::{CreateResetToken, ResetToken};

/// PostgreSQL storage for password-reset tokens.
#[derive(Debug, Clone)]
pub struct PgResetTokenRepository {
    pool: PgPool,
}

impl PgResetTokenRepository {
    /// Create a new reset-token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResetTokenStore for PgResetTokenRepository {
    async fn insert_reset_token(&self, data: &CreateResetToken) -> AppResult<ResetToken> {
        sqlx::query_as::<_, ResetToken>(
            "INSERT INTO password_resets (token_hash, user_id, expires_at, ip, user_agent, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING token_hash, user_id, expires_at, ip, user_agent, created_at",
        )
        .bind(&data.token_hash)
        .bind(data.user_id)
        .bind(data.expires_at)
        .bind(&data.ip)
        .bind(&data.user_agent)
        .bind(data.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create reset token", e))
    }

    async fn take_reset_token(&self, token_hash: &str) -> AppResult<Option<ResetToken>> {
        sqlx::query_as::<_, ResetToken>(
            "DELETE FROM password_resets WHERE token_hash = $1 \
             RETURNING token_hash, user_id, expires_at, ip, user_agent, created_at",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to take reset token", e))
    }

    async fn delete_user_reset_tokens(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM password_resets WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete reset tokens", e)
            })?;
        Ok(result.rows_affected())
    }

    async fn purge_expired_reset_tokens(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM password_resets WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to purge reset tokens", e)
            })?;
        Ok(result.rows_affected())
    }
}
