//! Session repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_core::traits::SessionStore;
use warden_entity::session::{CreateSession, Session};

const SESSION_COLUMNS: &str = "sid_hash, user_id, ip, user_agent, expires_at, revoked, created_at";

/// PostgreSQL storage for login sessions.
#[derive(Debug, Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    /// Create a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionRepository {
    async fn insert_session(&self, data: &CreateSession) -> AppResult<Session> {
        sqlx::query_as::<_, Session>(&format!(
            "INSERT INTO sessions (sid_hash, user_id, ip, user_agent, expires_at, revoked, created_at) \
             VALUES ($1, $2, $3, $4, $5, FALSE, $6) \
             ON CONFLICT (sid_hash) DO UPDATE SET \
                user_id = EXCLUDED.user_id, ip = EXCLUDED.ip, user_agent = EXCLUDED.user_agent, \
                expires_at = EXCLUDED.expires_at, revoked = FALSE, created_at = EXCLUDED.created_at \
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(&data.sid_hash)
        .bind(data.user_id)
        .bind(&data.ip)
        .bind(&data.user_agent)
        .bind(data.expires_at)
        .bind(data.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create session", e))
    }

    async fn find_session(&self, sid_hash: &str) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE sid_hash = $1"
        ))
        .bind(sid_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find session", e))
    }

    async fn extend_session(
        &self,
        sid_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<Session>> {
        // GREATEST keeps a racing renewal from moving the expiry backwards.
        sqlx::query(
            "UPDATE sessions SET expires_at = GREATEST(expires_at, $2) \
             WHERE sid_hash = $1 AND revoked = FALSE",
        )
        .bind(sid_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to extend session", e))?;

        self.find_session(sid_hash).await
    }

    async fn revoke_session(&self, sid_hash: &str) -> AppResult<bool> {
        let result = sqlx::query("UPDATE sessions SET revoked = TRUE WHERE sid_hash = $1")
            .bind(sid_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to revoke session", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn revoke_user_sessions(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE sessions SET revoked = TRUE WHERE user_id = $1 AND revoked = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to revoke user sessions", e)
        })?;
        Ok(result.rows_affected())
    }

    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1 OR revoked = TRUE")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to purge expired sessions", e)
            })?;
        Ok(result.rows_affected())
    }
}
