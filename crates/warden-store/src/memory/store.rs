//! In-memory implementation of every store trait using dashmap.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, warn};
use uuid::Uuid;

use warden_core::config::MemoryStoreConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::{ResetTokenStore, SessionStore, UserStore};
use warden_entity::reset::{CreateResetToken, ResetToken};
use warden_entity::session::{CreateSession, Session};
use warden_entity::user::User;

/// In-memory session, reset-token, and user store.
///
/// Each map entry is updated under its shard lock, which makes every single
/// key operation atomic. The maps are bounded: when full, expired records are
/// purged first and the insert fails if that frees nothing. Live sessions
/// are never evicted.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    sessions: Arc<DashMap<String, Session>>,
    reset_tokens: Arc<DashMap<String, ResetToken>>,
    users: Arc<DashMap<Uuid, User>>,
    max_sessions: usize,
    max_reset_tokens: usize,
}

impl MemoryStore {
    /// Create a new in-memory store from configuration.
    pub fn new(config: &MemoryStoreConfig) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            reset_tokens: Arc::new(DashMap::new()),
            users: Arc::new(DashMap::new()),
            max_sessions: config.max_sessions,
            max_reset_tokens: config.max_reset_tokens,
        }
    }

    /// Add or replace a user record.
    pub fn insert_user(&self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Remove a user record, returning it if present.
    pub fn remove_user(&self, id: Uuid) -> Option<User> {
        self.users.remove(&id).map(|(_, user)| user)
    }

    /// Number of session records currently held, including revoked ones.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn purge_sessions(&self, now: DateTime<Utc>) -> u64 {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| !session.revoked && !session.is_expired_at(now));
        before.saturating_sub(self.sessions.len()) as u64
    }

    fn purge_reset_tokens(&self, now: DateTime<Utc>) -> u64 {
        let before = self.reset_tokens.len();
        self.reset_tokens.retain(|_, token| !token.is_expired_at(now));
        before.saturating_sub(self.reset_tokens.len()) as u64
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn insert_session(&self, data: &CreateSession) -> AppResult<Session> {
        if self.sessions.len() >= self.max_sessions && !self.sessions.contains_key(&data.sid_hash) {
            let purged = self.purge_sessions(Utc::now());
            debug!(purged, "Session store full, purged expired sessions");
            if self.sessions.len() >= self.max_sessions {
                warn!(capacity = self.max_sessions, "Session store at capacity");
                return Err(AppError::internal("Session store capacity exceeded"));
            }
        }

        let session = Session {
            sid_hash: data.sid_hash.clone(),
            user_id: data.user_id,
            ip: data.ip.clone(),
            user_agent: data.user_agent.clone(),
            expires_at: data.expires_at,
            revoked: false,
            created_at: data.created_at,
        };
        self.sessions
            .insert(session.sid_hash.clone(), session.clone());
        Ok(session)
    }

    async fn find_session(&self, sid_hash: &str) -> AppResult<Option<Session>> {
        Ok(self.sessions.get(sid_hash).map(|entry| entry.value().clone()))
    }

    async fn extend_session(
        &self,
        sid_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<Session>> {
        Ok(self.sessions.get_mut(sid_hash).map(|mut entry| {
            let session = entry.value_mut();
            if !session.revoked && expires_at > session.expires_at {
                session.expires_at = expires_at;
            }
            session.clone()
        }))
    }

    async fn revoke_session(&self, sid_hash: &str) -> AppResult<bool> {
        Ok(self
            .sessions
            .get_mut(sid_hash)
            .map(|mut entry| entry.value_mut().revoked = true)
            .is_some())
    }

    async fn revoke_user_sessions(&self, user_id: Uuid) -> AppResult<u64> {
        let mut revoked = 0;
        for mut entry in self.sessions.iter_mut() {
            let session = entry.value_mut();
            if session.user_id == user_id && !session.revoked {
                session.revoked = true;
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> AppResult<u64> {
        Ok(self.purge_sessions(now))
    }
}

#[async_trait]
impl ResetTokenStore for MemoryStore {
    async fn insert_reset_token(&self, data: &CreateResetToken) -> AppResult<ResetToken> {
        if self.reset_tokens.len() >= self.max_reset_tokens {
            self.purge_reset_tokens(Utc::now());
            if self.reset_tokens.len() >= self.max_reset_tokens {
                warn!(capacity = self.max_reset_tokens, "Reset token store at capacity");
                return Err(AppError::internal("Reset token store capacity exceeded"));
            }
        }

        let token = ResetToken {
            token_hash: data.token_hash.clone(),
            user_id: data.user_id,
            expires_at: data.expires_at,
            ip: data.ip.clone(),
            user_agent: data.user_agent.clone(),
            created_at: data.created_at,
        };
        self.reset_tokens
            .insert(token.token_hash.clone(), token.clone());
        Ok(token)
    }

    async fn take_reset_token(&self, token_hash: &str) -> AppResult<Option<ResetToken>> {
        Ok(self.reset_tokens.remove(token_hash).map(|(_, token)| token))
    }

    async fn delete_user_reset_tokens(&self, user_id: Uuid) -> AppResult<u64> {
        let before = self.reset_tokens.len();
        self.reset_tokens.retain(|_, token| token.user_id != user_id);
        Ok(before.saturating_sub(self.reset_tokens.len()) as u64)
    }

    async fn purge_expired_reset_tokens(&self, now: DateTime<Utc>) -> AppResult<u64> {
        Ok(self.purge_reset_tokens(now))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.value().email == email)
            .map(|entry| entry.value().clone()))
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        match self.users.get_mut(&id) {
            Some(mut entry) => {
                entry.value_mut().password_hash = password_hash.to_string();
                Ok(())
            }
            None => Err(AppError::not_found(format!("User {id} not found"))),
        }
    }
}
