//! Session manager: create, validate with sliding renewal, and revoke.
//!
//! The bearer token (`sid`) is returned to the caller exactly once inside
//! the cookie from [`SessionManager::create`]; only its SHA-256 is stored.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use warden_core::config::SessionConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::{SessionStore, UserStore};
use warden_entity::session::{CreateSession, SessionIdentity};

use super::cookie::SessionCookie;
use crate::token::{generate_token, sha256_hex};

/// Why a session token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// No session is stored under the token hash.
    Unknown,
    /// The session was revoked earlier.
    Revoked,
    /// The session reached `expires_at` and has now been revoked.
    Expired,
    /// The owning user no longer exists; the session has been revoked.
    UserMissing,
}

impl InvalidReason {
    /// Short label for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Revoked => "revoked",
            Self::Expired => "expired",
            Self::UserMissing => "user_missing",
        }
    }
}

/// Outcome of validating a session token.
///
/// Both variants carry the `Set-Cookie` value that must be sent back: a
/// refreshed cookie when valid, a clearing cookie otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// The session is live.
    Valid {
        /// Identity resolved during this validation.
        session: SessionIdentity,
        /// Cookie with the remaining lifetime as `Max-Age`.
        cookie: String,
    },
    /// The session must not be honoured.
    Invalid {
        /// Why the token was rejected.
        reason: InvalidReason,
        /// Clearing cookie.
        cookie: String,
    },
}

impl Validation {
    /// The `Set-Cookie` value to forward to the client.
    pub fn cookie(&self) -> &str {
        match self {
            Self::Valid { cookie, .. } | Self::Invalid { cookie, .. } => cookie,
        }
    }

    /// The resolved identity, if valid.
    pub fn identity(&self) -> Option<&SessionIdentity> {
        match self {
            Self::Valid { session, .. } => Some(session),
            Self::Invalid { .. } => None,
        }
    }
}

/// A freshly created session.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    /// The plaintext bearer token.
    pub sid: String,
    /// `Set-Cookie` value carrying the token.
    pub cookie: String,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}

/// Manages the session lifecycle against a [`SessionStore`].
#[derive(Debug, Clone)]
pub struct SessionManager {
    sessions: Arc<dyn SessionStore>,
    users: Arc<dyn UserStore>,
    ttl: Duration,
    renewal_window: Duration,
    cookie: SessionCookie,
}

impl SessionManager {
    /// Creates a session manager.
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        users: Arc<dyn UserStore>,
        config: &SessionConfig,
    ) -> Self {
        Self {
            sessions,
            users,
            ttl: seconds(config.ttl_seconds),
            renewal_window: seconds(config.renewal_window_seconds),
            cookie: SessionCookie::new(config.cookie_name.clone()),
        }
    }

    /// The session cookie name.
    pub fn cookie_name(&self) -> &str {
        self.cookie.name()
    }

    /// A cookie that clears the session on the client.
    pub fn clear_cookie(&self) -> String {
        self.cookie.clear()
    }

    /// Issue a new session for `user_id`.
    pub async fn create(&self, user_id: Uuid, ip: &str, user_agent: &str) -> AppResult<IssuedSession> {
        self.create_at(user_id, ip, user_agent, Utc::now()).await
    }

    /// Issue a new session as of `now`.
    pub async fn create_at(
        &self,
        user_id: Uuid,
        ip: &str,
        user_agent: &str,
        now: DateTime<Utc>,
    ) -> AppResult<IssuedSession> {
        let sid = generate_token();
        let expires_at = self.expiry_from(now)?;

        let session = self
            .sessions
            .insert_session(&CreateSession {
                sid_hash: sha256_hex(&sid),
                user_id,
                ip: ip.to_string(),
                user_agent: user_agent.to_string(),
                expires_at,
                created_at: now,
            })
            .await?;

        info!(
            user_id = %user_id,
            sid = short_hash(&session.sid_hash),
            expires_at = %expires_at,
            "Session created"
        );

        Ok(IssuedSession {
            cookie: self.cookie.issue(&sid, self.ttl.num_seconds()),
            sid,
            expires_at,
        })
    }

    /// Validate a session token, renewing it when inside the renewal window.
    ///
    /// Storage failures propagate; they are never reported as a valid session.
    pub async fn validate(&self, sid: &str) -> AppResult<Validation> {
        self.validate_at(sid, Utc::now()).await
    }

    /// Validate a session token as of `now`.
    pub async fn validate_at(&self, sid: &str, now: DateTime<Utc>) -> AppResult<Validation> {
        let sid_hash = sha256_hex(sid);

        let Some(session) = self.sessions.find_session(&sid_hash).await? else {
            return Ok(self.invalid(&sid_hash, InvalidReason::Unknown));
        };
        if session.revoked {
            return Ok(self.invalid(&sid_hash, InvalidReason::Revoked));
        }

        if session.is_expired_at(now) {
            self.sessions.revoke_session(&sid_hash).await?;
            return Ok(self.invalid(&sid_hash, InvalidReason::Expired));
        }

        let mut expires_at = session.expires_at;
        if session.remaining_at(now) <= self.renewal_window {
            let target = self.expiry_from(now)?;
            match self.sessions.extend_session(&sid_hash, target).await? {
                Some(updated) if !updated.revoked => {
                    expires_at = updated.expires_at;
                    debug!(sid = short_hash(&sid_hash), expires_at = %expires_at, "Session renewed");
                }
                // Revoked or removed between the read and the renewal.
                Some(_) => return Ok(self.invalid(&sid_hash, InvalidReason::Revoked)),
                None => return Ok(self.invalid(&sid_hash, InvalidReason::Unknown)),
            }
        }

        let Some(user) = self.users.find_user(session.user_id).await? else {
            self.sessions.revoke_session(&sid_hash).await?;
            warn!(user_id = %session.user_id, "Session owner no longer exists, session revoked");
            return Ok(self.invalid(&sid_hash, InvalidReason::UserMissing));
        };

        Ok(Validation::Valid {
            cookie: self.cookie.issue(sid, (expires_at - now).num_seconds()),
            session: SessionIdentity {
                user_id: session.user_id,
                role: user.role,
                expires_at,
            },
        })
    }

    /// Log out. Always returns a clearing cookie.
    ///
    /// Revocation is best-effort: storage errors are logged and swallowed.
    pub async fn invalidate(&self, sid: Option<&str>) -> String {
        if let Some(sid) = sid {
            let sid_hash = sha256_hex(sid);
            match self.sessions.revoke_session(&sid_hash).await {
                Ok(true) => info!(sid = short_hash(&sid_hash), "Session revoked on logout"),
                Ok(false) => debug!("Logout for unknown session"),
                Err(e) => warn!(error = %e, "Failed to revoke session on logout"),
            }
        }
        self.cookie.clear()
    }

    /// Revoke every session of a user. Returns the number revoked.
    pub async fn invalidate_all(&self, user_id: Uuid) -> AppResult<u64> {
        let revoked = self.sessions.revoke_user_sessions(user_id).await?;
        info!(user_id = %user_id, revoked, "All user sessions revoked");
        Ok(revoked)
    }

    fn invalid(&self, sid_hash: &str, reason: InvalidReason) -> Validation {
        debug!(sid = short_hash(sid_hash), reason = reason.as_str(), "Session rejected");
        Validation::Invalid {
            reason,
            cookie: self.cookie.clear(),
        }
    }

    fn expiry_from(&self, now: DateTime<Utc>) -> AppResult<DateTime<Utc>> {
        now.checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::internal("Session expiry out of range"))
    }
}

fn seconds(value: u64) -> Duration {
    Duration::seconds(i64::try_from(value).unwrap_or(i64::MAX).min(i64::MAX / 1000))
}

/// Leading characters of a token hash, enough to correlate log lines.
fn short_hash(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::config::MemoryStoreConfig;
    use warden_entity::session::Session;
    use warden_entity::user::{User, UserRole};
    use warden_store::memory::MemoryStore;

    const DAY: i64 = 86_400;

    fn setup(renewal_window_seconds: u64) -> (SessionManager, MemoryStore, Uuid) {
        let store = MemoryStore::new(&MemoryStoreConfig::default());
        let user_id = Uuid::new_v4();
        store.insert_user(User {
            id: user_id,
            email: "reader@example.com".to_string(),
            password_hash: String::new(),
            role: UserRole::Editor,
            created_at: Utc::now(),
        });

        let config = SessionConfig {
            renewal_window_seconds,
            ..SessionConfig::default()
        };
        let shared = Arc::new(store.clone());
        let manager = SessionManager::new(shared.clone(), shared, &config);
        (manager, store, user_id)
    }

    fn max_age(cookie: &str) -> i64 {
        cookie
            .split("; ")
            .find_map(|part| part.strip_prefix("Max-Age="))
            .and_then(|v| v.parse().ok())
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_stores_only_hash() {
        let (manager, store, user_id) = setup(5 * DAY as u64);
        let issued = manager.create(user_id, "10.0.0.1", "agent").await.unwrap();

        assert!(issued.cookie.starts_with(&format!("__Secure-sid={}; ", issued.sid)));
        assert_eq!(max_age(&issued.cookie), 15 * DAY);
        assert!(store.find_session(&issued.sid).await.unwrap().is_none());
        let stored = store
            .find_session(&sha256_hex(&issued.sid))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.user_id, user_id);
        assert_eq!(stored.expires_at, issued.expires_at);
    }

    #[tokio::test]
    async fn test_expiry_boundary_then_revoked() {
        let (manager, store, user_id) = setup(0);
        let issued = manager.create(user_id, "10.0.0.1", "agent").await.unwrap();

        let before = issued.expires_at - Duration::milliseconds(1);
        let result = manager.validate_at(&issued.sid, before).await.unwrap();
        let identity = result.identity().unwrap();
        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.role, UserRole::Editor);

        let result = manager
            .validate_at(&issued.sid, issued.expires_at)
            .await
            .unwrap();
        assert!(matches!(
            result,
            Validation::Invalid {
                reason: InvalidReason::Expired,
                ..
            }
        ));
        assert_eq!(max_age(result.cookie()), 0);

        let stored = store
            .find_session(&sha256_hex(&issued.sid))
            .await
            .unwrap()
            .unwrap();
        assert!(stored.revoked);

        let again = manager.validate_at(&issued.sid, before).await.unwrap();
        assert!(matches!(
            again,
            Validation::Invalid {
                reason: InvalidReason::Revoked,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_renewal_inside_window() {
        let (manager, store, user_id) = setup(5 * DAY as u64);
        let created = Utc::now();
        let issued = manager
            .create_at(user_id, "10.0.0.1", "agent", created)
            .await
            .unwrap();
        let sid_hash = sha256_hex(&issued.sid);

        let outside = created + Duration::days(1);
        let result = manager.validate_at(&issued.sid, outside).await.unwrap();
        assert_eq!(result.identity().unwrap().expires_at, issued.expires_at);
        let unrenewed = max_age(result.cookie());
        assert_eq!(unrenewed, 14 * DAY);

        let inside = created + Duration::days(11);
        let result = manager.validate_at(&issued.sid, inside).await.unwrap();
        let renewed_expiry = result.identity().unwrap().expires_at;
        assert_eq!(renewed_expiry, inside + Duration::days(15));
        assert_eq!(max_age(result.cookie()), 15 * DAY);
        assert!(max_age(result.cookie()) > 4 * DAY);

        let stored = store.find_session(&sid_hash).await.unwrap().unwrap();
        assert_eq!(stored.sid_hash, sid_hash);
        assert_eq!(stored.expires_at, renewed_expiry);
    }

    #[tokio::test]
    async fn test_stale_renewal_never_shortens() {
        let (manager, store, user_id) = setup(20 * DAY as u64);
        let created = Utc::now();
        let issued = manager
            .create_at(user_id, "10.0.0.1", "agent", created)
            .await
            .unwrap();

        let later = created + Duration::days(2);
        manager.validate_at(&issued.sid, later).await.unwrap();
        let result = manager
            .validate_at(&issued.sid, created + Duration::days(1))
            .await
            .unwrap();

        let expected = later + Duration::days(15);
        assert_eq!(result.identity().unwrap().expires_at, expected);
        let stored = store
            .find_session(&sha256_hex(&issued.sid))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.expires_at, expected);
    }

    #[tokio::test]
    async fn test_role_is_resolved_on_every_validation() {
        let (manager, store, user_id) = setup(5 * DAY as u64);
        let issued = manager.create(user_id, "10.0.0.1", "agent").await.unwrap();

        let mut user = store.find_user(user_id).await.unwrap().unwrap();
        user.role = UserRole::Admin;
        store.insert_user(user);

        let result = manager.validate(&issued.sid).await.unwrap();
        assert_eq!(result.identity().unwrap().role, UserRole::Admin);
    }

    #[tokio::test]
    async fn test_missing_user_revokes_session() {
        let (manager, store, user_id) = setup(5 * DAY as u64);
        let issued = manager.create(user_id, "10.0.0.1", "agent").await.unwrap();
        store.remove_user(user_id);

        let result = manager.validate(&issued.sid).await.unwrap();
        assert!(matches!(
            result,
            Validation::Invalid {
                reason: InvalidReason::UserMissing,
                ..
            }
        ));
        let stored = store
            .find_session(&sha256_hex(&issued.sid))
            .await
            .unwrap()
            .unwrap();
        assert!(stored.revoked);
    }

    #[tokio::test]
    async fn test_unknown_token_is_invalid() {
        let (manager, _, _) = setup(5 * DAY as u64);
        let result = manager.validate("not-a-session").await.unwrap();
        assert!(matches!(
            result,
            Validation::Invalid {
                reason: InvalidReason::Unknown,
                ..
            }
        ));
        assert_eq!(result.cookie(), manager.clear_cookie());
    }

    #[tokio::test]
    async fn test_invalidate_returns_clearing_cookie() {
        let (manager, _, user_id) = setup(5 * DAY as u64);
        let issued = manager.create(user_id, "10.0.0.1", "agent").await.unwrap();

        let cookie = manager.invalidate(Some(&issued.sid)).await;
        assert_eq!(max_age(&cookie), 0);
        assert!(manager.validate(&issued.sid).await.unwrap().identity().is_none());

        assert_eq!(manager.invalidate(None).await, manager.clear_cookie());
    }

    #[tokio::test]
    async fn test_invalidate_all() {
        let (manager, _, user_id) = setup(5 * DAY as u64);
        let first = manager.create(user_id, "10.0.0.1", "a").await.unwrap();
        let second = manager.create(user_id, "10.0.0.2", "b").await.unwrap();

        assert_eq!(manager.invalidate_all(user_id).await.unwrap(), 2);
        for sid in [&first.sid, &second.sid] {
            assert!(manager.validate(sid).await.unwrap().identity().is_none());
        }
    }

    /// Session store whose every call fails, as when the database is down.
    #[derive(Debug)]
    struct UnreachableSessions;

    #[async_trait::async_trait]
    impl SessionStore for UnreachableSessions {
        async fn insert_session(&self, _session: &CreateSession) -> AppResult<Session> {
            Err(AppError::database("connection refused"))
        }

        async fn find_session(&self, _sid_hash: &str) -> AppResult<Option<Session>> {
            Err(AppError::database("connection refused"))
        }

        async fn extend_session(
            &self,
            _sid_hash: &str,
            _expires_at: DateTime<Utc>,
        ) -> AppResult<Option<Session>> {
            Err(AppError::database("connection refused"))
        }

        async fn revoke_session(&self, _sid_hash: &str) -> AppResult<bool> {
            Err(AppError::database("connection refused"))
        }

        async fn revoke_user_sessions(&self, _user_id: Uuid) -> AppResult<u64> {
            Err(AppError::database("connection refused"))
        }

        async fn purge_expired_sessions(&self, _now: DateTime<Utc>) -> AppResult<u64> {
            Err(AppError::database("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_storage_failures() {
        let users = Arc::new(MemoryStore::new(&MemoryStoreConfig::default()));
        let manager =
            SessionManager::new(Arc::new(UnreachableSessions), users, &SessionConfig::default());

        let cookie = manager.invalidate(Some("some-session-token")).await;
        assert_eq!(cookie, manager.clear_cookie());
        assert_eq!(max_age(&cookie), 0);

        let err = manager.validate("some-session-token").await.unwrap_err();
        assert_eq!(err.kind, warden_core::error::ErrorKind::Database);
        assert!(manager.invalidate_all(Uuid::new_v4()).await.is_err());
    }
}
