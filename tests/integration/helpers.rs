//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use chrono::{DateTime, Utc};
use http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use warden_auth::PasswordHasher;
use warden_core::config::AppConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::{SessionStore, UserStore};
use warden_entity::session::{CreateSession, Session};
use warden_entity::user::{User, UserRole};
use warden_store::StoreManager;
use warden_store::memory::MemoryStore;

/// Password used for every seeded user.
pub const PASSWORD: &str = "Sufficient1Password";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Backing in-memory store, shared with the router
    pub store: MemoryStore,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application over an in-memory store
    pub fn new() -> Self {
        Self::build(|_| None, |_| None)
    }

    /// Test application whose session storage always fails
    pub fn with_unreachable_sessions() -> Self {
        Self::build(|_| Some(Arc::new(UnreachableSessions) as Arc<dyn SessionStore>), |_| None)
    }

    /// Test application whose password writes always fail
    pub fn with_failing_password_writes() -> Self {
        Self::build(
            |_| None,
            |store| Some(Arc::new(ReadOnlyUsers(store.clone())) as Arc<dyn UserStore>),
        )
    }

    fn build(
        sessions: impl FnOnce(&MemoryStore) -> Option<Arc<dyn SessionStore>>,
        users: impl FnOnce(&MemoryStore) -> Option<Arc<dyn UserStore>>,
    ) -> Self {
        let mut config = AppConfig::default();
        config.auth.pepper = "integration-test-pepper-value".to_string();
        config.auth.scrypt_log_n = 4;
        config.validate().expect("Test config should be valid");

        let store = MemoryStore::new(&config.store.memory);
        let shared = Arc::new(store.clone());
        let default_sessions: Arc<dyn SessionStore> = shared.clone();
        let default_users: Arc<dyn UserStore> = shared.clone();
        let stores = StoreManager::from_stores(
            sessions(&store).unwrap_or(default_sessions),
            shared,
            users(&store).unwrap_or(default_users),
        );
        let state =
            warden_api::AppState::new(config.clone(), &stores).expect("Failed to build state");
        let router = warden_api::build_app(state);

        Self {
            router,
            store,
            config,
        }
    }

    /// Create a test user and return their ID
    pub fn create_test_user(&self, email: &str, role: UserRole) -> Uuid {
        let hasher = PasswordHasher::new(&self.config.auth).expect("Failed to build hasher");
        let id = Uuid::new_v4();
        self.store.insert_user(User {
            id,
            email: email.to_string(),
            password_hash: hasher.hash_blocking(PASSWORD).expect("Failed to hash password"),
            role,
            created_at: Utc::now(),
        });
        id
    }

    /// Log in and return the session token from the cookie
    pub async fn login(&self, email: &str) -> String {
        let response = self
            .request(
                "POST",
                "/auth/login",
                Some(serde_json::json!({ "email": email, "password": PASSWORD })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );
        response
            .session_cookie_value()
            .expect("No session cookie in login response")
    }

    /// Seed a user with `role` and log them in
    pub async fn session_for(&self, role: UserRole) -> String {
        let email = format!("{}@example.com", Uuid::new_v4());
        self.create_test_user(&email, role);
        self.login(&email).await
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        sid: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .header("User-Agent", "integration-test");

        if let Some(sid) = sid {
            req = req.header("Cookie", format!("{}={sid}", self.config.session.cookie_name));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// All `Set-Cookie` values, in order
    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all("set-cookie")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect()
    }

    /// The last `Set-Cookie` for the session cookie
    pub fn session_cookie(&self) -> Option<String> {
        self.set_cookies()
            .into_iter()
            .filter(|c| c.starts_with("__Secure-sid="))
            .next_back()
    }

    /// Value of the last session cookie, if non-empty
    pub fn session_cookie_value(&self) -> Option<String> {
        let cookie = self.session_cookie()?;
        let value = cookie
            .strip_prefix("__Secure-sid=")?
            .split(';')
            .next()?
            .to_string();
        (!value.is_empty()).then_some(value)
    }

    /// `Max-Age` of the last session cookie
    pub fn session_max_age(&self) -> Option<i64> {
        self.session_cookie()?
            .split("; ")
            .find_map(|part| part.strip_prefix("Max-Age="))
            .and_then(|v| v.parse().ok())
    }

    /// Assert the private, cookie-varying cache headers are present
    pub fn assert_private(&self) {
        assert_eq!(
            self.headers.get("cache-control").and_then(|v| v.to_str().ok()),
            Some("private, no-store"),
            "missing Cache-Control on {}",
            self.status
        );
        assert!(
            self.headers
                .get_all("vary")
                .iter()
                .any(|v| v.to_str().map(|s| s.contains("Cookie")).unwrap_or(false)),
            "missing Vary: Cookie on {}",
            self.status
        );
    }
}

/// Session store whose every call fails, as when the database is down.
#[derive(Debug)]
pub struct UnreachableSessions;

#[async_trait]
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

/// User store that reads from memory but rejects password writes.
#[derive(Debug)]
pub struct ReadOnlyUsers(pub MemoryStore);

#[async_trait]
impl UserStore for ReadOnlyUsers {
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        self.0.find_user(id).await
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.0.find_user_by_email(email).await
    }

    async fn update_password_hash(&self, _id: Uuid, _password_hash: &str) -> AppResult<()> {
        Err(AppError::database("read-only replica"))
    }
}
