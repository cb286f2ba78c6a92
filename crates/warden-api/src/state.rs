//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use warden_auth::password::{PasswordHasher, PasswordValidator};
use warden_auth::rbac::RbacEnforcer;
use warden_auth::reset::ResetTokenManager;
use warden_auth::session::SessionManager;
use warden_core::config::AppConfig;
use warden_core::result::AppResult;
use warden_core::traits::UserStore;
use warden_store::StoreManager;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// User lookups and password updates
    pub users: Arc<dyn UserStore>,
    /// Password hasher (peppered scrypt)
    pub password_hasher: Arc<PasswordHasher>,
    /// New-password policy
    pub password_validator: Arc<PasswordValidator>,
    /// Session lifecycle manager
    pub session_manager: Arc<SessionManager>,
    /// Password-reset token manager
    pub reset_manager: Arc<ResetTokenManager>,
    /// Role hierarchy enforcer
    pub rbac_enforcer: RbacEnforcer,
}

impl AppState {
    /// Wire the auth components over the given stores.
    pub fn new(config: AppConfig, stores: &StoreManager) -> AppResult<Self> {
        let password_hasher = PasswordHasher::new(&config.auth)?;
        let password_validator = PasswordValidator::new(&config.auth);
        let session_manager = SessionManager::new(stores.sessions(), stores.users(), &config.session);
        let reset_manager = ResetTokenManager::new(
            stores.reset_tokens(),
            stores.users(),
            session_manager.clone(),
            &config.auth,
        );

        Ok(Self {
            config: Arc::new(config),
            users: stores.users(),
            password_hasher: Arc::new(password_hasher),
            password_validator: Arc::new(password_validator),
            session_manager: Arc::new(session_manager),
            reset_manager: Arc::new(reset_manager),
            rbac_enforcer: RbacEnforcer::new(),
        })
    }
}
