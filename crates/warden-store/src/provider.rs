//! Store manager that dispatches to the configured provider.

use std::sync::Arc;

use tracing::info;

use warden_core::config::AppConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::{ResetTokenStore, SessionStore, UserStore};

/// Handles to the session, reset-token, and user stores of one backend.
///
/// All three handles point at the same backend so that the stores share a
/// single authoritative state.
#[derive(Debug, Clone)]
pub struct StoreManager {
    sessions: Arc<dyn SessionStore>,
    reset_tokens: Arc<dyn ResetTokenStore>,
    users: Arc<dyn UserStore>,
}

impl StoreManager {
    /// Create the stores selected by `config.store.provider`.
    pub async fn new(config: &AppConfig) -> AppResult<Self> {
        match config.store.provider.as_str() {
            #[cfg(feature = "postgres")]
            "postgres" => {
                info!("Initializing PostgreSQL store provider");
                let db = warden_database::DatabasePool::connect(&config.database).await?;
                warden_database::migration::run_migrations(db.pool()).await?;
                let pool = db.pool().clone();
                Ok(Self {
                    sessions: Arc::new(warden_database::PgSessionRepository::new(pool.clone())),
                    reset_tokens: Arc::new(warden_database::PgResetTokenRepository::new(
                        pool.clone(),
                    )),
                    users: Arc::new(warden_database::PgUserRepository::new(pool)),
                })
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory store provider");
                let store = crate::memory::MemoryStore::new(&config.store.memory);
                Ok(Self::from_memory(store))
            }
            other => Err(AppError::configuration(format!(
                "Unknown store provider: '{other}'. Supported: memory, postgres"
            ))),
        }
    }

    /// Build a manager over a single in-memory store.
    #[cfg(feature = "memory")]
    pub fn from_memory(store: crate::memory::MemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            sessions: store.clone(),
            reset_tokens: store.clone(),
            users: store,
        }
    }

    /// Build a manager from existing store handles (for testing).
    pub fn from_stores(
        sessions: Arc<dyn SessionStore>,
        reset_tokens: Arc<dyn ResetTokenStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            sessions,
            reset_tokens,
            users,
        }
    }

    /// Session store handle.
    pub fn sessions(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.sessions)
    }

    /// Reset-token store handle.
    pub fn reset_tokens(&self) -> Arc<dyn ResetTokenStore> {
        Arc::clone(&self.reset_tokens)
    }

    /// User store handle.
    pub fn users(&self) -> Arc<dyn UserStore> {
        Arc::clone(&self.users)
    }
}
