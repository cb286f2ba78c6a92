//! Periodic purge of expired sessions and reset tokens.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{error, info};

use warden_core::result::AppResult;
use warden_core::traits::{ResetTokenStore, SessionStore};

/// Counts removed by one cleanup cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Expired or revoked sessions deleted.
    pub sessions: u64,
    /// Expired reset tokens deleted.
    pub reset_tokens: u64,
}

/// Handles periodic cleanup of dead session and reset-token records.
#[derive(Debug, Clone)]
pub struct SessionCleanup {
    sessions: Arc<dyn SessionStore>,
    reset_tokens: Arc<dyn ResetTokenStore>,
}

impl SessionCleanup {
    /// Creates a new cleanup handler.
    pub fn new(sessions: Arc<dyn SessionStore>, reset_tokens: Arc<dyn ResetTokenStore>) -> Self {
        Self {
            sessions,
            reset_tokens,
        }
    }

    /// Runs one cleanup cycle as of `now`.
    pub async fn run_cleanup(&self, now: DateTime<Utc>) -> AppResult<CleanupReport> {
        let report = CleanupReport {
            sessions: self.sessions.purge_expired_sessions(now).await?,
            reset_tokens: self.reset_tokens.purge_expired_reset_tokens(now).await?,
        };

        if report != CleanupReport::default() {
            info!(
                sessions = report.sessions,
                reset_tokens = report.reset_tokens,
                "Session cleanup completed"
            );
        }
        Ok(report)
    }

    /// Run cleanup every `interval` until the returned task is aborted.
    pub fn spawn(self, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = self.run_cleanup(Utc::now()).await {
                    error!(error = %e, "Session cleanup failed");
                }
            }
        })
    }
}
