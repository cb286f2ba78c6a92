//! # warden-database
//!
//! PostgreSQL connection management and the sqlx-backed implementations of
//! the session, reset-token, and user store traits.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{PgResetTokenRepository, PgSessionRepository, PgUserRepository};
