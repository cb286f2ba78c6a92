//! # warden-api
//!
//! HTTP layer for Warden built on Axum.
//!
//! Provides the cookie-session authorization gate, the auth endpoints,
//! extractors, DTOs, and request logging.

pub mod app;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use middleware::guard::{AuthorizationGate, RoleGuard};
pub use state::AppState;
