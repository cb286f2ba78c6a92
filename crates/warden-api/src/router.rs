//! Route definitions for the Warden HTTP API.
//!
//! Route groups share a gate layer: `user_routes` and `admin_routes` require
//! a role, `optional_routes` resolve a session when one is present, and
//! `public_routes` are not gated.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use warden_entity::user::UserRole;

use crate::handlers;
use crate::middleware;
use crate::middleware::guard::AuthorizationGate;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let gate = AuthorizationGate::from_state(&state);

    Router::new()
        .merge(public_routes())
        .merge(user_routes(&gate))
        .merge(admin_routes(&gate))
        .merge(optional_routes(&gate))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Login, logout, reset confirmation, health
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route(
            "/auth/password-reset/confirm",
            post(handlers::reset::confirm),
        )
        .route("/health", get(handlers::health::health))
}

/// Any authenticated user
fn user_routes(gate: &AuthorizationGate) -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route("/auth/logout-all", post(handlers::auth::logout_all))
        .route_layer(axum_middleware::from_fn_with_state(
            gate.require(UserRole::User),
            middleware::guard::guard,
        ))
}

/// Administrators only
fn admin_routes(gate: &AuthorizationGate) -> Router<AppState> {
    Router::new()
        .route(
            "/admin/users/{id}/password-reset",
            post(handlers::reset::issue),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            gate.require(UserRole::Admin),
            middleware::guard::guard,
        ))
}

/// Public content that is personalized when a session is present
fn optional_routes(gate: &AuthorizationGate) -> Router<AppState> {
    Router::new()
        .route("/auth/session", get(handlers::auth::session))
        .route_layer(axum_middleware::from_fn_with_state(
            gate.clone(),
            middleware::guard::optional,
        ))
}
