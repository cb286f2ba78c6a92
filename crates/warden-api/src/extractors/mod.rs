//! Custom Axum extractors.

pub mod auth;
pub mod client;

pub use auth::{AuthUser, MaybeAuthUser};
pub use client::ClientInfo;
