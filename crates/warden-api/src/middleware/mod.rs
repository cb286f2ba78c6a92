//! Axum middleware stack.

pub mod guard;
pub mod logging;
