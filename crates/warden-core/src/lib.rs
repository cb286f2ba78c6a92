//! # warden-core
//!
//! Core crate for Warden. Contains the persistence traits the managers are
//! written against, configuration schemas, and the unified error system.
//!
//! The only internal dependency is `warden-entity`, whose row types appear in
//! the persistence traits.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
