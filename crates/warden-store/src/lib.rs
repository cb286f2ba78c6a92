//! # warden-store
//!
//! Store providers for Warden. Supports two modes:
//!
//! - **memory**: In-process maps using [dashmap](https://crates.io/crates/dashmap)
//! - **postgres**: The sqlx repositories from `warden-database`
//!
//! The provider is selected at runtime based on configuration.

#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;

pub use provider::StoreManager;
