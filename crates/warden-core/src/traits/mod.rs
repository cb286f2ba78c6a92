//! Core traits defined in `warden-core` and implemented by the storage crates.

pub mod store;

pub use store::{ResetTokenStore, SessionStore, UserStore};
