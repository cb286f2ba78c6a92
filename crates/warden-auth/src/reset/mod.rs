//! Single-use password-reset tokens.

pub mod manager;

pub use manager::ResetTokenManager;
