//! # warden-auth
//!
//! Credential and session security for Warden.
//!
//! ## Modules
//!
//! - `password`: Peppered scrypt hashing, encoded hash format, and password policy
//! - `session`: Session issuance, sliding validation, revocation, and cleanup
//! - `reset`: Single-use password-reset tokens
//! - `rbac`: Role hierarchy enforcement
//! - `token`: Random bearer tokens and their at-rest hashes

pub mod password;
pub mod rbac;
pub mod reset;
pub mod session;
pub mod token;

pub use password::{PasswordHasher, PasswordValidator};
pub use rbac::RbacEnforcer;
pub use reset::ResetTokenManager;
pub use session::{InvalidReason, SessionCleanup, SessionManager, Validation};
