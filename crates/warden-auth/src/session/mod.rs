//! Session lifecycle management: issuance, sliding validation, revocation,
//! and periodic cleanup.

pub mod cleanup;
pub mod cookie;
pub mod manager;

pub use cleanup::{CleanupReport, SessionCleanup};
pub use cookie::SessionCookie;
pub use manager::{InvalidReason, IssuedSession, SessionManager, Validation};
