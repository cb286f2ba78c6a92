//! sqlx-backed store implementations.

pub mod reset_token;
pub mod session;
pub mod user;

pub use reset_token::PgResetTokenRepository;
pub use session::PgSessionRepository;
pub use user::PgUserRepository;
