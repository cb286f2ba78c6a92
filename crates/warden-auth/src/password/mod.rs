//! Password hashing and policy enforcement.

pub mod encoded;
pub mod hasher;
pub mod validator;

pub use encoded::{CostParams, EncodedHash, NormalizationForm};
pub use hasher::PasswordHasher;
pub use validator::PasswordValidator;
