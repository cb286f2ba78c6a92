//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use warden_core::error::AppError;

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address.
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Password reset confirmation body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetConfirmRequest {
    /// The reset token handed to the user.
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
    /// The new password.
    pub new_password: String,
}

/// Run derive-based validation and map failures to a 422.
pub fn validate_body<T: Validate>(body: &T) -> Result<(), AppError> {
    body.validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))
}
