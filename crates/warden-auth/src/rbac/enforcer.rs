//! RBAC enforcement: checks a session's role against a route's required role.

use warden_core::error::AppError;
use warden_entity::user::UserRole;

/// Enforces the role hierarchy for guarded routes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RbacEnforcer;

impl RbacEnforcer {
    /// Creates a new enforcer.
    pub fn new() -> Self {
        Self
    }

    /// Checks whether `actual` satisfies `required` under the hierarchy.
    ///
    /// Returns an authorization error when it does not.
    pub fn require_role(&self, actual: &UserRole, required: &UserRole) -> Result<(), AppError> {
        if actual.satisfies(required) {
            Ok(())
        } else {
            Err(AppError::authorization(format!(
                "Role '{actual}' is insufficient; required: '{required}'"
            )))
        }
    }
}
