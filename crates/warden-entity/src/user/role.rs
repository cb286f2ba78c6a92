//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles available in the authorization hierarchy.
///
/// The hierarchy is a strict partial order: `Admin` satisfies every
/// requirement, `Editor` satisfies `Editor` and `User`, `User` satisfies only
/// `User`. A stored role value that is not one of these decodes to
/// `Unrecognized`, which satisfies nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full administrator.
    Admin,
    /// Can manage content on top of regular access.
    Editor,
    /// Regular authenticated user.
    User,
    /// A stored role value this build does not know about.
    #[serde(other)]
    Unrecognized,
}

/// Error returned when parsing a role name that is not part of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid user role: '{0}'. Expected one of: admin, editor, user")]
pub struct UnknownRole(pub String);

impl UserRole {
    /// Check whether a session holding `self` may access a route requiring `required`.
    pub fn satisfies(&self, required: &UserRole) -> bool {
        match self {
            Self::Admin => true,
            Self::Editor => matches!(required, Self::Editor | Self::User),
            Self::User => matches!(required, Self::User),
            Self::Unrecognized => false,
        }
    }

    /// Decode a role as stored by the user collaborator.
    ///
    /// Unlike [`FromStr`], this never fails: unknown values map to
    /// [`UserRole::Unrecognized`].
    pub fn from_stored(value: &str) -> Self {
        value.parse().unwrap_or(Self::Unrecognized)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::User => "user",
            Self::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "editor" => Ok(Self::Editor),
            "user" => Ok(Self::User),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

impl From<String> for UserRole {
    fn from(value: String) -> Self {
        Self::from_stored(&value)
    }
}
