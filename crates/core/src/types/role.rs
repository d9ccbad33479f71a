//! User role type.

use serde::{Deserialize, Serialize};

/// Role of a portal user, as reported by the backend's login response.
///
/// The backend stores the role as a free-form string column; anything that is
/// not exactly `"admin"` is treated as a regular user at the boundary rather
/// than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    #[serde(other)]
    User,
}

impl UserRole {
    /// Whether this role grants access to the admin dashboard.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::User => write!(f, "user"),
        }
    }
}
