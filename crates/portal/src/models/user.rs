//! Session-held user identity.

use serde::{Deserialize, Serialize};

use gavelpoint_core::{Email, UserRole};

/// Profile of the logged-in operator, as returned by the backend's login
/// endpoint and persisted with the session.
///
/// Minimal data: enough for greeting the operator and for the admin-route
/// gating decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Display name.
    pub name: String,
    /// Email address used to log in.
    pub email: Email,
    /// Role flag driving dashboard access.
    #[serde(default)]
    pub role: UserRole,
}

impl UserProfile {
    /// Whether this profile may access the admin dashboard.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
