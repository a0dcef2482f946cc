//! Authenticated caller identity handed in by the transport adapter.

use serde::{Deserialize, Serialize};

use super::UserId;

/// Role attached to an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerRole {
    /// Administrator; may edit or delete anything.
    Admin,
    /// Ordinary authenticated user.
    Member,
}

impl CallerRole {
    /// Interpret a raw role string from an identity token.
    ///
    /// Only the exact string `admin` grants administrative rights.
    ///
    /// ```
    /// use content_backend::domain::CallerRole;
    ///
    /// assert_eq!(CallerRole::from_role_name("admin"), CallerRole::Admin);
    /// assert_eq!(CallerRole::from_role_name("Admin"), CallerRole::Member);
    /// ```
    pub fn from_role_name(raw: &str) -> Self {
        if raw == "admin" {
            Self::Admin
        } else {
            Self::Member
        }
    }

    /// Whether the role carries administrative rights.
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Authenticated caller of a manager operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    /// Caller's user id.
    pub user_id: UserId,
    /// Caller's role.
    pub role: CallerRole,
}

impl Actor {
    /// Build an actor from its parts.
    pub fn new(user_id: UserId, role: CallerRole) -> Self {
        Self { user_id, role }
    }

    /// Ordinary member.
    pub fn member(user_id: UserId) -> Self {
        Self::new(user_id, CallerRole::Member)
    }

    /// Administrator.
    pub fn admin(user_id: UserId) -> Self {
        Self::new(user_id, CallerRole::Admin)
    }

    /// Owner-or-admin predicate shared by every edit and delete path.
    pub fn may_modify(&self, owner: UserId) -> bool {
        self.user_id == owner || self.role.is_admin()
    }
}
