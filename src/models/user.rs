//! User model
//!
//! Staff accounts for the admin panel. The first registered user becomes an
//! admin; later registrations are editors. Admins additionally moderate the
//! pending/approval queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Login name
    pub username: String,
    /// Email address (author approval notices go here)
    pub email: String,
    /// Argon2id password hash (never serialized)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Role in the panel
    pub role: UserRole,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full access, including the approval queue
    Admin,
    /// Creates and edits posts
    Editor,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Editor
    }
}

impl UserRole {
    /// Convert role to its database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Editor => "editor",
        }
    }

    /// Parse role from its database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "editor" => Some(UserRole::Editor),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        assert_eq!(UserRole::from_str("admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::from_str("Editor"), Some(UserRole::Editor));
        assert_eq!(UserRole::from_str("owner"), None);
        assert_eq!(UserRole::Admin.as_str(), "admin");
    }
}
