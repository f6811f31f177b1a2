//! Administrator model.

use chrono::{DateTime, Utc};

/// Role string stored for administrators.
pub const ADMIN_ROLE: &str = "admin";

/// Administrator entity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Admin {
    /// Unique admin ID.
    pub id: i64,
    /// Login email (unique, case-insensitive).
    pub email: String,
    /// Password hash (Argon2).
    pub password: String,
    /// Display name.
    pub name: String,
    /// Role label.
    pub role: String,
    /// Last authenticated request.
    pub last_activity: DateTime<Utc>,
    /// Whether the account may log in.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a new administrator.
#[derive(Debug, Clone)]
pub struct NewAdmin {
    /// Login email.
    pub email: String,
    /// Password hash (must already be hashed).
    pub password: String,
    /// Display name.
    pub name: String,
    /// Role label (defaults to "admin").
    pub role: String,
}

impl NewAdmin {
    /// Create a new admin record with the default role.
    pub fn new(
        email: impl Into<String>,
        password_hash: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password_hash.into(),
            name: name.into(),
            role: ADMIN_ROLE.to_string(),
        }
    }

    /// Set the role.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_admin_defaults() {
        let admin = NewAdmin::new("a@x.com", "hash", "Admin");
        assert_eq!(admin.email, "a@x.com");
        assert_eq!(admin.role, "admin");
    }

    #[test]
    fn test_new_admin_with_role() {
        let admin = NewAdmin::new("a@x.com", "hash", "Admin").with_role("owner");
        assert_eq!(admin.role, "owner");
    }
}
