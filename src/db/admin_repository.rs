//! Administrator repository.

use chrono::{DateTime, Utc};

use super::admin::{Admin, NewAdmin};
use super::{map_unique_violation, DbPool};
use crate::{AcademyError, Result};

const ADMIN_COLUMNS: &str =
    "id, email, password, name, role, last_activity, is_active, created_at, updated_at";

/// Repository for administrator rows.
pub struct AdminRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> AdminRepository<'a> {
    /// Create a new repository with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new administrator.
    ///
    /// `last_activity` starts at creation time.
    pub async fn create(&self, new_admin: &NewAdmin) -> Result<Admin> {
        let now = Utc::now();
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO admins (email, password, name, role, last_activity, is_active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, 1, $5, $5) RETURNING id",
        )
        .bind(&new_admin.email)
        .bind(&new_admin.password)
        .bind(&new_admin.name)
        .bind(&new_admin.role)
        .bind(now)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, &[("admins.email", "Email")]))?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| AcademyError::NotFound("admin".to_string()))
    }

    /// Create an administrator only while the table is empty.
    ///
    /// The emptiness check and the insert are one statement, so concurrent
    /// callers cannot both succeed. Returns `None` when a row already exists.
    pub async fn create_first(&self, new_admin: &NewAdmin) -> Result<Option<Admin>> {
        let now = Utc::now();
        let id: Option<i64> = sqlx::query_scalar(
            "INSERT INTO admins (email, password, name, role, last_activity, is_active, created_at, updated_at)
             SELECT $1, $2, $3, $4, $5, 1, $5, $5
             WHERE NOT EXISTS (SELECT 1 FROM admins)
             RETURNING id",
        )
        .bind(&new_admin.email)
        .bind(&new_admin.password)
        .bind(&new_admin.name)
        .bind(&new_admin.role)
        .bind(now)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, &[("admins.email", "Email")]))?;

        match id {
            Some(id) => self.get_by_id(id).await,
            None => Ok(None),
        }
    }

    /// Get an administrator by ID, active or not.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Admin>> {
        let admin = sqlx::query_as::<_, Admin>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(admin)
    }

    /// Get an active administrator by ID.
    pub async fn get_active_by_id(&self, id: i64) -> Result<Option<Admin>> {
        let admin = sqlx::query_as::<_, Admin>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE id = $1 AND is_active = 1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(admin)
    }

    /// Get an active administrator by email (case-insensitive).
    pub async fn get_active_by_email(&self, email: &str) -> Result<Option<Admin>> {
        let admin = sqlx::query_as::<_, Admin>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE email = $1 AND is_active = 1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;
        Ok(admin)
    }

    /// Whether any administrator row exists (active or not).
    pub async fn any_exists(&self) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM admins)")
            .fetch_one(self.pool)
            .await?;
        Ok(exists)
    }

    /// Set the last activity timestamp.
    pub async fn touch_activity(&self, id: i64, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE admins SET last_activity = $1 WHERE id = $2")
            .bind(at)
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Replace the password hash.
    pub async fn update_password(&self, id: i64, password_hash: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE admins SET password = $1, updated_at = $2 WHERE id = $3")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Enable or disable an administrator.
    pub async fn set_active(&self, id: i64, is_active: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE admins SET is_active = $1, updated_at = $2 WHERE id = $3")
            .bind(is_active)
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
