//! Student model.

use chrono::{DateTime, NaiveDate, Utc};

/// Student entity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Student {
    /// Unique row ID.
    pub id: i64,
    /// Institute-issued login identifier (unique).
    pub student_id: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address (unique, case-insensitive).
    pub email: String,
    /// Password hash (Argon2).
    pub password: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Date of enrollment.
    pub enrollment_date: NaiveDate,
    /// Enrolled course.
    pub course: String,
    /// Batch within the course.
    pub batch: String,
    /// Whether the account may log in.
    pub is_active: bool,
    /// Last authenticated request.
    pub last_activity: DateTime<Utc>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Student {
    /// Full display name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Data for creating a new student.
#[derive(Debug, Clone)]
pub struct NewStudent {
    /// Login identifier.
    pub student_id: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Password hash (must already be hashed).
    pub password: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Enrollment date (defaults to today).
    pub enrollment_date: Option<NaiveDate>,
    /// Course.
    pub course: String,
    /// Batch.
    pub batch: String,
}

/// Partial update for a student. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct StudentUpdate {
    /// New login identifier.
    pub student_id: Option<String>,
    /// New first name.
    pub first_name: Option<String>,
    /// New last name.
    pub last_name: Option<String>,
    /// New email.
    pub email: Option<String>,
    /// New password hash.
    pub password: Option<String>,
    /// New phone (Some(None) clears it).
    pub phone: Option<Option<String>>,
    /// New date of birth (Some(None) clears it).
    pub date_of_birth: Option<Option<NaiveDate>>,
    /// New course.
    pub course: Option<String>,
    /// New batch.
    pub batch: Option<String>,
    /// New active status.
    pub is_active: Option<bool>,
}

impl StudentUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.student_id.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.phone.is_none()
            && self.date_of_birth.is_none()
            && self.course.is_none()
            && self.batch.is_none()
            && self.is_active.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_update_is_empty() {
        assert!(StudentUpdate::new().is_empty());

        let update = StudentUpdate {
            phone: Some(None),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
