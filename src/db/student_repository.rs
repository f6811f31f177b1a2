//! Student repository.

use chrono::{DateTime, Utc};
use sqlx::QueryBuilder;

use super::student::{NewStudent, Student, StudentUpdate};
use super::{map_unique_violation, DbPool};
use crate::{AcademyError, Result};

const STUDENT_COLUMNS: &str = "id, student_id, first_name, last_name, email, password, phone,
     date_of_birth, enrollment_date, course, batch, is_active, last_activity, created_at, updated_at";

const UNIQUE_COLUMNS: &[(&str, &str)] = &[
    ("students.student_id", "Student ID"),
    ("students.email", "Email"),
];

/// Repository for student rows.
pub struct StudentRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> StudentRepository<'a> {
    /// Create a new repository with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new student.
    ///
    /// Fails with `Conflict("Student ID")` or `Conflict("Email")` when either
    /// identifier is already taken.
    pub async fn create(&self, new_student: &NewStudent) -> Result<Student> {
        if self.student_id_exists(&new_student.student_id).await? {
            return Err(AcademyError::Conflict("Student ID".to_string()));
        }
        if self.email_exists(&new_student.email).await? {
            return Err(AcademyError::Conflict("Email".to_string()));
        }

        let now = Utc::now();
        let enrollment_date = new_student
            .enrollment_date
            .unwrap_or_else(|| now.date_naive());

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO students (student_id, first_name, last_name, email, password, phone,
                                   date_of_birth, enrollment_date, course, batch, is_active,
                                   last_activity, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 1, $11, $11, $11) RETURNING id",
        )
        .bind(&new_student.student_id)
        .bind(&new_student.first_name)
        .bind(&new_student.last_name)
        .bind(&new_student.email)
        .bind(&new_student.password)
        .bind(&new_student.phone)
        .bind(new_student.date_of_birth)
        .bind(enrollment_date)
        .bind(&new_student.course)
        .bind(&new_student.batch)
        .bind(now)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, UNIQUE_COLUMNS))?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| AcademyError::NotFound("student".to_string()))
    }

    /// Get a student by row ID, active or not.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(student)
    }

    /// Get an active student by row ID.
    pub async fn get_active_by_id(&self, id: i64) -> Result<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1 AND is_active = 1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(student)
    }

    /// Get an active student by login identifier.
    pub async fn get_active_by_student_id(&self, student_id: &str) -> Result<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE student_id = $1 AND is_active = 1"
        ))
        .bind(student_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(student)
    }

    /// List all students ordered by first name.
    pub async fn list_all(&self) -> Result<Vec<Student>> {
        let students = sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students ORDER BY first_name, last_name, id"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(students)
    }

    /// Apply a partial update.
    ///
    /// Returns the updated student, or None if not found.
    pub async fn update(&self, id: i64, update: &StudentUpdate) -> Result<Option<Student>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE students SET ");
        let mut separated = query.separated(", ");

        if let Some(ref student_id) = update.student_id {
            separated.push("student_id = ");
            separated.push_bind_unseparated(student_id);
        }
        if let Some(ref first_name) = update.first_name {
            separated.push("first_name = ");
            separated.push_bind_unseparated(first_name);
        }
        if let Some(ref last_name) = update.last_name {
            separated.push("last_name = ");
            separated.push_bind_unseparated(last_name);
        }
        if let Some(ref email) = update.email {
            separated.push("email = ");
            separated.push_bind_unseparated(email);
        }
        if let Some(ref password) = update.password {
            separated.push("password = ");
            separated.push_bind_unseparated(password);
        }
        if let Some(ref phone) = update.phone {
            separated.push("phone = ");
            separated.push_bind_unseparated(phone.clone());
        }
        if let Some(date_of_birth) = update.date_of_birth {
            separated.push("date_of_birth = ");
            separated.push_bind_unseparated(date_of_birth);
        }
        if let Some(ref course) = update.course {
            separated.push("course = ");
            separated.push_bind_unseparated(course);
        }
        if let Some(ref batch) = update.batch {
            separated.push("batch = ");
            separated.push_bind_unseparated(batch);
        }
        if let Some(is_active) = update.is_active {
            separated.push("is_active = ");
            separated.push_bind_unseparated(is_active);
        }
        separated.push("updated_at = ");
        separated.push_bind_unseparated(Utc::now());

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| map_unique_violation(e, UNIQUE_COLUMNS))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Replace the password hash.
    pub async fn update_password(&self, id: i64, password_hash: &str) -> Result<bool> {
        let result =
            sqlx::query("UPDATE students SET password = $1, updated_at = $2 WHERE id = $3")
                .bind(password_hash)
                .bind(Utc::now())
                .bind(id)
                .execute(self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set the last activity timestamp.
    pub async fn touch_activity(&self, id: i64, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE students SET last_activity = $1 WHERE id = $2")
            .bind(at)
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Check if a login identifier is taken.
    pub async fn student_id_exists(&self, student_id: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM students WHERE student_id = $1)")
                .bind(student_id)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Check if an email is taken (case-insensitive).
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM students WHERE email = $1)")
                .bind(email)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }
}
