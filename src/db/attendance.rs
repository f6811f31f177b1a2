//! Attendance records and repository.
//!
//! One row per student and calendar day. Marking a day that already has a
//! row updates it in place.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::DbPool;
use crate::{AcademyError, Result};

/// Attendance status for a day.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
        }
    }
}

/// Attendance entity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Attendance {
    pub id: i64,
    /// Student row ID.
    pub student_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub reason: Option<String>,
    /// Email of the administrator who marked the day.
    pub marked_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for marking a day.
#[derive(Debug, Clone)]
pub struct MarkAttendance {
    pub student_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub reason: Option<String>,
    pub marked_by: String,
}

/// First and last day of a calendar month, or None for an invalid month.
pub fn month_range(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let last = next.pred_opt()?;
    Some((first, last))
}

const ATTENDANCE_COLUMNS: &str =
    "id, student_id, date, status, reason, marked_by, created_at, updated_at";

/// Repository for attendance rows.
pub struct AttendanceRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> AttendanceRepository<'a> {
    /// Create a new repository with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Mark a day, inserting or updating the `(student, date)` row.
    ///
    /// Returns the stored row and whether it was newly created.
    pub async fn mark(&self, mark: &MarkAttendance) -> Result<(Attendance, bool)> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM attendance WHERE student_id = $1 AND date = $2")
                .bind(mark.student_id)
                .bind(mark.date)
                .fetch_optional(&mut *tx)
                .await?;

        let (id, created) = match existing {
            Some(id) => {
                sqlx::query(
                    "UPDATE attendance SET status = $1, reason = $2, marked_by = $3, updated_at = $4
                     WHERE id = $5",
                )
                .bind(mark.status)
                .bind(&mark.reason)
                .bind(&mark.marked_by)
                .bind(now)
                .bind(id)
                .execute(&mut *tx)
                .await?;
                (id, false)
            }
            None => {
                let id: i64 = sqlx::query_scalar(
                    "INSERT INTO attendance (student_id, date, status, reason, marked_by, created_at, updated_at)
                     VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING id",
                )
                .bind(mark.student_id)
                .bind(mark.date)
                .bind(mark.status)
                .bind(&mark.reason)
                .bind(&mark.marked_by)
                .bind(now)
                .fetch_one(&mut *tx)
                .await?;
                (id, true)
            }
        };

        tx.commit().await?;

        let attendance = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| AcademyError::NotFound("attendance".to_string()))?;
        Ok((attendance, created))
    }

    /// Get a row by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Attendance>> {
        let attendance = sqlx::query_as::<_, Attendance>(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(attendance)
    }

    /// List a student's attendance in date order, optionally restricted to
    /// an inclusive date range.
    pub async fn list_for_student(
        &self,
        student_id: i64,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<Attendance>> {
        let rows = match range {
            Some((from, to)) => {
                sqlx::query_as::<_, Attendance>(&format!(
                    "SELECT {ATTENDANCE_COLUMNS} FROM attendance
                     WHERE student_id = $1 AND date BETWEEN $2 AND $3 ORDER BY date"
                ))
                .bind(student_id)
                .bind(from)
                .bind(to)
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Attendance>(&format!(
                    "SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE student_id = $1 ORDER BY date"
                ))
                .bind(student_id)
                .fetch_all(self.pool)
                .await?
            }
        };
        Ok(rows)
    }
}
