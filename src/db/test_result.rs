//! Test results and repository.
//!
//! Percentage and grade are derived from the marks on every write; callers
//! never supply them.

use chrono::{DateTime, NaiveDate, Utc};

use super::DbPool;
use crate::{AcademyError, Result};

/// Derived score for a set of marks.
#[derive(Debug, Clone, PartialEq)]
pub struct TestScore {
    /// Percentage rounded to two decimals.
    pub percentage: f64,
    pub grade: &'static str,
}

/// Grade thresholds, highest first. Anything below the last is an F.
const GRADES: &[(f64, &str)] = &[
    (90.0, "A+"),
    (80.0, "A"),
    (70.0, "B+"),
    (60.0, "B"),
    (50.0, "C"),
    (40.0, "D"),
];

/// Compute percentage and grade for the given marks.
///
/// `max_marks` must be positive and `obtained_marks` within `0..=max_marks`.
pub fn score(obtained_marks: i64, max_marks: i64) -> Result<TestScore> {
    if max_marks < 1 {
        return Err(AcademyError::Validation(
            "maxMarks must be at least 1".to_string(),
        ));
    }
    if obtained_marks < 0 || obtained_marks > max_marks {
        return Err(AcademyError::Validation(
            "obtainedMarks must be between 0 and maxMarks".to_string(),
        ));
    }

    let raw = obtained_marks as f64 / max_marks as f64 * 100.0;
    let percentage = (raw * 100.0).round() / 100.0;
    let grade = GRADES
        .iter()
        .find(|(threshold, _)| percentage >= *threshold)
        .map(|(_, grade)| *grade)
        .unwrap_or("F");

    Ok(TestScore { percentage, grade })
}

/// Test result entity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TestResult {
    pub id: i64,
    /// Student row ID.
    pub student_id: i64,
    pub test_number: i64,
    pub test_name: String,
    pub subject: String,
    pub max_marks: i64,
    pub obtained_marks: i64,
    pub percentage: f64,
    pub grade: String,
    pub test_date: NaiveDate,
    pub remarks: Option<String>,
    /// Email of the administrator who entered the result.
    pub added_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for a new test result.
#[derive(Debug, Clone)]
pub struct NewTestResult {
    pub student_id: i64,
    pub test_number: i64,
    pub test_name: String,
    pub subject: String,
    pub max_marks: i64,
    pub obtained_marks: i64,
    pub test_date: NaiveDate,
    pub remarks: Option<String>,
    pub added_by: String,
}

/// A distinct test a student has results for.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct AvailableTest {
    pub test_number: i64,
    pub test_name: String,
}

const RESULT_COLUMNS: &str = "id, student_id, test_number, test_name, subject, max_marks,
     obtained_marks, percentage, grade, test_date, remarks, added_by, created_at, updated_at";

/// Repository for test results.
pub struct TestResultRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> TestResultRepository<'a> {
    /// Create a new repository with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a result, deriving percentage and grade.
    pub async fn create(&self, new_result: &NewTestResult) -> Result<TestResult> {
        let scored = score(new_result.obtained_marks, new_result.max_marks)?;
        let now = Utc::now();

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO test_results (student_id, test_number, test_name, subject, max_marks,
                                       obtained_marks, percentage, grade, test_date, remarks,
                                       added_by, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12) RETURNING id",
        )
        .bind(new_result.student_id)
        .bind(new_result.test_number)
        .bind(&new_result.test_name)
        .bind(&new_result.subject)
        .bind(new_result.max_marks)
        .bind(new_result.obtained_marks)
        .bind(scored.percentage)
        .bind(scored.grade)
        .bind(new_result.test_date)
        .bind(&new_result.remarks)
        .bind(&new_result.added_by)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| AcademyError::NotFound("test result".to_string()))
    }

    /// Replace the marks of a result and re-derive its score.
    ///
    /// Remarks are left untouched when `remarks` is None. Returns None if the
    /// result does not exist.
    pub async fn update_marks(
        &self,
        id: i64,
        obtained_marks: i64,
        max_marks: i64,
        remarks: Option<&str>,
    ) -> Result<Option<TestResult>> {
        let scored = score(obtained_marks, max_marks)?;

        let result = sqlx::query(
            "UPDATE test_results
             SET obtained_marks = $1, max_marks = $2, percentage = $3, grade = $4,
                 remarks = COALESCE($5, remarks), updated_at = $6
             WHERE id = $7",
        )
        .bind(obtained_marks)
        .bind(max_marks)
        .bind(scored.percentage)
        .bind(scored.grade)
        .bind(remarks)
        .bind(Utc::now())
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    /// Get a result by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<TestResult>> {
        let result = sqlx::query_as::<_, TestResult>(&format!(
            "SELECT {RESULT_COLUMNS} FROM test_results WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(result)
    }

    /// List a student's results, newest test date first, optionally for a
    /// single test number.
    pub async fn list_for_student(
        &self,
        student_id: i64,
        test_number: Option<i64>,
    ) -> Result<Vec<TestResult>> {
        let results = sqlx::query_as::<_, TestResult>(&format!(
            "SELECT {RESULT_COLUMNS} FROM test_results
             WHERE student_id = $1 AND ($2 IS NULL OR test_number = $2)
             ORDER BY test_date DESC, id DESC"
        ))
        .bind(student_id)
        .bind(test_number)
        .fetch_all(self.pool)
        .await?;
        Ok(results)
    }

    /// Distinct tests a student has results for, by test number.
    pub async fn available_tests(&self, student_id: i64) -> Result<Vec<AvailableTest>> {
        let tests = sqlx::query_as::<_, AvailableTest>(
            "SELECT test_number, test_name FROM test_results
             WHERE student_id = $1
             GROUP BY test_number, test_name
             ORDER BY test_number",
        )
        .bind(student_id)
        .fetch_all(self.pool)
        .await?;
        Ok(tests)
    }
}
