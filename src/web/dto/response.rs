//! Response DTOs for Web API.
//!
//! Bodies are flat JSON objects with camelCase keys. Password hashes never
//! appear in any of them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{AdminSummary, StudentSummary};
use crate::db::{Attendance, AttendanceStatus, AvailableTest, Student, TestResult};

/// Plain message response.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// Administrator info.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminInfo {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl From<AdminSummary> for AdminInfo {
    fn from(admin: AdminSummary) -> Self {
        Self {
            id: admin.id,
            email: admin.email,
            name: admin.name,
            role: admin.role,
        }
    }
}

/// Administrator login response.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminLoginResponse {
    pub message: String,
    /// Session token (JWT).
    pub token: String,
    pub admin: AdminInfo,
}

/// Token verification response.
#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyResponse {
    pub valid: bool,
    pub admin: AdminInfo,
}

/// Newly created administrator.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedAdminInfo {
    pub id: i64,
    pub email: String,
    pub name: String,
}

/// Administrator bootstrap response.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateAdminResponse {
    pub message: String,
    pub admin: CreatedAdminInfo,
}

/// Student info returned at login.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentInfo {
    pub id: i64,
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub course: String,
    pub batch: String,
}

impl From<StudentSummary> for StudentInfo {
    fn from(student: StudentSummary) -> Self {
        Self {
            id: student.id,
            student_id: student.student_id,
            first_name: student.first_name,
            last_name: student.last_name,
            email: student.email,
            course: student.course,
            batch: student.batch,
        }
    }
}

/// Student login response.
#[derive(Debug, Serialize, ToSchema)]
pub struct StudentLoginResponse {
    pub message: String,
    /// Session token (JWT).
    pub token: String,
    pub student: StudentInfo,
}

// ============================================================================
// Student records
// ============================================================================

/// Full student record.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentResponse {
    pub id: i64,
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub enrollment_date: NaiveDate,
    pub course: String,
    pub batch: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Student> for StudentResponse {
    fn from(student: Student) -> Self {
        Self {
            id: student.id,
            student_id: student.student_id,
            first_name: student.first_name,
            last_name: student.last_name,
            email: student.email,
            phone: student.phone,
            date_of_birth: student.date_of_birth,
            enrollment_date: student.enrollment_date,
            course: student.course,
            batch: student.batch,
            is_active: student.is_active,
            created_at: student.created_at,
            updated_at: student.updated_at,
        }
    }
}

/// Student create/update response.
#[derive(Debug, Serialize, ToSchema)]
pub struct StudentEnvelope {
    pub message: String,
    pub student: StudentResponse,
}

/// Attendance record.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceResponse {
    pub id: i64,
    pub student_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub reason: Option<String>,
    pub marked_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Attendance> for AttendanceResponse {
    fn from(a: Attendance) -> Self {
        Self {
            id: a.id,
            student_id: a.student_id,
            date: a.date,
            status: a.status,
            reason: a.reason,
            marked_by: a.marked_by,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

/// Attendance mark response.
#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceEnvelope {
    pub message: String,
    pub attendance: AttendanceResponse,
}

/// Test result record.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestResultResponse {
    pub id: i64,
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
    pub added_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TestResult> for TestResultResponse {
    fn from(r: TestResult) -> Self {
        Self {
            id: r.id,
            student_id: r.student_id,
            test_number: r.test_number,
            test_name: r.test_name,
            subject: r.subject,
            max_marks: r.max_marks,
            obtained_marks: r.obtained_marks,
            percentage: r.percentage,
            grade: r.grade,
            test_date: r.test_date,
            remarks: r.remarks,
            added_by: r.added_by,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Test result create/update response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestResultEnvelope {
    pub message: String,
    pub test_result: TestResultResponse,
}

/// A test a student has results for.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailableTestResponse {
    pub test_number: i64,
    pub test_name: String,
}

impl From<AvailableTest> for AvailableTestResponse {
    fn from(t: AvailableTest) -> Self {
        Self {
            test_number: t.test_number,
            test_name: t.test_name,
        }
    }
}
