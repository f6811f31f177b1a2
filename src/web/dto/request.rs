//! Request DTOs for Web API.

use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::validation::{no_control_chars, not_empty_trimmed};
use crate::db::AttendanceStatus;

// ============================================================================
// Session
// ============================================================================

/// Administrator login request.
///
/// Both fields are optional at the JSON level so a missing field yields the
/// "required" message instead of a deserialization error.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct AdminLoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Student login request.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentLoginRequest {
    pub student_id: Option<String>,
    pub password: Option<String>,
}

/// First administrator bootstrap request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAdminRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(
        min = 6,
        max = 128,
        message = "Password must be 6-128 characters"
    ))]
    pub password: String,
    /// Display name, "Admin" when omitted.
    #[validate(
        length(max = 100, message = "Name must be at most 100 characters"),
        custom(function = "no_control_chars")
    )]
    pub name: Option<String>,
}

/// Password change for the current principal.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(
        min = 6,
        max = 128,
        message = "Password must be 6-128 characters"
    ))]
    pub new_password: String,
}

// ============================================================================
// Student records
// ============================================================================

/// Create student request (admin).
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentRequest {
    #[validate(
        length(min = 1, max = 32, message = "Student ID must be 1-32 characters"),
        custom(function = "not_empty_trimmed")
    )]
    pub student_id: String,
    #[validate(
        length(min = 1, max = 100, message = "First name must be 1-100 characters"),
        custom(function = "no_control_chars")
    )]
    pub first_name: String,
    #[validate(
        length(min = 1, max = 100, message = "Last name must be 1-100 characters"),
        custom(function = "no_control_chars")
    )]
    pub last_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(
        min = 6,
        max = 128,
        message = "Password must be 6-128 characters"
    ))]
    pub password: String,
    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    /// Defaults to today.
    pub enrollment_date: Option<NaiveDate>,
    #[validate(custom(function = "not_empty_trimmed"))]
    pub course: String,
    #[validate(custom(function = "not_empty_trimmed"))]
    pub batch: String,
}

/// Update student request (admin). Omitted fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentRequest {
    #[validate(custom(function = "not_empty_trimmed"))]
    pub student_id: Option<String>,
    #[validate(custom(function = "not_empty_trimmed"))]
    pub first_name: Option<String>,
    #[validate(custom(function = "not_empty_trimmed"))]
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    /// New password, hashed before storage.
    #[validate(length(
        min = 6,
        max = 128,
        message = "Password must be 6-128 characters"
    ))]
    pub password: Option<String>,
    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[validate(custom(function = "not_empty_trimmed"))]
    pub course: Option<String>,
    #[validate(custom(function = "not_empty_trimmed"))]
    pub batch: Option<String>,
    pub is_active: Option<bool>,
}

/// Mark attendance request (admin).
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendanceRequest {
    /// Student row ID.
    pub student_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub reason: Option<String>,
}

/// Add test result request (admin).
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddTestResultRequest {
    /// Student row ID.
    pub student_id: i64,
    #[validate(range(min = 1, message = "Test number must be positive"))]
    pub test_number: i64,
    #[validate(custom(function = "not_empty_trimmed"))]
    pub test_name: String,
    #[validate(custom(function = "not_empty_trimmed"))]
    pub subject: String,
    #[validate(range(min = 1, message = "Max marks must be at least 1"))]
    pub max_marks: i64,
    #[validate(range(min = 0, message = "Obtained marks must not be negative"))]
    pub obtained_marks: i64,
    pub test_date: NaiveDate,
    pub remarks: Option<String>,
}

/// Update test result marks (admin).
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTestResultRequest {
    #[validate(range(min = 1, message = "Max marks must be at least 1"))]
    pub max_marks: i64,
    #[validate(range(min = 0, message = "Obtained marks must not be negative"))]
    pub obtained_marks: i64,
    pub remarks: Option<String>,
}

// ============================================================================
// Query parameters
// ============================================================================

/// Month filter for attendance. Applied only when both are present.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttendanceQuery {
    /// Month (1-12).
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// Test number filter for results.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase", parameter_in = Query)]
pub struct TestResultsQuery {
    pub test_number: Option<i64>,
}
