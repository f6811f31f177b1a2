//! Student-facing handlers.
//!
//! Every `:id` route serves the signed-in student's own records only; the
//! path segment is the student row ID.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use super::auth::{change_password_error, login_error, required, AppState};
use crate::auth::{Principal, PrincipalKind, StudentSummary};
use crate::db::{month_range, AttendanceRepository, TestResultRepository};
use crate::web::dto::{
    AttendanceQuery, AttendanceResponse, AvailableTestResponse, ChangePasswordRequest,
    MessageResponse, StudentLoginRequest, StudentLoginResponse, TestResultResponse,
    TestResultsQuery, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::StudentSession;

const STUDENT_FIELDS_REQUIRED: &str = "Student ID and password are required";

/// Reject access to another student's records.
fn ensure_own(student: &StudentSummary, id: i64) -> Result<(), ApiError> {
    if student.id == id {
        Ok(())
    } else {
        tracing::warn!(student_id = student.id, requested = id, "Cross-student access denied");
        Err(ApiError::forbidden("Access denied"))
    }
}

/// POST /api/students/login - Student login.
#[utoipa::path(
    post,
    path = "/api/students/login",
    tag = "students",
    request_body = StudentLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = StudentLoginResponse),
        (status = 400, description = "Student ID or password missing"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn student_login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<StudentLoginRequest>,
) -> Result<Json<StudentLoginResponse>, ApiError> {
    let (Some(student_id), Some(password)) = (required(req.student_id), required(req.password))
    else {
        return Err(ApiError::bad_request(STUDENT_FIELDS_REQUIRED));
    };

    let session = state
        .issuer
        .login(PrincipalKind::Student, &student_id, &password)
        .await
        .map_err(|e| login_error(e, STUDENT_FIELDS_REQUIRED))?;

    let Principal::Student(student) = session.principal else {
        return Err(ApiError::internal("Internal server error"));
    };

    Ok(Json(StudentLoginResponse {
        message: "Login successful".to_string(),
        token: session.token,
        student: student.into(),
    }))
}

/// POST /api/students/change-password - Change the student's password.
#[utoipa::path(
    post,
    path = "/api/students/change-password",
    tag = "students",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "New password rejected"),
        (status = 401, description = "Wrong current password or invalid session")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn student_change_password(
    State(state): State<Arc<AppState>>,
    StudentSession(student): StudentSession,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .store
        .change_secret(
            PrincipalKind::Student,
            student.id,
            &req.current_password,
            &req.new_password,
        )
        .await
        .map_err(change_password_error)?;

    Ok(Json(MessageResponse::new("Password changed successfully")))
}

/// GET /api/students/:id/attendance - Own attendance, oldest first.
#[utoipa::path(
    get,
    path = "/api/students/{id}/attendance",
    tag = "students",
    params(
        ("id" = i64, Path, description = "Student row ID"),
        AttendanceQuery
    ),
    responses(
        (status = 200, description = "Attendance records", body = [AttendanceResponse]),
        (status = 400, description = "Invalid month or year"),
        (status = 401, description = "Missing, invalid or idle session"),
        (status = 403, description = "Not the signed-in student")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn student_attendance(
    State(state): State<Arc<AppState>>,
    StudentSession(student): StudentSession,
    Path(id): Path<i64>,
    Query(query): Query<AttendanceQuery>,
) -> Result<Json<Vec<AttendanceResponse>>, ApiError> {
    ensure_own(&student, id)?;

    let range = match (query.month, query.year) {
        (Some(month), Some(year)) => Some(
            month_range(year, month).ok_or_else(|| ApiError::bad_request("Invalid month or year"))?,
        ),
        _ => None,
    };

    let records = AttendanceRepository::new(state.db.pool())
        .list_for_student(id, range)
        .await?;

    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// GET /api/students/:id/test-results - Own test results, newest first.
#[utoipa::path(
    get,
    path = "/api/students/{id}/test-results",
    tag = "students",
    params(
        ("id" = i64, Path, description = "Student row ID"),
        TestResultsQuery
    ),
    responses(
        (status = 200, description = "Test results", body = [TestResultResponse]),
        (status = 401, description = "Missing, invalid or idle session"),
        (status = 403, description = "Not the signed-in student")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn student_test_results(
    State(state): State<Arc<AppState>>,
    StudentSession(student): StudentSession,
    Path(id): Path<i64>,
    Query(query): Query<TestResultsQuery>,
) -> Result<Json<Vec<TestResultResponse>>, ApiError> {
    ensure_own(&student, id)?;

    let results = TestResultRepository::new(state.db.pool())
        .list_for_student(id, query.test_number)
        .await?;

    Ok(Json(results.into_iter().map(Into::into).collect()))
}

/// GET /api/students/:id/available-tests - Tests the student has results for.
#[utoipa::path(
    get,
    path = "/api/students/{id}/available-tests",
    tag = "students",
    params(
        ("id" = i64, Path, description = "Student row ID")
    ),
    responses(
        (status = 200, description = "Distinct tests", body = [AvailableTestResponse]),
        (status = 401, description = "Missing, invalid or idle session"),
        (status = 403, description = "Not the signed-in student")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn student_available_tests(
    State(state): State<Arc<AppState>>,
    StudentSession(student): StudentSession,
    Path(id): Path<i64>,
) -> Result<Json<Vec<AvailableTestResponse>>, ApiError> {
    ensure_own(&student, id)?;

    let tests = TestResultRepository::new(state.db.pool())
        .available_tests(id)
        .await?;

    Ok(Json(tests.into_iter().map(Into::into).collect()))
}
