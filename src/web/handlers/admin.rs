//! Admin record management handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::auth::AppState;
use crate::auth::hash_password;
use crate::db::{
    AttendanceRepository, MarkAttendance, NewStudent, NewTestResult, StudentRepository,
    StudentUpdate, TestResultRepository,
};
use crate::web::dto::{
    AddTestResultRequest, AttendanceEnvelope, CreateStudentRequest, MarkAttendanceRequest,
    StudentEnvelope, StudentResponse, TestResultEnvelope, UpdateStudentRequest,
    UpdateTestResultRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::AdminSession;

fn hash_for_storage(password: &str) -> Result<String, ApiError> {
    hash_password(password).map_err(|e| ApiError::bad_request(e.to_string()))
}

async fn require_student(state: &AppState, id: i64) -> Result<(), ApiError> {
    match StudentRepository::new(state.db.pool()).get_by_id(id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::not_found("Student not found")),
    }
}

/// POST /api/admin/students - Create a student.
#[utoipa::path(
    post,
    path = "/api/admin/students",
    tag = "admin",
    request_body = CreateStudentRequest,
    responses(
        (status = 201, description = "Student created", body = StudentEnvelope),
        (status = 400, description = "Student ID or email already exists"),
        (status = 401, description = "Admin access required"),
        (status = 422, description = "Validation failed")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_student(
    State(state): State<Arc<AppState>>,
    AdminSession(admin): AdminSession,
    ValidatedJson(req): ValidatedJson<CreateStudentRequest>,
) -> Result<(StatusCode, Json<StudentEnvelope>), ApiError> {
    let new_student = NewStudent {
        student_id: req.student_id.trim().to_string(),
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        email: req.email.trim().to_lowercase(),
        password: hash_for_storage(&req.password)?,
        phone: req.phone.filter(|p| !p.trim().is_empty()),
        date_of_birth: req.date_of_birth,
        enrollment_date: req.enrollment_date,
        course: req.course.trim().to_string(),
        batch: req.batch.trim().to_string(),
    };

    let student = StudentRepository::new(state.db.pool())
        .create(&new_student)
        .await?;

    tracing::info!(
        admin = %admin.email,
        student_id = %student.student_id,
        "Student created"
    );

    Ok((
        StatusCode::CREATED,
        Json(StudentEnvelope {
            message: "Student created successfully".to_string(),
            student: student.into(),
        }),
    ))
}

/// GET /api/admin/students - List all students.
#[utoipa::path(
    get,
    path = "/api/admin/students",
    tag = "admin",
    responses(
        (status = 200, description = "All students", body = [StudentResponse]),
        (status = 401, description = "Admin access required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_students(
    State(state): State<Arc<AppState>>,
    AdminSession(_admin): AdminSession,
) -> Result<Json<Vec<StudentResponse>>, ApiError> {
    let students = StudentRepository::new(state.db.pool()).list_all().await?;
    Ok(Json(students.into_iter().map(Into::into).collect()))
}

/// PUT /api/admin/students/:id - Update a student.
#[utoipa::path(
    put,
    path = "/api/admin/students/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Student row ID")
    ),
    request_body = UpdateStudentRequest,
    responses(
        (status = 200, description = "Student updated", body = StudentEnvelope),
        (status = 400, description = "Student ID or email already exists"),
        (status = 401, description = "Admin access required"),
        (status = 404, description = "Student not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_student(
    State(state): State<Arc<AppState>>,
    AdminSession(admin): AdminSession,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateStudentRequest>,
) -> Result<Json<StudentEnvelope>, ApiError> {
    let mut update = StudentUpdate::new();
    update.student_id = req.student_id.map(|s| s.trim().to_string());
    update.first_name = req.first_name.map(|s| s.trim().to_string());
    update.last_name = req.last_name.map(|s| s.trim().to_string());
    update.email = req.email.map(|s| s.trim().to_lowercase());
    update.password = req.password.as_deref().map(hash_for_storage).transpose()?;
    update.phone = req
        .phone
        .map(|p| Some(p.trim().to_string()).filter(|p| !p.is_empty()));
    update.date_of_birth = req.date_of_birth.map(Some);
    update.course = req.course.map(|s| s.trim().to_string());
    update.batch = req.batch.map(|s| s.trim().to_string());
    update.is_active = req.is_active;

    let student = StudentRepository::new(state.db.pool())
        .update(id, &update)
        .await?
        .ok_or_else(|| ApiError::not_found("Student not found"))?;

    tracing::info!(admin = %admin.email, student = id, "Student updated");

    Ok(Json(StudentEnvelope {
        message: "Student updated successfully".to_string(),
        student: student.into(),
    }))
}

/// POST /api/admin/attendance - Mark or correct a day's attendance.
///
/// Returns 201 for a new record and 200 when the day was already marked.
#[utoipa::path(
    post,
    path = "/api/admin/attendance",
    tag = "admin",
    request_body = MarkAttendanceRequest,
    responses(
        (status = 201, description = "Attendance marked", body = AttendanceEnvelope),
        (status = 200, description = "Attendance updated", body = AttendanceEnvelope),
        (status = 401, description = "Admin access required"),
        (status = 404, description = "Student not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn mark_attendance(
    State(state): State<Arc<AppState>>,
    AdminSession(admin): AdminSession,
    ValidatedJson(req): ValidatedJson<MarkAttendanceRequest>,
) -> Result<(StatusCode, Json<AttendanceEnvelope>), ApiError> {
    require_student(&state, req.student_id).await?;

    let mark = MarkAttendance {
        student_id: req.student_id,
        date: req.date,
        status: req.status,
        reason: req.reason.filter(|r| !r.trim().is_empty()),
        marked_by: admin.email,
    };

    let (attendance, created) = AttendanceRepository::new(state.db.pool())
        .mark(&mark)
        .await?;

    let (status, message) = if created {
        (StatusCode::CREATED, "Attendance marked successfully")
    } else {
        (StatusCode::OK, "Attendance updated successfully")
    };

    Ok((
        status,
        Json(AttendanceEnvelope {
            message: message.to_string(),
            attendance: attendance.into(),
        }),
    ))
}

/// POST /api/admin/test-results - Record a test result.
#[utoipa::path(
    post,
    path = "/api/admin/test-results",
    tag = "admin",
    request_body = AddTestResultRequest,
    responses(
        (status = 201, description = "Test result added", body = TestResultEnvelope),
        (status = 400, description = "Marks out of range"),
        (status = 401, description = "Admin access required"),
        (status = 404, description = "Student not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn add_test_result(
    State(state): State<Arc<AppState>>,
    AdminSession(admin): AdminSession,
    ValidatedJson(req): ValidatedJson<AddTestResultRequest>,
) -> Result<(StatusCode, Json<TestResultEnvelope>), ApiError> {
    require_student(&state, req.student_id).await?;

    let new_result = NewTestResult {
        student_id: req.student_id,
        test_number: req.test_number,
        test_name: req.test_name.trim().to_string(),
        subject: req.subject.trim().to_string(),
        max_marks: req.max_marks,
        obtained_marks: req.obtained_marks,
        test_date: req.test_date,
        remarks: req.remarks.filter(|r| !r.trim().is_empty()),
        added_by: admin.email,
    };

    let result = TestResultRepository::new(state.db.pool())
        .create(&new_result)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TestResultEnvelope {
            message: "Test result added successfully".to_string(),
            test_result: result.into(),
        }),
    ))
}

/// PUT /api/admin/test-results/:id - Correct the marks of a result.
#[utoipa::path(
    put,
    path = "/api/admin/test-results/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Test result ID")
    ),
    request_body = UpdateTestResultRequest,
    responses(
        (status = 200, description = "Test result updated", body = TestResultEnvelope),
        (status = 400, description = "Marks out of range"),
        (status = 401, description = "Admin access required"),
        (status = 404, description = "Test result not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_test_result(
    State(state): State<Arc<AppState>>,
    AdminSession(_admin): AdminSession,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateTestResultRequest>,
) -> Result<Json<TestResultEnvelope>, ApiError> {
    let result = TestResultRepository::new(state.db.pool())
        .update_marks(id, req.obtained_marks, req.max_marks, req.remarks.as_deref())
        .await?
        .ok_or_else(|| ApiError::not_found("Test result not found"))?;

    Ok(Json(TestResultEnvelope {
        message: "Test result updated successfully".to_string(),
        test_result: result.into(),
    }))
}
