//! OpenAPI document for the Web API.

use axum::{routing::get, Json, Router};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use super::dto::{
    AddTestResultRequest, AdminInfo, AdminLoginRequest, AdminLoginResponse, AttendanceEnvelope,
    AttendanceResponse, AvailableTestResponse, ChangePasswordRequest, CreateAdminRequest,
    CreateAdminResponse, CreateStudentRequest, CreatedAdminInfo, MarkAttendanceRequest,
    MessageResponse, StudentEnvelope, StudentInfo, StudentLoginRequest, StudentLoginResponse,
    StudentResponse, TestResultEnvelope, TestResultResponse, UpdateStudentRequest,
    UpdateTestResultRequest, VerifyResponse,
};
use super::error::{ErrorBody, ErrorCode};
use super::handlers::{admin, auth, student};
use crate::db::AttendanceStatus;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Academy API",
        description = "Admin and student sessions plus student records"
    ),
    paths(
        auth::admin_login,
        auth::verify,
        auth::logout,
        auth::create_admin,
        auth::admin_change_password,
        student::student_login,
        student::student_change_password,
        student::student_attendance,
        student::student_test_results,
        student::student_available_tests,
        admin::create_student,
        admin::list_students,
        admin::update_student,
        admin::mark_attendance,
        admin::add_test_result,
        admin::update_test_result
    ),
    components(schemas(
        ErrorBody,
        ErrorCode,
        MessageResponse,
        AdminLoginRequest,
        AdminLoginResponse,
        AdminInfo,
        VerifyResponse,
        CreateAdminRequest,
        CreateAdminResponse,
        CreatedAdminInfo,
        ChangePasswordRequest,
        StudentLoginRequest,
        StudentLoginResponse,
        StudentInfo,
        CreateStudentRequest,
        UpdateStudentRequest,
        StudentResponse,
        StudentEnvelope,
        MarkAttendanceRequest,
        AttendanceStatus,
        AttendanceResponse,
        AttendanceEnvelope,
        AddTestResultRequest,
        UpdateTestResultRequest,
        TestResultResponse,
        TestResultEnvelope,
        AvailableTestResponse
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Administrator sessions"),
        (name = "students", description = "Student sessions and own records"),
        (name = "admin", description = "Student record management")
    )
)]
pub struct ApiDoc;

/// Registers the bearer token scheme referenced by protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Router serving the OpenAPI document as JSON.
pub fn create_openapi_router() -> Router {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}
