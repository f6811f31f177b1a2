//! Web API Authentication Tests
//!
//! Integration tests for administrator and student sessions.

mod common;

use axum::http::{header::AUTHORIZATION, StatusCode};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};

use academy::auth::SessionClaims;
use academy::{CredentialStore, Database, PrincipalKind, TokenKeys};
use common::*;

// ============================================================================
// Administrator bootstrap
// ============================================================================

#[tokio::test]
async fn test_create_admin_once() {
    let (server, _db) = create_test_server().await;

    let response = server
        .post("/api/auth/create-admin")
        .json(&json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["message"], "Admin created successfully");
    assert_eq!(body["admin"]["email"], ADMIN_EMAIL);
    assert_eq!(body["admin"]["name"], "Admin");
    assert!(body["admin"].get("password").is_none());

    let response = server
        .post("/api/auth/create-admin")
        .json(&json!({ "email": "b@x.com", "password": ADMIN_PASSWORD }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["error"], "Admin already exists");
}

#[tokio::test]
async fn test_create_admin_short_password() {
    let (server, _db) = create_test_server().await;

    let response = server
        .post("/api/auth/create-admin")
        .json(&json!({ "email": ADMIN_EMAIL, "password": "abc" }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["details"]["password"].is_array());
}

// ============================================================================
// Administrator login and verify
// ============================================================================

#[tokio::test]
async fn test_admin_login_and_verify() {
    let (server, _db) = create_test_server().await;
    let token = admin_token(&server).await;

    let response = server
        .post("/api/auth/verify")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["valid"], true);
    assert_eq!(body["admin"]["email"], ADMIN_EMAIL);
    assert_eq!(body["admin"]["name"], "Principal");
    assert_eq!(body["admin"]["role"], "admin");
}

#[tokio::test]
async fn test_admin_login_response_shape() {
    let (server, _db) = create_test_server().await;
    admin_token(&server).await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["token"].as_str().unwrap().split('.').count(), 3);
    assert_eq!(body["admin"]["id"], 1);
}

#[tokio::test]
async fn test_admin_login_wrong_password() {
    let (server, _db) = create_test_server().await;
    admin_token(&server).await;

    let wrong_password = server
        .post("/api/auth/login")
        .json(&json!({ "email": ADMIN_EMAIL, "password": "wrong-password" }))
        .await;
    wrong_password.assert_status(StatusCode::UNAUTHORIZED);

    let unknown_email = server
        .post("/api/auth/login")
        .json(&json!({ "email": "nobody@x.com", "password": ADMIN_PASSWORD }))
        .await;
    unknown_email.assert_status(StatusCode::UNAUTHORIZED);

    let a: Value = wrong_password.json();
    let b: Value = unknown_email.json();
    assert_eq!(a["error"], "Invalid credentials");
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_admin_login_missing_fields() {
    let (server, _db) = create_test_server().await;

    for body in [
        json!({ "email": ADMIN_EMAIL }),
        json!({ "password": ADMIN_PASSWORD }),
        json!({ "email": "  ", "password": ADMIN_PASSWORD }),
        json!({}),
    ] {
        let response = server.post("/api/auth/login").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "Email and password are required");
    }
}

#[tokio::test]
async fn test_idle_admin_session_expires() {
    let (server, db) = create_test_server().await;
    let token = admin_token(&server).await;

    CredentialStore::new(db)
        .touch_activity(PrincipalKind::Admin, 1, Utc::now() - Duration::minutes(31))
        .await;

    let response = server
        .post("/api/auth/verify")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let body: Value = response.json();
    assert_eq!(body["error"], "Session expired due to inactivity");
}

#[tokio::test]
async fn test_recent_activity_keeps_session() {
    let (server, db) = create_test_server().await;
    let token = admin_token(&server).await;

    CredentialStore::new(db)
        .touch_activity(PrincipalKind::Admin, 1, Utc::now() - Duration::minutes(29))
        .await;

    server
        .post("/api/auth/verify")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_missing_token() {
    let (server, _db) = create_test_server().await;

    let response = server.get("/api/admin/students").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Admin access required");

    let response = server.get("/api/students/1/attendance").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Access denied");
}

#[tokio::test]
async fn test_malformed_authorization_header() {
    let (server, _db) = create_test_server().await;
    admin_token(&server).await;

    let response = server
        .post("/api/auth/verify")
        .add_header(AUTHORIZATION, "Basic YTpi".to_string())
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn test_tampered_token() {
    let (server, _db) = create_test_server().await;
    let token = admin_token(&server).await;

    let parts: Vec<&str> = token.split('.').collect();
    let mut claims: Value = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();
    claims["exp"] = json!(claims["exp"].as_i64().unwrap() + 86_400);
    let forged = format!(
        "{}.{}.{}",
        parts[0],
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap()),
        parts[2]
    );

    let response = server
        .post("/api/auth/verify")
        .add_header(AUTHORIZATION, bearer(&forged))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn test_expired_token() {
    let (server, db) = create_test_server().await;
    admin_token(&server).await;

    let principal = CredentialStore::new(db)
        .authenticate(PrincipalKind::Admin, ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .unwrap();
    let claims = SessionClaims::for_principal(&principal, Utc::now() - Duration::hours(9), 8 * 3600);
    let token = TokenKeys::new(JWT_SECRET).encode(&claims).unwrap();

    let response = server
        .post("/api/auth/verify")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid token");
}

async fn student_token_issued_at(db: Database, issued_at: DateTime<Utc>) -> String {
    let principal = CredentialStore::new(db)
        .authenticate(PrincipalKind::Student, "S001", STUDENT_PASSWORD)
        .await
        .unwrap();
    let claims = SessionClaims::for_principal(&principal, issued_at, 24 * 3600);
    TokenKeys::new(JWT_SECRET).encode(&claims).unwrap()
}

#[tokio::test]
async fn test_expired_student_token() {
    let (server, db) = create_test_server().await;
    let admin = admin_token(&server).await;
    let student = create_student(&server, &admin, "S001", "asha@example.com").await;

    let token = student_token_issued_at(db, Utc::now() - Duration::hours(25)).await;

    let response = server
        .get(&format!("/api/students/{}/attendance", student["id"]))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn test_day_old_student_token_still_valid() {
    let (server, db) = create_test_server().await;
    let admin = admin_token(&server).await;
    let student = create_student(&server, &admin, "S001", "asha@example.com").await;

    // No idle policy for students, so only the token lifetime matters.
    let token = student_token_issued_at(db, Utc::now() - Duration::hours(23)).await;

    server
        .get(&format!("/api/students/{}/attendance", student["id"]))
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_token_signed_with_other_secret() {
    let (server, db) = create_test_server().await;
    admin_token(&server).await;

    let principal = CredentialStore::new(db)
        .authenticate(PrincipalKind::Admin, ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .unwrap();
    let claims = SessionClaims::for_principal(&principal, Utc::now(), 3600);
    let token = TokenKeys::new("some-other-secret").encode(&claims).unwrap();

    server
        .post("/api/auth/verify")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout() {
    let (server, _db) = create_test_server().await;
    let token = admin_token(&server).await;

    let response = server
        .post("/api/auth/logout")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Logged out successfully");
}

#[tokio::test]
async fn test_admin_change_password() {
    let (server, _db) = create_test_server().await;
    let token = admin_token(&server).await;

    let response = server
        .post("/api/auth/change-password")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "currentPassword": "not-it", "newPassword": "newpass1" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    server
        .post("/api/auth/change-password")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "currentPassword": ADMIN_PASSWORD, "newPassword": "newpass1" }))
        .await
        .assert_status_ok();

    server
        .post("/api/auth/login")
        .json(&json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .post("/api/auth/login")
        .json(&json!({ "email": ADMIN_EMAIL, "password": "newpass1" }))
        .await
        .assert_status_ok();
}

// ============================================================================
// Student login
// ============================================================================

#[tokio::test]
async fn test_student_login() {
    let (server, _db) = create_test_server().await;
    let admin = admin_token(&server).await;
    create_student(&server, &admin, "S001", "asha@example.com").await;

    let response = server
        .post("/api/students/login")
        .json(&json!({ "studentId": "S001", "password": STUDENT_PASSWORD }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["message"], "Login successful");
    assert!(body["token"].is_string());
    assert_eq!(body["student"]["studentId"], "S001");
    assert_eq!(body["student"]["course"], "NEET");
    assert!(body["student"].get("password").is_none());
}

#[tokio::test]
async fn test_student_login_failures_look_alike() {
    let (server, _db) = create_test_server().await;
    let admin = admin_token(&server).await;
    let student = create_student(&server, &admin, "S001", "asha@example.com").await;

    let wrong = server
        .post("/api/students/login")
        .json(&json!({ "studentId": "S001", "password": "nope123" }))
        .await;
    wrong.assert_status(StatusCode::UNAUTHORIZED);

    server
        .put(&format!("/api/admin/students/{}", student["id"]))
        .add_header(AUTHORIZATION, bearer(&admin))
        .json(&json!({ "isActive": false }))
        .await
        .assert_status_ok();

    let inactive = server
        .post("/api/students/login")
        .json(&json!({ "studentId": "S001", "password": STUDENT_PASSWORD }))
        .await;
    inactive.assert_status(StatusCode::UNAUTHORIZED);

    let a: Value = wrong.json();
    let b: Value = inactive.json();
    assert_eq!(a["error"], "Invalid credentials");
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_student_login_missing_fields() {
    let (server, _db) = create_test_server().await;

    let response = server
        .post("/api/students/login")
        .json(&json!({ "studentId": "S001" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Student ID and password are required");
}

#[tokio::test]
async fn test_deactivated_student_token_rejected() {
    let (server, _db) = create_test_server().await;
    let admin = admin_token(&server).await;
    let student = create_student(&server, &admin, "S001", "asha@example.com").await;
    let token = student_token(&server, "S001").await;

    server
        .put(&format!("/api/admin/students/{}", student["id"]))
        .add_header(AUTHORIZATION, bearer(&admin))
        .json(&json!({ "isActive": false }))
        .await
        .assert_status_ok();

    let response = server
        .get(&format!("/api/students/{}/attendance", student["id"]))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Student not found or inactive");
}

#[tokio::test]
async fn test_tokens_are_kind_specific() {
    let (server, _db) = create_test_server().await;
    let admin = admin_token(&server).await;
    let student = create_student(&server, &admin, "S001", "asha@example.com").await;
    let token = student_token(&server, "S001").await;

    let response = server
        .post("/api/auth/verify")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid token");

    server
        .get("/api/admin/students")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .get(&format!("/api/students/{}/attendance", student["id"]))
        .add_header(AUTHORIZATION, bearer(&admin))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_student_change_password() {
    let (server, _db) = create_test_server().await;
    let admin = admin_token(&server).await;
    create_student(&server, &admin, "S001", "asha@example.com").await;
    let token = student_token(&server, "S001").await;

    let response = server
        .post("/api/students/change-password")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "currentPassword": STUDENT_PASSWORD, "newPassword": "fresh99" }))
        .await;
    response.assert_status_ok();

    server
        .post("/api/students/login")
        .json(&json!({ "studentId": "S001", "password": "fresh99" }))
        .await
        .assert_status_ok();
}

// ============================================================================
// Ambient endpoints
// ============================================================================

#[tokio::test]
async fn test_health_and_openapi() {
    let (server, _db) = create_test_server().await;

    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");

    let response = server.get("/api-docs/openapi.json").await;
    response.assert_status_ok();
    let doc: Value = response.json();
    assert!(doc["paths"]["/api/auth/verify"].is_object());
    assert!(doc["components"]["securitySchemes"]["bearer_auth"].is_object());
}
