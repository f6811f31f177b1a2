//! Shared helpers for Web API tests.

#![allow(dead_code)]

use std::sync::Arc;

use academy::config::Config;
use academy::web::handlers::AppState;
use academy::web::middleware::LoginRateLimit;
use academy::web::router::create_router;
use academy::Database;
use axum_test::TestServer;
use serde_json::{json, Value};

pub const JWT_SECRET: &str = "test-secret-key-for-testing-only";
pub const ADMIN_EMAIL: &str = "a@x.com";
pub const ADMIN_PASSWORD: &str = "pw1234";
pub const STUDENT_PASSWORD: &str = "stud123";

/// Create a test configuration.
pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    config.server.login_rate_limit = 1000;
    config.auth.jwt_secret = JWT_SECRET.to_string();
    config
}

/// Create a test server with an in-memory database.
pub async fn create_test_server() -> (TestServer, Database) {
    let config = create_test_config();
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");

    let app_state = Arc::new(AppState::new(db.clone(), &config.auth));
    let limiter = Arc::new(LoginRateLimit::new(config.server.login_rate_limit));
    let router = create_router(app_state, limiter, &config.server.cors_origins);

    let server = TestServer::new(router).expect("Failed to create test server");
    (server, db)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Bootstrap the administrator and log in, returning the token.
pub async fn admin_token(server: &TestServer) -> String {
    server
        .post("/api/auth/create-admin")
        .json(&json!({
            "email": ADMIN_EMAIL,
            "password": ADMIN_PASSWORD,
            "name": "Principal"
        }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let body: Value = server
        .post("/api/auth/login")
        .json(&json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .await
        .json();
    body["token"].as_str().expect("token").to_string()
}

/// Create a student through the admin API, returning the student record.
pub async fn create_student(
    server: &TestServer,
    admin_token: &str,
    student_id: &str,
    email: &str,
) -> Value {
    let response = server
        .post("/api/admin/students")
        .add_header(axum::http::header::AUTHORIZATION, bearer(admin_token))
        .json(&json!({
            "studentId": student_id,
            "firstName": "Asha",
            "lastName": "Verma",
            "email": email,
            "password": STUDENT_PASSWORD,
            "course": "NEET",
            "batch": "2025-A"
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let body: Value = response.json();
    body["student"].clone()
}

/// Log a student in, returning the token.
pub async fn student_token(server: &TestServer, student_id: &str) -> String {
    let response = server
        .post("/api/students/login")
        .json(&json!({ "studentId": student_id, "password": STUDENT_PASSWORD }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    body["token"].as_str().expect("token").to_string()
}
