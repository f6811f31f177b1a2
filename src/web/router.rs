//! Router configuration for Web API.

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    add_test_result, admin_change_password, admin_login, create_admin, create_student,
    list_students, logout, mark_attendance, student_attendance, student_available_tests,
    student_change_password, student_login, student_test_results, update_student,
    update_test_result, verify, AppState,
};
use super::middleware::{
    create_cors_layer, inject_guard, login_rate_limit, security_headers, LoginRateLimit,
};
use super::openapi::create_openapi_router;

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    login_limit: Arc<LoginRateLimit>,
    cors_origins: &[String],
) -> Router {
    let limit_for_admin = login_limit.clone();
    let limit_for_student = login_limit;

    // Administrator session routes
    let auth_routes = Router::new()
        .route(
            "/login",
            post(admin_login).route_layer(middleware::from_fn(move |req, next| {
                login_rate_limit(limit_for_admin.clone(), req, next)
            })),
        )
        .route("/verify", post(verify))
        .route("/logout", post(logout))
        .route("/create-admin", post(create_admin))
        .route("/change-password", post(admin_change_password));

    // Student session and own-record routes
    let student_routes = Router::new()
        .route(
            "/login",
            post(student_login).route_layer(middleware::from_fn(move |req, next| {
                login_rate_limit(limit_for_student.clone(), req, next)
            })),
        )
        .route("/change-password", post(student_change_password))
        .route("/:id/attendance", get(student_attendance))
        .route("/:id/test-results", get(student_test_results))
        .route("/:id/available-tests", get(student_available_tests));

    // Record management routes
    let admin_routes = Router::new()
        .route("/students", get(list_students).post(create_student))
        .route("/students/:id", put(update_student))
        .route("/attendance", post(mark_attendance))
        .route("/test-results", post(add_test_result))
        .route("/test-results/:id", put(update_test_result));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/students", student_routes)
        .nest("/admin", admin_routes);

    let guard = app_state.guard.clone();

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(security_headers))
                .layer(middleware::from_fn(move |req, next| {
                    inject_guard(guard.clone(), req, next)
                })),
        )
        .with_state(app_state)
        .merge(create_health_router())
        .merge(create_openapi_router())
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use crate::Database;
    use axum::{body::Body, extract::ConnectInfo, http::Request, http::StatusCode};
    use std::net::SocketAddr;
    use tower::util::ServiceExt;

    async fn app() -> Router {
        let db = Database::open_in_memory().await.unwrap();
        let state = Arc::new(AppState::new(db, &AuthConfig::default()));
        create_router(state, Arc::new(LoginRateLimit::new(2)), &[])
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .await
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    async fn login_statuses(app: Router, forwarded_for: &[&str]) -> Vec<StatusCode> {
        let peer: SocketAddr = "198.51.100.4:40000".parse().unwrap();
        let mut statuses = Vec::new();
        for ip in forwarded_for {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/api/auth/login")
                        .header("Content-Type", "application/json")
                        .header("X-Forwarded-For", *ip)
                        .extension(ConnectInfo(peer))
                        .body(Body::from(r#"{"email":"a@x.com","password":"wrong1"}"#))
                        .unwrap(),
                )
                .await
                .unwrap();
            statuses.push(response.status());
        }
        statuses
    }

    #[tokio::test]
    async fn test_login_is_rate_limited() {
        let statuses = login_statuses(app().await, &["1.1.1.1", "1.1.1.1", "1.1.1.1"]).await;

        assert_eq!(
            statuses,
            vec![
                StatusCode::UNAUTHORIZED,
                StatusCode::UNAUTHORIZED,
                StatusCode::TOO_MANY_REQUESTS
            ]
        );
    }

    #[tokio::test]
    async fn test_rotating_forwarded_for_does_not_reset_limit() {
        let statuses = login_statuses(app().await, &["1.1.1.1", "2.2.2.2", "3.3.3.3"]).await;

        assert_eq!(statuses[2], StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_protected_route_has_security_headers() {
        let response = app()
            .await
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/verify")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get("X-Frame-Options").unwrap(), "DENY");
    }
}
