//! Administrator session handlers.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::auth::{
    CredentialError, CredentialStore, LoginError, Principal, PrincipalKind, SessionGuard,
    SessionIssuer, SessionPolicies, TokenKeys,
};
use crate::config::AuthConfig;
use crate::web::dto::{
    AdminLoginRequest, AdminLoginResponse, ChangePasswordRequest, CreateAdminRequest,
    CreateAdminResponse, CreatedAdminInfo, MessageResponse, ValidatedJson, VerifyResponse,
};
use crate::web::error::ApiError;
use crate::web::middleware::AdminSession;
use crate::Database;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub store: CredentialStore,
    pub issuer: SessionIssuer,
    pub guard: Arc<SessionGuard>,
}

impl AppState {
    /// Wire the credential store, issuer and guard over one database.
    pub fn new(db: Database, auth: &AuthConfig) -> Self {
        let store = CredentialStore::new(db.clone());
        let keys = TokenKeys::new(&auth.jwt_secret);
        let policies = SessionPolicies::from_config(auth);

        Self {
            issuer: SessionIssuer::new(store.clone(), keys.clone(), policies),
            guard: Arc::new(SessionGuard::new(store.clone(), keys, policies)),
            store,
            db,
        }
    }
}

/// Take a login field, treating blank values as missing.
pub(crate) fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Map an issuer failure to a response.
pub(crate) fn login_error(err: LoginError, missing_message: &str) -> ApiError {
    match err {
        LoginError::MissingCredentials => ApiError::bad_request(missing_message),
        LoginError::InvalidCredentials => ApiError::unauthorized("Invalid credentials"),
        LoginError::Internal(_) => ApiError::internal("Internal server error"),
    }
}

/// Map a password change failure to a response.
pub(crate) fn change_password_error(err: CredentialError) -> ApiError {
    match err {
        CredentialError::InvalidCredential => {
            ApiError::unauthorized("Current password is incorrect")
        }
        CredentialError::Password(e) => ApiError::bad_request(e.to_string()),
        CredentialError::NotFound => ApiError::unauthorized("Invalid token"),
        other => {
            tracing::error!("Password change failed: {}", other);
            ApiError::internal("Internal server error")
        }
    }
}

const ADMIN_FIELDS_REQUIRED: &str = "Email and password are required";

/// POST /api/auth/login - Administrator login.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AdminLoginResponse),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn admin_login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<AdminLoginRequest>,
) -> Result<Json<AdminLoginResponse>, ApiError> {
    let (Some(email), Some(password)) = (required(req.email), required(req.password)) else {
        return Err(ApiError::bad_request(ADMIN_FIELDS_REQUIRED));
    };

    let session = state
        .issuer
        .login(PrincipalKind::Admin, &email, &password)
        .await
        .map_err(|e| login_error(e, ADMIN_FIELDS_REQUIRED))?;

    let Principal::Admin(admin) = session.principal else {
        return Err(ApiError::internal("Internal server error"));
    };

    Ok(Json(AdminLoginResponse {
        message: "Login successful".to_string(),
        token: session.token,
        admin: admin.into(),
    }))
}

/// POST /api/auth/verify - Check an administrator session.
#[utoipa::path(
    post,
    path = "/api/auth/verify",
    tag = "auth",
    responses(
        (status = 200, description = "Session is valid", body = VerifyResponse),
        (status = 401, description = "Missing, invalid or idle session")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn verify(AdminSession(admin): AdminSession) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        valid: true,
        admin: admin.into(),
    })
}

/// POST /api/auth/logout - End an administrator session.
///
/// Tokens are stateless; the client discards its copy.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Missing, invalid or idle session")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn logout(AdminSession(admin): AdminSession) -> Json<MessageResponse> {
    tracing::info!(admin_id = admin.id, "Admin logged out");
    Json(MessageResponse::new("Logged out successfully"))
}

/// POST /api/auth/create-admin - Create the first administrator.
#[utoipa::path(
    post,
    path = "/api/auth/create-admin",
    tag = "auth",
    request_body = CreateAdminRequest,
    responses(
        (status = 201, description = "Admin created", body = CreateAdminResponse),
        (status = 403, description = "Admin already exists"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_admin(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateAdminRequest>,
) -> Result<(StatusCode, Json<CreateAdminResponse>), ApiError> {
    let name = required(req.name).unwrap_or_else(|| "Admin".to_string());

    let admin = state
        .store
        .bootstrap_admin(req.email.trim(), &req.password, name.trim())
        .await
        .map_err(|e| match e {
            CredentialError::AdminExists => ApiError::forbidden("Admin already exists"),
            CredentialError::Password(e) => ApiError::bad_request(e.to_string()),
            other => {
                tracing::error!("Failed to create admin: {}", other);
                ApiError::internal("Internal server error")
            }
        })?;

    Ok((
        StatusCode::CREATED,
        Json(CreateAdminResponse {
            message: "Admin created successfully".to_string(),
            admin: CreatedAdminInfo {
                id: admin.id,
                email: admin.email,
                name: admin.name,
            },
        }),
    ))
}

/// POST /api/auth/change-password - Change the administrator's password.
#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    tag = "auth",
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
pub async fn admin_change_password(
    State(state): State<Arc<AppState>>,
    AdminSession(admin): AdminSession,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .store
        .change_secret(
            PrincipalKind::Admin,
            admin.id,
            &req.current_password,
            &req.new_password,
        )
        .await
        .map_err(change_password_error)?;

    Ok(Json(MessageResponse::new("Password changed successfully")))
}
