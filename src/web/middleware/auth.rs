//! Session extractors for protected routes.
//!
//! The router injects the shared [`SessionGuard`] into request extensions;
//! [`AdminSession`] and [`StudentSession`] pull the bearer token from the
//! `Authorization` header and run the guard for their principal kind.

use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{request::Parts, Request},
    middleware::Next,
    response::Response,
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use std::sync::Arc;

use crate::auth::{AdminSummary, Denial, Principal, PrincipalKind, SessionGuard, StudentSummary};
use crate::web::error::ApiError;

/// Convert a guard denial into the response for a route guarded for `kind`.
pub fn denial_error(denial: &Denial, kind: PrincipalKind) -> ApiError {
    match denial {
        Denial::Internal(_) => ApiError::internal(denial.message(kind)),
        _ => ApiError::unauthorized(denial.message(kind)),
    }
}

async fn authorize(parts: &mut Parts, kind: PrincipalKind) -> Result<Principal, ApiError> {
    let guard = parts
        .extensions
        .get::<Arc<SessionGuard>>()
        .cloned()
        .ok_or_else(|| ApiError::internal("Session guard not configured"))?;

    let token = match parts.extract::<TypedHeader<Authorization<Bearer>>>().await {
        Ok(TypedHeader(Authorization(bearer))) => Some(bearer.token().to_string()),
        Err(rejection) if rejection.is_missing() => None,
        Err(_) => return Err(denial_error(&Denial::InvalidToken, kind)),
    };

    guard
        .check(kind, token.as_deref())
        .await
        .map_err(|denial| denial_error(&denial, kind))
}

/// Extractor for routes that require an administrator session.
#[derive(Debug, Clone)]
pub struct AdminSession(pub AdminSummary);

#[async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match authorize(parts, PrincipalKind::Admin).await? {
            Principal::Admin(admin) => Ok(AdminSession(admin)),
            Principal::Student(_) => Err(denial_error(&Denial::InvalidToken, PrincipalKind::Admin)),
        }
    }
}

/// Extractor for routes that require a student session.
#[derive(Debug, Clone)]
pub struct StudentSession(pub StudentSummary);

#[async_trait]
impl<S> FromRequestParts<S> for StudentSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match authorize(parts, PrincipalKind::Student).await? {
            Principal::Student(student) => Ok(StudentSession(student)),
            Principal::Admin(_) => Err(denial_error(
                &Denial::InvalidToken,
                PrincipalKind::Student,
            )),
        }
    }
}

/// Middleware function to inject the session guard into request extensions.
pub async fn inject_guard(
    guard: Arc<SessionGuard>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(guard);
    next.run(request).await
}
