//! Middleware for Web API.

pub mod auth;
pub mod cors;
pub mod rate_limit;
pub mod security;

pub use auth::{denial_error, inject_guard, AdminSession, StudentSession};
pub use cors::create_cors_layer;
pub use rate_limit::{login_rate_limit, LoginRateLimit};
pub use security::security_headers;
