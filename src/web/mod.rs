//! Web API module for the academy backend.
//!
//! REST endpoints for administrator and student sessions and for the
//! student records administrators manage.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use openapi::ApiDoc;
pub use router::create_router;
pub use server::WebServer;
