//! API handlers.

pub mod admin;
pub mod auth;
pub mod student;

pub use admin::*;
pub use auth::*;
pub use student::*;
