//! Academy - coaching institute portal backend.
//!
//! Administrator and student sessions over signed bearer tokens with an
//! inactivity window, plus the student records administrators manage.

pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod web;

pub use auth::{
    hash_password, validate_password, verify_password, AdminSummary, CredentialError,
    CredentialStore, Denial, LoginError, PasswordError, Principal, PrincipalKind, SessionGuard,
    SessionIssuer, SessionPolicies, SessionPolicy, StudentSummary, TokenKeys,
};
pub use client::{AuthManager, ClientError, SessionState};
pub use config::Config;
pub use db::{Database, Student, StudentRepository};
pub use error::{AcademyError, Result};
pub use web::WebServer;
