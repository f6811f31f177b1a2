//! Client library for the academy API.

mod manager;
mod timer;

pub use manager::{AdminProfile, AuthManager, SessionState, StudentProfile, DEFAULT_IDLE_TIMEOUT};
pub use timer::InactivityTimer;

use thiserror::Error;

/// Client-side errors.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error status.
    #[error("{message} ({status})")]
    Api { status: u16, message: String },

    #[error("not logged in")]
    NotLoggedIn,
}

impl ClientError {
    /// HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
