//! Authentication core.
//!
//! Password hashing, the credential store, the session issuer and the
//! per-request session guard, shared by administrators and students.

mod guard;
mod issuer;
mod password;
mod principal;
mod store;
mod token;

pub use guard::{Denial, SessionGuard};
pub use issuer::{IssuedSession, LoginError, SessionIssuer};
pub use password::{
    hash_password, validate_password, verify_password, PasswordError, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH,
};
pub use principal::{
    AdminSummary, Principal, PrincipalKind, SessionPolicies, SessionPolicy, StudentSummary,
};
pub use store::{ActivePrincipal, CredentialError, CredentialStore};
pub use token::{SessionClaims, TokenError, TokenKeys};
