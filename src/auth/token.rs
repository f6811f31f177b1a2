//! Session token encoding and verification (HS256 JWT).
//!
//! Expiry is checked against a caller-supplied clock rather than the
//! library's, so issue and verification share one notion of "now".

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::principal::{Principal, PrincipalKind};

/// Token errors.
#[derive(Error, Debug)]
pub enum TokenError {
    /// Signing failed.
    #[error("failed to encode token: {0}")]
    Encode(String),

    /// Malformed token or bad signature.
    #[error("invalid token")]
    Invalid,

    /// Token is past its expiry.
    #[error("token expired")]
    Expired,
}

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    /// Principal row ID.
    pub sub: i64,
    pub kind: PrincipalKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expires at (unix seconds).
    pub exp: i64,
    /// Unique token ID.
    pub jti: String,
}

impl SessionClaims {
    /// Claims for a principal, valid from `now` for `ttl_secs`.
    pub fn for_principal(principal: &Principal, now: DateTime<Utc>, ttl_secs: i64) -> Self {
        let iat = now.timestamp();
        let (email, role, student_id) = match principal {
            Principal::Admin(admin) => (Some(admin.email.clone()), Some(admin.role.clone()), None),
            Principal::Student(student) => (None, None, Some(student.student_id.clone())),
        };

        Self {
            sub: principal.id(),
            kind: principal.kind(),
            email,
            role,
            student_id,
            iat,
            exp: iat.saturating_add(ttl_secs),
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Whether the token is expired at `now`. A token is valid strictly
    /// before `exp`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// Signing and verification keys derived from the server secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenKeys {
    /// Create keys from a shared secret.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Sign claims into a compact token.
    pub fn encode(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Verify signature and expiry.
    pub fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| {
                tracing::debug!("JWT validation failed: {}", e);
                TokenError::Invalid
            },
        )?;

        if data.claims.is_expired(now) {
            return Err(TokenError::Expired);
        }
        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys").finish_non_exhaustive()
    }
}
