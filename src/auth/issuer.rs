//! Session issuer: turns a verified credential into a signed token.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info};

use super::principal::{Principal, PrincipalKind, SessionPolicies};
use super::store::{CredentialError, CredentialStore};
use super::token::{SessionClaims, TokenKeys};

/// Login errors.
#[derive(Error, Debug)]
pub enum LoginError {
    /// Identifier or secret missing from the request.
    #[error("identifier and secret are required")]
    MissingCredentials,

    /// Unknown principal or wrong secret. Deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Storage or signing failure.
    #[error("login failed: {0}")]
    Internal(String),
}

/// A freshly issued session.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub principal: Principal,
    pub expires_at: DateTime<Utc>,
}

/// Verifies credentials and mints session tokens.
#[derive(Clone, Debug)]
pub struct SessionIssuer {
    store: CredentialStore,
    keys: TokenKeys,
    policies: SessionPolicies,
}

impl SessionIssuer {
    pub fn new(store: CredentialStore, keys: TokenKeys, policies: SessionPolicies) -> Self {
        Self {
            store,
            keys,
            policies,
        }
    }

    /// Log a principal in at the current time.
    pub async fn login(
        &self,
        kind: PrincipalKind,
        external_id: &str,
        secret: &str,
    ) -> Result<IssuedSession, LoginError> {
        self.login_at(kind, external_id, secret, Utc::now()).await
    }

    /// Log a principal in as of `now`.
    pub async fn login_at(
        &self,
        kind: PrincipalKind,
        external_id: &str,
        secret: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedSession, LoginError> {
        let external_id = external_id.trim();
        if external_id.is_empty() || secret.is_empty() {
            return Err(LoginError::MissingCredentials);
        }

        let principal = match self.store.authenticate(kind, external_id, secret).await {
            Ok(principal) => principal,
            Err(CredentialError::NotFound) | Err(CredentialError::InvalidCredential) => {
                info!(kind = %kind, "Login rejected");
                return Err(LoginError::InvalidCredentials);
            }
            Err(e) => {
                error!(kind = %kind, "Login failed: {}", e);
                return Err(LoginError::Internal(e.to_string()));
            }
        };

        self.store.touch_activity(kind, principal.id(), now).await;

        let ttl = i64::try_from(self.policies.get(kind).token_ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = SessionClaims::for_principal(&principal, now, ttl);
        let token = self.keys.encode(&claims).map_err(|e| {
            error!("Failed to encode JWT: {}", e);
            LoginError::Internal(e.to_string())
        })?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0).unwrap_or(now);

        info!(kind = %kind, id = principal.id(), "Login successful");
        Ok(IssuedSession {
            token,
            principal,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::tests::seeded_store;

    async fn issuer() -> (SessionIssuer, TokenKeys) {
        let keys = TokenKeys::new("test-secret");
        let issuer = SessionIssuer::new(
            seeded_store().await,
            keys.clone(),
            SessionPolicies::default(),
        );
        (issuer, keys)
    }

    #[tokio::test]
    async fn test_admin_login_issues_eight_hour_token() {
        let (issuer, keys) = issuer().await;
        let now = Utc::now();

        let session = issuer
            .login_at(PrincipalKind::Admin, "a@x.com", "pw1234", now)
            .await
            .unwrap();

        let claims = keys.decode(&session.token, now).unwrap();
        assert_eq!(claims.kind, PrincipalKind::Admin);
        assert_eq!(claims.sub, session.principal.id());
        assert_eq!(claims.exp - claims.iat, 8 * 3600);
        assert_eq!(session.expires_at.timestamp(), claims.exp);
    }

    #[tokio::test]
    async fn test_student_login_issues_day_token() {
        let (issuer, keys) = issuer().await;
        let now = Utc::now();

        let session = issuer
            .login_at(PrincipalKind::Student, "S001", "stud123", now)
            .await
            .unwrap();

        let claims = keys.decode(&session.token, now).unwrap();
        assert_eq!(claims.kind, PrincipalKind::Student);
        assert_eq!(claims.student_id.as_deref(), Some("S001"));
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[tokio::test]
    async fn test_login_failures_are_uniform() {
        let (issuer, _) = issuer().await;

        let wrong = issuer
            .login(PrincipalKind::Admin, "a@x.com", "wrong1")
            .await;
        let unknown = issuer
            .login(PrincipalKind::Admin, "nobody@x.com", "pw1234")
            .await;

        assert!(matches!(wrong, Err(LoginError::InvalidCredentials)));
        assert!(matches!(unknown, Err(LoginError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_missing_fields() {
        let (issuer, _) = issuer().await;

        assert!(matches!(
            issuer.login(PrincipalKind::Admin, "", "pw1234").await,
            Err(LoginError::MissingCredentials)
        ));
        assert!(matches!(
            issuer.login(PrincipalKind::Student, "S001", "").await,
            Err(LoginError::MissingCredentials)
        ));
    }

    #[tokio::test]
    async fn test_login_records_activity() {
        let (issuer, _) = issuer().await;
        let at = Utc::now() - chrono::Duration::minutes(5);

        issuer
            .login_at(PrincipalKind::Admin, "a@x.com", "pw1234", at)
            .await
            .unwrap();

        let active = issuer
            .store
            .find_active(PrincipalKind::Admin, 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(active.last_activity.timestamp(), at.timestamp());
    }
}
