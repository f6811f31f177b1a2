//! Session guard: per-request token and idle-policy check.
//!
//! Order of checks:
//! 1. a bearer token is present
//! 2. signature and expiry verify, and the token is for the guarded kind
//! 3. the principal still exists and is active
//! 4. the session is not idle under the kind's policy
//!
//! Token expiry is decided before the store is consulted. On success the
//! activity timestamp is refreshed for kinds with an idle policy.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, error};

use super::principal::{Principal, PrincipalKind, SessionPolicies};
use super::store::CredentialStore;
use super::token::TokenKeys;

/// Why a request was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    #[error("no token provided")]
    NoToken,

    #[error("invalid token")]
    InvalidToken,

    #[error("principal not found or inactive")]
    PrincipalGone,

    #[error("session expired due to inactivity")]
    SessionExpired,

    /// Store unavailable; not the client's fault.
    #[error("guard failure: {0}")]
    Internal(String),
}

impl Denial {
    /// Client-facing message for a denial on a route guarded for `kind`.
    pub fn message(&self, kind: PrincipalKind) -> &'static str {
        match (self, kind) {
            (Denial::NoToken, PrincipalKind::Admin) => "Admin access required",
            (Denial::NoToken, PrincipalKind::Student) => "Access denied",
            (Denial::InvalidToken, _) => "Invalid token",
            (Denial::PrincipalGone, PrincipalKind::Admin) => "Admin not found or inactive",
            (Denial::PrincipalGone, PrincipalKind::Student) => "Student not found or inactive",
            (Denial::SessionExpired, _) => "Session expired due to inactivity",
            (Denial::Internal(_), _) => "Internal server error",
        }
    }
}

/// Validates bearer tokens against the credential store.
#[derive(Clone, Debug)]
pub struct SessionGuard {
    store: CredentialStore,
    keys: TokenKeys,
    policies: SessionPolicies,
}

impl SessionGuard {
    pub fn new(store: CredentialStore, keys: TokenKeys, policies: SessionPolicies) -> Self {
        Self {
            store,
            keys,
            policies,
        }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Check a presented token for `kind` at the current time.
    pub async fn check(&self, kind: PrincipalKind, token: Option<&str>) -> Result<Principal, Denial> {
        self.check_at(kind, token, Utc::now()).await
    }

    /// Check a presented token for `kind` as of `now`.
    pub async fn check_at(
        &self,
        kind: PrincipalKind,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Principal, Denial> {
        let token = token.map(str::trim).filter(|t| !t.is_empty());
        let Some(token) = token else {
            return Err(Denial::NoToken);
        };

        let claims = self.keys.decode(token, now).map_err(|e| {
            debug!(kind = %kind, "Token rejected: {}", e);
            Denial::InvalidToken
        })?;
        if claims.kind != kind {
            debug!(expected = %kind, actual = %claims.kind, "Token kind mismatch");
            return Err(Denial::InvalidToken);
        }

        let active = self
            .store
            .find_active(kind, claims.sub)
            .await
            .map_err(|e| {
                error!(kind = %kind, id = claims.sub, "Guard lookup failed: {}", e);
                Denial::Internal(e.to_string())
            })?
            .ok_or(Denial::PrincipalGone)?;

        let policy = self.policies.get(kind);
        if policy.is_idle(active.last_activity, now) {
            debug!(kind = %kind, id = claims.sub, "Session idle past timeout");
            return Err(Denial::SessionExpired);
        }

        if policy.idle_timeout.is_some() {
            self.store.touch_activity(kind, claims.sub, now).await;
        }

        Ok(active.principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::tests::seeded_store;
    use crate::auth::token::SessionClaims;
    use crate::auth::SessionIssuer;
    use crate::db::{AdminRepository, StudentRepository};
    use chrono::Duration;

    struct Fixture {
        issuer: SessionIssuer,
        guard: SessionGuard,
        store: CredentialStore,
        keys: TokenKeys,
    }

    async fn fixture_with(policies: SessionPolicies) -> Fixture {
        let store = seeded_store().await;
        let keys = TokenKeys::new("test-secret");
        Fixture {
            issuer: SessionIssuer::new(store.clone(), keys.clone(), policies),
            guard: SessionGuard::new(store.clone(), keys.clone(), policies),
            store,
            keys,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with(SessionPolicies::default()).await
    }

    async fn admin_token(f: &Fixture, at: DateTime<Utc>) -> String {
        f.issuer
            .login_at(PrincipalKind::Admin, "a@x.com", "pw1234", at)
            .await
            .unwrap()
            .token
    }

    #[tokio::test]
    async fn test_missing_token() {
        let f = fixture().await;
        assert_eq!(
            f.guard.check(PrincipalKind::Admin, None).await,
            Err(Denial::NoToken)
        );
        assert_eq!(
            f.guard.check(PrincipalKind::Student, Some("  ")).await,
            Err(Denial::NoToken)
        );
    }

    #[tokio::test]
    async fn test_valid_admin_token_granted_and_touches() {
        let f = fixture().await;
        let t0 = Utc::now();
        let token = admin_token(&f, t0).await;

        let later = t0 + Duration::minutes(10);
        let principal = f
            .guard
            .check_at(PrincipalKind::Admin, Some(&token), later)
            .await
            .unwrap();
        assert_eq!(principal.external_id(), "a@x.com");

        let active = f
            .store
            .find_active(PrincipalKind::Admin, principal.id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(active.last_activity.timestamp(), later.timestamp());
    }

    #[tokio::test]
    async fn test_activity_extends_session() {
        let f = fixture().await;
        let t0 = Utc::now();
        let token = admin_token(&f, t0).await;

        // Each request lands inside the idle window of the previous one.
        for minutes in [20, 40, 60, 80] {
            let at = t0 + Duration::minutes(minutes);
            assert!(f
                .guard
                .check_at(PrincipalKind::Admin, Some(&token), at)
                .await
                .is_ok());
        }
    }

    #[tokio::test]
    async fn test_idle_admin_session_expires() {
        let f = fixture().await;
        let t0 = Utc::now();
        let token = admin_token(&f, t0).await;

        let result = f
            .guard
            .check_at(PrincipalKind::Admin, Some(&token), t0 + Duration::minutes(31))
            .await;
        assert_eq!(result, Err(Denial::SessionExpired));
    }

    #[tokio::test]
    async fn test_idle_boundary_inclusive() {
        let f = fixture().await;
        let t0 = Utc::now();
        let token = admin_token(&f, t0).await;
        f.store.touch_activity(PrincipalKind::Admin, 1, t0).await;

        assert!(f
            .guard
            .check_at(PrincipalKind::Admin, Some(&token), t0 + Duration::minutes(30))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_expired_token_rejected_before_store() {
        let f = fixture().await;
        let t0 = Utc::now();
        let token = admin_token(&f, t0).await;

        // Deactivating the admin would yield PrincipalGone if the store were
        // consulted; an expired token must still report InvalidToken.
        AdminRepository::new(f.store.database().pool())
            .set_active(1, false)
            .await
            .unwrap();

        let result = f
            .guard
            .check_at(PrincipalKind::Admin, Some(&token), t0 + Duration::hours(9))
            .await;
        assert_eq!(result, Err(Denial::InvalidToken));
    }

    #[tokio::test]
    async fn test_student_token_lifetime() {
        let f = fixture().await;
        let t0 = Utc::now();
        let token = f
            .issuer
            .login_at(PrincipalKind::Student, "S001", "stud123", t0)
            .await
            .unwrap()
            .token;

        assert!(f
            .guard
            .check_at(PrincipalKind::Student, Some(&token), t0 + Duration::hours(23))
            .await
            .is_ok());
        assert_eq!(
            f.guard
                .check_at(PrincipalKind::Student, Some(&token), t0 + Duration::hours(25))
                .await,
            Err(Denial::InvalidToken)
        );
    }

    #[tokio::test]
    async fn test_deactivated_principal_gone() {
        let f = fixture().await;
        let t0 = Utc::now();
        let token = admin_token(&f, t0).await;

        AdminRepository::new(f.store.database().pool())
            .set_active(1, false)
            .await
            .unwrap();

        let result = f.guard.check_at(PrincipalKind::Admin, Some(&token), t0).await;
        assert_eq!(result, Err(Denial::PrincipalGone));
    }

    #[tokio::test]
    async fn test_cross_kind_token_rejected() {
        let f = fixture().await;
        let t0 = Utc::now();
        let admin = admin_token(&f, t0).await;
        let student = f
            .issuer
            .login_at(PrincipalKind::Student, "S001", "stud123", t0)
            .await
            .unwrap()
            .token;

        assert_eq!(
            f.guard.check_at(PrincipalKind::Student, Some(&admin), t0).await,
            Err(Denial::InvalidToken)
        );
        assert_eq!(
            f.guard.check_at(PrincipalKind::Admin, Some(&student), t0).await,
            Err(Denial::InvalidToken)
        );
    }

    #[tokio::test]
    async fn test_forged_signature_rejected() {
        let f = fixture().await;
        let t0 = Utc::now();
        let principal = f
            .store
            .authenticate(PrincipalKind::Admin, "a@x.com", "pw1234")
            .await
            .unwrap();
        let forged = TokenKeys::new("other-secret")
            .encode(&SessionClaims::for_principal(&principal, t0, 3600))
            .unwrap();

        assert_eq!(
            f.guard.check_at(PrincipalKind::Admin, Some(&forged), t0).await,
            Err(Denial::InvalidToken)
        );
        assert!(f.keys.decode(&forged, t0).is_err());
    }

    #[tokio::test]
    async fn test_student_without_idle_policy_not_touched() {
        let f = fixture().await;
        let t0 = Utc::now();
        let token = f
            .issuer
            .login_at(PrincipalKind::Student, "S001", "stud123", t0)
            .await
            .unwrap()
            .token;

        // Long gaps are fine for students by default.
        let later = t0 + Duration::hours(5);
        let principal = f
            .guard
            .check_at(PrincipalKind::Student, Some(&token), later)
            .await
            .unwrap();

        let student = StudentRepository::new(f.store.database().pool())
            .get_by_id(principal.id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(student.last_activity.timestamp(), t0.timestamp());
    }

    #[tokio::test]
    async fn test_student_idle_policy_when_configured() {
        let mut policies = SessionPolicies::default();
        policies.student = policies
            .student
            .with_idle_timeout(std::time::Duration::from_secs(600));
        let f = fixture_with(policies).await;
        let t0 = Utc::now();
        let token = f
            .issuer
            .login_at(PrincipalKind::Student, "S001", "stud123", t0)
            .await
            .unwrap()
            .token;

        assert_eq!(
            f.guard
                .check_at(PrincipalKind::Student, Some(&token), t0 + Duration::minutes(11))
                .await,
            Err(Denial::SessionExpired)
        );
    }

    #[test]
    fn test_denial_messages() {
        assert_eq!(
            Denial::NoToken.message(PrincipalKind::Admin),
            "Admin access required"
        );
        assert_eq!(Denial::NoToken.message(PrincipalKind::Student), "Access denied");
        assert_eq!(
            Denial::PrincipalGone.message(PrincipalKind::Student),
            "Student not found or inactive"
        );
        assert_eq!(
            Denial::SessionExpired.message(PrincipalKind::Admin),
            "Session expired due to inactivity"
        );
    }
}
