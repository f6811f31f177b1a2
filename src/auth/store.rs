//! Credential store.
//!
//! Looks up principals by kind, verifies secrets and maintains the
//! per-principal activity timestamp used for idle expiry.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use super::password::{hash_password, verify_password, PasswordError};
use super::principal::{AdminSummary, Principal, PrincipalKind, StudentSummary};
use crate::db::{AdminRepository, Database, NewAdmin, StudentRepository};
use crate::AcademyError;

/// Credential store errors.
#[derive(Error, Debug)]
pub enum CredentialError {
    /// No active principal with that identifier.
    #[error("principal not found")]
    NotFound,

    /// Secret did not verify.
    #[error("invalid credential")]
    InvalidCredential,

    /// An administrator already exists, so bootstrap is closed.
    #[error("admin already exists")]
    AdminExists,

    /// New secret rejected.
    #[error("password error: {0}")]
    Password(#[from] PasswordError),

    /// Underlying storage failure.
    #[error(transparent)]
    Store(#[from] AcademyError),
}

/// A principal re-fetched for the guard, with its activity timestamp.
#[derive(Debug, Clone)]
pub struct ActivePrincipal {
    pub principal: Principal,
    pub last_activity: DateTime<Utc>,
}

/// Principal records and hashed secrets for both kinds.
#[derive(Clone, Debug)]
pub struct CredentialStore {
    db: Database,
}

impl CredentialStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Verify a secret for the active principal with the given external ID.
    ///
    /// Absent and inactive principals both report `NotFound`.
    pub async fn authenticate(
        &self,
        kind: PrincipalKind,
        external_id: &str,
        secret: &str,
    ) -> Result<Principal, CredentialError> {
        let pool = self.db.pool();
        let (principal, hash) = match kind {
            PrincipalKind::Admin => {
                let admin = AdminRepository::new(pool)
                    .get_active_by_email(external_id)
                    .await?
                    .ok_or(CredentialError::NotFound)?;
                (Principal::Admin(AdminSummary::from(&admin)), admin.password)
            }
            PrincipalKind::Student => {
                let student = StudentRepository::new(pool)
                    .get_active_by_student_id(external_id)
                    .await?
                    .ok_or(CredentialError::NotFound)?;
                (
                    Principal::Student(StudentSummary::from(&student)),
                    student.password,
                )
            }
        };

        match verify_password(secret, &hash) {
            Ok(()) => Ok(principal),
            Err(PasswordError::VerificationFailed) => Err(CredentialError::InvalidCredential),
            Err(e) => {
                warn!(kind = %kind, id = principal.id(), "Stored password hash unusable: {}", e);
                Err(CredentialError::InvalidCredential)
            }
        }
    }

    /// Re-fetch an active principal by row ID.
    pub async fn find_active(
        &self,
        kind: PrincipalKind,
        id: i64,
    ) -> Result<Option<ActivePrincipal>, CredentialError> {
        let pool = self.db.pool();
        let found = match kind {
            PrincipalKind::Admin => AdminRepository::new(pool)
                .get_active_by_id(id)
                .await?
                .map(|admin| ActivePrincipal {
                    principal: Principal::Admin(AdminSummary::from(&admin)),
                    last_activity: admin.last_activity,
                }),
            PrincipalKind::Student => StudentRepository::new(pool)
                .get_active_by_id(id)
                .await?
                .map(|student| ActivePrincipal {
                    principal: Principal::Student(StudentSummary::from(&student)),
                    last_activity: student.last_activity,
                }),
        };
        Ok(found)
    }

    /// Record activity for a principal.
    ///
    /// Failures are logged and swallowed; callers never fail on them.
    pub async fn touch_activity(&self, kind: PrincipalKind, id: i64, at: DateTime<Utc>) {
        let pool = self.db.pool();
        let result = match kind {
            PrincipalKind::Admin => AdminRepository::new(pool).touch_activity(id, at).await,
            PrincipalKind::Student => StudentRepository::new(pool).touch_activity(id, at).await,
        };
        if let Err(e) = result {
            warn!(kind = %kind, id, "Failed to record activity: {}", e);
        }
    }

    /// Replace a principal's secret after verifying the current one.
    pub async fn change_secret(
        &self,
        kind: PrincipalKind,
        id: i64,
        current: &str,
        new: &str,
    ) -> Result<(), CredentialError> {
        let pool = self.db.pool();
        let hash = match kind {
            PrincipalKind::Admin => AdminRepository::new(pool)
                .get_active_by_id(id)
                .await?
                .map(|admin| admin.password),
            PrincipalKind::Student => StudentRepository::new(pool)
                .get_active_by_id(id)
                .await?
                .map(|student| student.password),
        }
        .ok_or(CredentialError::NotFound)?;

        verify_password(current, &hash).map_err(|_| CredentialError::InvalidCredential)?;
        let new_hash = hash_password(new)?;

        let updated = match kind {
            PrincipalKind::Admin => {
                AdminRepository::new(pool)
                    .update_password(id, &new_hash)
                    .await?
            }
            PrincipalKind::Student => {
                StudentRepository::new(pool)
                    .update_password(id, &new_hash)
                    .await?
            }
        };
        if !updated {
            return Err(CredentialError::NotFound);
        }

        info!(kind = %kind, id, "Password changed");
        Ok(())
    }

    /// Create the first administrator.
    ///
    /// Refused with `AdminExists` once any administrator row exists.
    pub async fn bootstrap_admin(
        &self,
        email: &str,
        secret: &str,
        name: &str,
    ) -> Result<AdminSummary, CredentialError> {
        let repo = AdminRepository::new(self.db.pool());
        if repo.any_exists().await? {
            return Err(CredentialError::AdminExists);
        }

        // The early check skips hashing; create_first is the real gate.
        let hash = hash_password(secret)?;
        let admin = repo
            .create_first(&NewAdmin::new(email, hash, name))
            .await
            .map_err(|e| match e {
                AcademyError::Conflict(_) => CredentialError::AdminExists,
                other => CredentialError::Store(other),
            })?
            .ok_or(CredentialError::AdminExists)?;

        info!(id = admin.id, email = %admin.email, "Administrator created");
        Ok(AdminSummary::from(&admin))
    }
}
