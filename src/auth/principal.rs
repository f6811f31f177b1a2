//! Principal kinds, secret-free principal summaries and session policies.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::db::{Admin, Student};

/// The two kinds of authenticatable identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    Admin,
    Student,
}

impl PrincipalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalKind::Admin => "admin",
            PrincipalKind::Student => "student",
        }
    }
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Administrator without its secret.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminSummary {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl From<&Admin> for AdminSummary {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id,
            email: admin.email.clone(),
            name: admin.name.clone(),
            role: admin.role.clone(),
        }
    }
}

/// Student without its secret.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentSummary {
    pub id: i64,
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub course: String,
    pub batch: String,
}

impl From<&Student> for StudentSummary {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id,
            student_id: student.student_id.clone(),
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
            email: student.email.clone(),
            course: student.course.clone(),
            batch: student.batch.clone(),
        }
    }
}

/// An authenticated principal, never carrying a secret.
#[derive(Debug, Clone, PartialEq)]
pub enum Principal {
    Admin(AdminSummary),
    Student(StudentSummary),
}

impl Principal {
    /// Numeric row ID.
    pub fn id(&self) -> i64 {
        match self {
            Principal::Admin(admin) => admin.id,
            Principal::Student(student) => student.id,
        }
    }

    pub fn kind(&self) -> PrincipalKind {
        match self {
            Principal::Admin(_) => PrincipalKind::Admin,
            Principal::Student(_) => PrincipalKind::Student,
        }
    }

    /// External login identifier (email or student ID).
    pub fn external_id(&self) -> &str {
        match self {
            Principal::Admin(admin) => &admin.email,
            Principal::Student(student) => &student.student_id,
        }
    }
}

/// Lifetime rules for one principal kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Absolute token lifetime from issue.
    pub token_ttl: Duration,
    /// Maximum gap between authenticated requests, if enforced.
    pub idle_timeout: Option<Duration>,
}

impl SessionPolicy {
    /// Policy with a token lifetime and no idle timeout.
    pub fn new(token_ttl: Duration) -> Self {
        Self {
            token_ttl,
            idle_timeout: None,
        }
    }

    /// Enforce an idle timeout.
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = Some(idle_timeout);
        self
    }

    /// Whether a session last active at `last_activity` is idle at `now`.
    ///
    /// Expiry is strict: exactly `idle_timeout` after the last activity is
    /// still live.
    pub fn is_idle(&self, last_activity: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let Some(idle) = self.idle_timeout else {
            return false;
        };
        let Ok(idle) = chrono::Duration::from_std(idle) else {
            return false;
        };
        now > last_activity + idle
    }
}

/// Session policies for both principal kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicies {
    pub admin: SessionPolicy,
    pub student: SessionPolicy,
}

impl SessionPolicies {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            admin: config.policy(PrincipalKind::Admin),
            student: config.policy(PrincipalKind::Student),
        }
    }

    pub fn get(&self, kind: PrincipalKind) -> SessionPolicy {
        match kind {
            PrincipalKind::Admin => self.admin,
            PrincipalKind::Student => self.student,
        }
    }
}

impl Default for SessionPolicies {
    /// Admin: 8 hour tokens, 30 minute idle timeout. Student: 24 hour tokens.
    fn default() -> Self {
        Self::from_config(&AuthConfig::default())
    }
}
