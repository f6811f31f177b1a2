//! Configuration module for the academy backend.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::auth::{PrincipalKind, SessionPolicy};
use crate::{AcademyError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Rate limit for login endpoints (requests per minute per IP).
    #[serde(default = "default_login_rate_limit")]
    pub login_rate_limit: u32,
    /// Key the login limit on `X-Forwarded-For`/`X-Real-IP`. Only enable
    /// behind a reverse proxy that overwrites these headers.
    #[serde(default)]
    pub trust_proxy_headers: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_login_rate_limit() -> u32 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            login_rate_limit: default_login_rate_limit(),
            trust_proxy_headers: false,
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/academy.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/academy.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Session and token configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign session tokens. Required.
    #[serde(default)]
    pub jwt_secret: String,
    /// Administrator token lifetime in seconds.
    #[serde(default = "default_admin_token_ttl")]
    pub admin_token_ttl_secs: u64,
    /// Student token lifetime in seconds.
    #[serde(default = "default_student_token_ttl")]
    pub student_token_ttl_secs: u64,
    /// Administrator inactivity timeout in seconds.
    #[serde(default = "default_admin_idle_timeout")]
    pub admin_idle_timeout_secs: u64,
    /// Student inactivity timeout in seconds (0 = no idle expiry).
    #[serde(default)]
    pub student_idle_timeout_secs: u64,
}

/// Upper bound for configured token lifetimes (one year).
pub const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 3600;

fn default_admin_token_ttl() -> u64 {
    8 * 60 * 60
}

fn default_student_token_ttl() -> u64 {
    24 * 60 * 60
}

fn default_admin_idle_timeout() -> u64 {
    30 * 60
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            admin_token_ttl_secs: default_admin_token_ttl(),
            student_token_ttl_secs: default_student_token_ttl(),
            admin_idle_timeout_secs: default_admin_idle_timeout(),
            student_idle_timeout_secs: 0,
        }
    }
}

impl AuthConfig {
    /// Build the session policy for a principal kind.
    ///
    /// Administrators always carry an idle timeout; a zero value falls back
    /// to the default so the idle window can never be switched off for them.
    pub fn policy(&self, kind: PrincipalKind) -> SessionPolicy {
        match kind {
            PrincipalKind::Admin => {
                let idle = match self.admin_idle_timeout_secs {
                    0 => default_admin_idle_timeout(),
                    secs => secs,
                };
                SessionPolicy::new(Duration::from_secs(self.admin_token_ttl_secs))
                    .with_idle_timeout(Duration::from_secs(idle))
            }
            PrincipalKind::Student => {
                let policy =
                    SessionPolicy::new(Duration::from_secs(self.student_token_ttl_secs));
                match self.student_idle_timeout_secs {
                    0 => policy,
                    secs => policy.with_idle_timeout(Duration::from_secs(secs)),
                }
            }
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Session configuration.
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(AcademyError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| AcademyError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `ACADEMY_JWT_SECRET`: token signing secret
    /// - `ACADEMY_DATABASE_PATH`: SQLite database path
    pub fn apply_env_overrides(&mut self) {
        if let Ok(jwt_secret) = std::env::var("ACADEMY_JWT_SECRET") {
            if !jwt_secret.is_empty() {
                self.auth.jwt_secret = jwt_secret;
            }
        }
        if let Ok(path) = std::env::var("ACADEMY_DATABASE_PATH") {
            if !path.is_empty() {
                self.database.path = path;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// A missing signing secret is a startup failure; there is no fallback.
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(AcademyError::Config(
                "jwt_secret is not set. \
                 Set [auth].jwt_secret in config.toml or the ACADEMY_JWT_SECRET environment variable."
                    .to_string(),
            ));
        }
        for ttl in [self.auth.admin_token_ttl_secs, self.auth.student_token_ttl_secs] {
            if ttl == 0 || ttl > MAX_TOKEN_TTL_SECS {
                return Err(AcademyError::Config(format!(
                    "token lifetimes must be between 1 and {MAX_TOKEN_TTL_SECS} seconds"
                )));
            }
        }
        Ok(())
    }
}
