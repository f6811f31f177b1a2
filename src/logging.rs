//! Tracing subscriber setup for the server and the admin CLI.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::{AcademyError, Result};

/// Map a configured level name to a tracing level. Unknown names mean INFO.
fn level_from_name(name: &str) -> Level {
    name.trim().parse().unwrap_or(Level::INFO)
}

/// Filter for the configured level.
///
/// `RUST_LOG` replaces it entirely when set. Otherwise sqlx statement
/// logging is held at WARN so per-request queries stay out of the log.
fn build_filter(name: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = level_from_name(name);
    EnvFilter::new(format!("{level},sqlx=warn"))
}

/// Log to stdout and append to the configured file.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let path = Path::new(&config.file);
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::registry()
        .with(build_filter(&config.level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout.and(Arc::new(file)))
                .with_ansi(false),
        )
        .try_init()
        .map_err(|e| AcademyError::Config(format!("logging already initialized: {e}")))
}

/// Console logging only. Used when the log file cannot be opened.
pub fn init_console_only(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(build_filter(level))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
