//! File logging.
//!
//! The terminal belongs to the UI, so tracing output goes to a daily-rolled
//! file under `$BIOLOCK_HOME/logs`. `RUST_LOG` overrides the configured
//! filter. Secrets are never passed to tracing macros.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
pub use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, paths};

const LOG_FILE_PREFIX: &str = "biolock.log";

/// Installs the global subscriber writing to the default logs directory.
///
/// Keep the returned guard alive for the lifetime of the process; dropping
/// it flushes and stops the background writer.
///
/// # Errors
/// Returns an error if the log directory cannot be created, the filter is
/// invalid, or a global subscriber is already installed.
pub fn init_logging(config: &Config) -> Result<WorkerGuard> {
    init_logging_in(&paths::logs_dir(), &config.log_level)
}

/// Installs the global subscriber writing into `dir`.
///
/// # Errors
/// See [`init_logging`].
pub fn init_logging_in(dir: &Path, default_filter: &str) -> Result<WorkerGuard> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let filter = build_filter(std::env::var("RUST_LOG").ok().as_deref(), default_filter)?;
    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow::anyhow!("Failed to install log subscriber: {err}"))?;

    tracing::debug!(dir = %dir.display(), "logging initialized");
    Ok(guard)
}

/// Prefers a non-empty `RUST_LOG` value over the configured default.
fn build_filter(env: Option<&str>, default_filter: &str) -> Result<EnvFilter> {
    let directive = env
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(default_filter);
    EnvFilter::try_new(directive).with_context(|| format!("Invalid log filter '{directive}'"))
}
