//! Logging configuration using tracing
//!
//! The terminal belongs to the UI, so logs go to a daily rolling file.

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{Error, Result};

pub const LOG_ENV_VAR: &str = "WEBWRIGHT_LOG";
const LOG_FILE_PREFIX: &str = "webwright";
const LOG_FILE_SUFFIX: &str = "log";
/// Days of log files kept on disk
const MAX_LOG_FILES: usize = 7;
const DEFAULT_FILTER: &str = "webwright_core=info,webwright_tui=info,warn";

/// Initialize the logging subsystem
///
/// Logs are written to `{data_local_dir}/webwright/logs/`.
/// Log level is controlled by the `WEBWRIGHT_LOG` environment variable;
/// a directive string that does not parse falls back to the default filter.
///
/// # Examples
/// ```bash
/// WEBWRIGHT_LOG=debug webwright
/// WEBWRIGHT_LOG=webwright_core::generation=trace webwright
/// ```
pub fn init() -> Result<PathBuf> {
    let log_dir = get_log_directory();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(MAX_LOG_FILES)
        .build(&log_dir)
        .map_err(|e| Error::config(format!("cannot open log file: {e}")))?;

    let directives = filter_directives(std::env::var(LOG_ENV_VAR).ok());
    let (env_filter, rejected) = match EnvFilter::try_new(&directives) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new(DEFAULT_FILTER), Some(e)),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    tracing::info!("Webwright v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("Log directory: {}", log_dir.display());
    if let Some(e) = rejected {
        tracing::warn!("Ignoring {}={:?}: {}", LOG_ENV_VAR, directives, e);
    }

    Ok(log_dir)
}

/// The filter to use: the environment's directives unless unset or blank
fn filter_directives(from_env: Option<String>) -> String {
    match from_env {
        Some(value) if !value.trim().is_empty() => value,
        _ => DEFAULT_FILTER.to_string(),
    }
}

fn get_log_directory() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("webwright").join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directives() {
        assert_eq!(filter_directives(None), DEFAULT_FILTER);
        assert_eq!(filter_directives(Some("  ".to_string())), DEFAULT_FILTER);
        assert_eq!(filter_directives(Some("debug".to_string())), "debug");
    }

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn test_log_directory_is_app_scoped() {
        assert!(get_log_directory().ends_with("webwright/logs"));
    }
}
