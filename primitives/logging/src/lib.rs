#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Logging utilities shared by the tradewire crates.
//!
//! Library code emits `tracing` events; applications call [`init`] (or
//! [`init_with_file`]) once to install a subscriber.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Errors raised while installing the subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The configured level is not a valid filter directive
    #[error("Invalid log filter '{0}': {1}")]
    Filter(String, String),
    /// The log file could not be opened
    #[error("Failed to open log file: {0}")]
    File(#[from] std::io::Error),
    /// A global subscriber is already installed
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Emits a trace event tagged with a component prefix.
pub fn trace(component: &str, msg: &str) { tracing::trace!(component = component, "{}", msg); }

/// Build the filter: `RUST_LOG` wins over the configured level.
fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| LoggingError::Filter(level.to_string(), e.to_string())),
    }
}

/// Install a stderr subscriber at `level` (e.g. `"info"`, `"tradewire=debug"`).
pub fn init(level: &str) -> Result<(), LoggingError> {
    let filter = build_filter(level)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))
}

/// Install a subscriber at `level`, appending to `file` when given.
pub fn init_with_file(level: &str, file: Option<&Path>) -> Result<(), LoggingError> {
    let Some(path) = file else {
        return init(level);
    };
    let filter = build_filter(level)?;
    let writer = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(writer))
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_is_rejected() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let err = build_filter("not a [valid filter").expect_err("filter should be rejected");
        assert!(matches!(err, LoggingError::Filter(..)));
    }

    #[test]
    fn test_init_with_missing_directory_fails() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("missing").join("tradewire.log");
        let err = init_with_file("info", Some(&path)).expect_err("parent directory is missing");
        assert!(matches!(err, LoggingError::File(_) | LoggingError::Filter(..)));
    }

    #[test]
    fn test_trace_without_subscriber() { trace("TEST", "no subscriber installed"); }
}
