//! Tracing subscriber setup for binaries and ad-hoc debugging.
//!
//! Installs a global registry with an `EnvFilter` (default `info`, overridable via
//! `RUST_LOG`) and a `fmt` layer writing to stderr.

use std::sync::OnceLock;

use thiserror::Error;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

const DEFAULT_DIRECTIVE: &str = "info";

static INSTALLED: OnceLock<()> = OnceLock::new();

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] TryInitError),
}

/// Install the global subscriber. Subsequent calls are no-ops.
pub fn init() -> Result<(), LoggingError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let stderr_layer = fmt::layer()
        .with_thread_names(true)
        .with_writer(std::io::stderr);

    Registry::default()
        .with(env_filter)
        .with(stderr_layer)
        .try_init()?;
    let _ = INSTALLED.set(());

    tracing::debug!("logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_is_idempotent() {
        // Another test harness subscriber may already be installed; only the
        // second call's behavior is guaranteed.
        let first = super::init();
        if first.is_ok() {
            assert!(super::init().is_ok());
        }
    }
}
