//! Tracing subscriber initialisation.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Initialise the global tracing subscriber.
///
/// Emits JSON lines to stderr, filtered by `RUST_LOG` if set and `log_level`
/// otherwise.
///
/// # Errors
///
/// Returns an error if `log_level` is not a valid filter directive or a global
/// subscriber is already installed.
pub fn init_telemetry(log_level: &str) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level directive {log_level:?}"))?,
    };

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise tracing subscriber: {e}"))
}
