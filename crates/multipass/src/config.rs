//! Configuration loading and validation for the multipass CLI.
//!
//! All values are read from `MULTIPASS_*` environment variables. The process
//! exits with a clear error message if any required variable is missing or
//! invalid.

use std::time::Duration;

use anyhow::{Context, Result};
use common::SharedSecret;
use serde::Deserialize;

use crate::token::{PaddingMode, TokenBuilder, TokenReader};

/// Upper bound on the pause before retrying a failed IV draw.
const MAX_RANDOM_RETRY_DELAY_MS: u64 = 1_000;

/// Validated multipass configuration.
///
/// `Debug` is safe to log: the secret is redacted.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Multipass secret shared with the receiving store. **Required.**
    pub secret: SharedSecret,

    /// Tracing log level (e.g. `"warn"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether emitted tokens keep base64 `=` padding.
    #[serde(default)]
    pub padding: PaddingMode,

    /// Pause (milliseconds) before the single retry of a failed IV draw.
    #[serde(default = "default_random_retry_delay_ms")]
    pub random_retry_delay_ms: u64,
}

fn default_log_level() -> String {
    "warn".into()
}
fn default_random_retry_delay_ms() -> u64 {
    25
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::load(config::Environment::with_prefix("MULTIPASS"))
    }

    fn load(env: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(env)
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.secret.is_empty() {
            anyhow::bail!("MULTIPASS_SECRET is required and must not be empty");
        }
        if self.random_retry_delay_ms > MAX_RANDOM_RETRY_DELAY_MS {
            anyhow::bail!(
                "MULTIPASS_RANDOM_RETRY_DELAY_MS must be <= {MAX_RANDOM_RETRY_DELAY_MS}"
            );
        }
        Ok(())
    }

    /// A [`TokenBuilder`] keyed and tuned from this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if key derivation fails.
    pub fn token_builder(&self) -> Result<TokenBuilder> {
        let builder = TokenBuilder::new(&self.secret).context("failed to derive multipass keys")?;
        Ok(builder
            .with_padding(self.padding)
            .with_retry_delay(Duration::from_millis(self.random_retry_delay_ms)))
    }

    /// A [`TokenReader`] keyed from this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if key derivation fails.
    pub fn token_reader(&self) -> Result<TokenReader> {
        TokenReader::new(&self.secret).context("failed to derive multipass keys")
    }
}
