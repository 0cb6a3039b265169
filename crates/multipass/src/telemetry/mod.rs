//! Structured logging for the multipass CLI.
//!
//! # Telemetry invariants
//!
//! - **No secret, key, IV, or payload byte** may appear in any span or log
//!   field. Only stage names and lengths are recorded.
//! - Logs go to stderr; stdout carries nothing but the token or payload.
//! - Log level is configurable via `MULTIPASS_LOG_LEVEL` (default: `warn`);
//!   `RUST_LOG` takes precedence when set.

pub mod init;

pub use init::init_telemetry;
