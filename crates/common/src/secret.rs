//! The shared secret both ends of a Multipass handoff hold.

use std::fmt;

use serde::Deserialize;

use crate::error::MultipassError;

/// Opaque shared secret supplied by the store admin.
///
/// `Debug` is redacted so the value never reaches logs or panic messages.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SharedSecret(String);

impl SharedSecret {
    /// Wrap a secret that is already text.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Wrap a secret read as raw bytes, e.g. from a file or an `OsString`.
    ///
    /// # Errors
    ///
    /// Returns [`MultipassError::Encoding`] if `bytes` is not valid UTF-8.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, MultipassError> {
        String::from_utf8(bytes)
            .map(Self)
            .map_err(|e| MultipassError::Encoding(format!("secret is not valid UTF-8: {e}")))
    }

    /// UTF-8 bytes of the secret, as fed to the key derivation.
    pub fn expose_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret([REDACTED])")
    }
}
