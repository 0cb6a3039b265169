//! Receiving side: verify a token and recover its payload.
//!
//! The tag is always checked before any decryption is attempted, so a
//! tampered frame never reaches the CBC unpadding step.

use common::{MultipassError, Payload, SharedSecret};
use tracing::debug;

use super::{encoder, frame::TokenParts};
use crate::crypto::{cipher, kdf, mac, DerivedKeys};

/// Opens tokens sealed under a given secret.
#[derive(Debug, Clone)]
pub struct TokenReader {
    keys: DerivedKeys,
}

impl TokenReader {
    /// Derive keys from `secret`.
    ///
    /// # Errors
    ///
    /// Propagates any [`kdf::derive`] failure.
    pub fn new(secret: &SharedSecret) -> Result<Self, MultipassError> {
        kdf::derive(secret).map(Self::from_keys)
    }

    pub fn from_keys(keys: DerivedKeys) -> Self {
        Self { keys }
    }

    /// Decode, authenticate, and decrypt `token`.
    ///
    /// # Errors
    ///
    /// Returns [`MultipassError::MalformedToken`] for bad base64 or framing,
    /// [`MultipassError::SignatureMismatch`] if the tag does not verify, and
    /// [`MultipassError::Decryption`] if an authenticated frame fails to unpad.
    pub fn open(&self, token: &str) -> Result<Payload, MultipassError> {
        let frame = encoder::decode(token)?;
        self.open_frame(&frame)
    }

    /// As [`TokenReader::open`], on already-decoded frame bytes.
    pub fn open_frame(&self, frame: &[u8]) -> Result<Payload, MultipassError> {
        let parts = TokenParts::split(frame)?;
        mac::verify(parts.signed(), self.keys.signature_key(), parts.tag())?;

        let plaintext = cipher::decrypt(&parts.iv(), parts.ciphertext(), self.keys.encryption_key())?;
        debug!(stage = "open", payload_len = plaintext.len(), "multipass token opened");
        Ok(Payload::from(plaintext))
    }
}
