//! URL-safe base64 transport encoding.

use std::fmt;

use base64::{
    alphabet,
    engine::{
        general_purpose::{URL_SAFE, URL_SAFE_NO_PAD},
        DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig,
    },
    Engine as _,
};
use common::MultipassError;
use serde::Deserialize;

use super::frame::{CipherFrame, SignedFrame};
use crate::crypto::{cipher::Iv, mac::Tag, IV_LEN, TAG_LEN};

/// Decoder that takes tokens with or without trailing `=`.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Whether emitted tokens keep base64 `=` padding.
///
/// `Padded` matches the reference receiver and is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaddingMode {
    #[default]
    Padded,
    Unpadded,
}

impl PaddingMode {
    fn engine(self) -> &'static GeneralPurpose {
        match self {
            PaddingMode::Padded => &URL_SAFE,
            PaddingMode::Unpadded => &URL_SAFE_NO_PAD,
        }
    }
}

/// An encoded Multipass token. Uses only `[A-Za-z0-9_-]` plus optional `=`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Concatenate `iv || ciphertext || tag` and encode it.
pub fn encode(iv: &Iv, ciphertext: &[u8], tag: &Tag, padding: PaddingMode) -> Token {
    encode_frame(&SignedFrame::new(&CipherFrame::new(iv, ciphertext), tag), padding)
}

pub fn encode_frame(frame: &SignedFrame, padding: PaddingMode) -> Token {
    Token(padding.engine().encode(frame.as_bytes()))
}

/// Decode a token back to its raw frame bytes.
///
/// # Errors
///
/// Returns [`MultipassError::MalformedToken`] if `token` is not URL-safe base64.
/// Tokens using the standard `+` / `/` alphabet are rejected.
pub fn decode(token: &str) -> Result<Vec<u8>, MultipassError> {
    URL_SAFE_LENIENT
        .decode(token.trim())
        .map_err(|e| MultipassError::MalformedToken(format!("invalid base64: {e}")))
}

/// Length of the encoded token for a frame around `ciphertext_len` bytes.
///
/// Returns `None` only on arithmetic overflow.
pub fn encoded_len(ciphertext_len: usize, padding: PaddingMode) -> Option<usize> {
    let frame_len = IV_LEN.checked_add(ciphertext_len)?.checked_add(TAG_LEN)?;
    base64::encoded_len(frame_len, padding == PaddingMode::Padded)
}
