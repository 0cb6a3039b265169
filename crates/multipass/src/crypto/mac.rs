//! HMAC-SHA256 over the encrypted frame.
//!
//! The signed range is always `IV || ciphertext`. Signing the ciphertext alone
//! would let an attacker swap the IV, which under CBC rewrites the first
//! plaintext block without detection.

use common::MultipassError;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::TAG_LEN;

type HmacSha256 = Hmac<Sha256>;

/// Authentication tag over an encrypted frame.
pub type Tag = [u8; TAG_LEN];

/// Compute the tag for `data` under `key`.
///
/// # Errors
///
/// Returns [`MultipassError::AlgorithmUnavailable`] if the MAC refuses the key.
pub fn sign(data: &[u8], key: &[u8]) -> Result<Tag, MultipassError> {
    let mut mac = build_mac(key)?;
    mac.update(data);
    let out = mac.finalize().into_bytes();

    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&out);
    Ok(tag)
}

/// Check `tag` against `data` in constant time.
///
/// # Errors
///
/// Returns [`MultipassError::SignatureMismatch`] if the tag does not verify.
pub fn verify(data: &[u8], key: &[u8], tag: &[u8]) -> Result<(), MultipassError> {
    let mut mac = build_mac(key)?;
    mac.update(data);
    mac.verify_slice(tag)
        .map_err(|_| MultipassError::SignatureMismatch)
}

fn build_mac(key: &[u8]) -> Result<HmacSha256, MultipassError> {
    <HmacSha256 as Mac>::new_from_slice(key)
        .map_err(|e| MultipassError::AlgorithmUnavailable(format!("HMAC-SHA256: {e}")))
}
