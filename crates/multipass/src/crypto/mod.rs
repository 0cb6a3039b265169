//! Primitives behind a Multipass token: key derivation, AES-128-CBC, and
//! HMAC-SHA256.
//!
//! This module is free of encoding and I/O concerns. It exposes the three
//! cryptographic stages the token layer wires together.
//!
//! # Key schedule
//!
//! ```text
//! SHA-256(secret) = encryption_key[0..16) || signature_key[16..32)
//! ```
//!
//! # Frame layout
//!
//! ```text
//! IV (16) || AES-128-CBC-PKCS7(payload) (16·n) || HMAC-SHA256(IV || ciphertext) (32)
//! ```
//!
//! All lengths below are read off the primitives' declared sizes so that a
//! change of digest or cipher moves the key split with it.

pub mod cipher;
pub mod entropy;
pub mod kdf;
pub mod mac;

use aes::cipher::{typenum::Unsigned, BlockSizeUser, KeySizeUser};
use aes::Aes128;
use sha2::{digest::OutputSizeUser, Sha256};

pub use entropy::{EntropySource, OsEntropy};
pub use kdf::DerivedKeys;

/// Byte length of the SHA-256 digest the keys are sliced from.
pub const DIGEST_LEN: usize = <Sha256 as OutputSizeUser>::OutputSize::USIZE;

/// Byte length of the AES-128 key: the leading slice of the digest.
pub const ENCRYPTION_KEY_LEN: usize = <Aes128 as KeySizeUser>::KeySize::USIZE;

/// Byte length of the HMAC key: the rest of the digest.
pub const SIGNATURE_KEY_LEN: usize = DIGEST_LEN - ENCRYPTION_KEY_LEN;

/// AES block size; also the IV length for CBC.
pub const BLOCK_LEN: usize = <Aes128 as BlockSizeUser>::BlockSize::USIZE;

pub const IV_LEN: usize = BLOCK_LEN;

/// HMAC-SHA256 tags are as long as the underlying digest.
pub const TAG_LEN: usize = DIGEST_LEN;

// The two keys must tile the digest exactly.
const _: () = assert!(ENCRYPTION_KEY_LEN > 0 && SIGNATURE_KEY_LEN > 0);
const _: () = assert!(ENCRYPTION_KEY_LEN + SIGNATURE_KEY_LEN == DIGEST_LEN);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_match_the_wire_format() {
        assert_eq!(DIGEST_LEN, 32);
        assert_eq!(ENCRYPTION_KEY_LEN, 16);
        assert_eq!(SIGNATURE_KEY_LEN, 16);
        assert_eq!(IV_LEN, 16);
        assert_eq!(TAG_LEN, 32);
    }
}
