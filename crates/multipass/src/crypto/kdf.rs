//! Shared secret → (encryption key, signature key).

use std::fmt;

use common::{MultipassError, SharedSecret};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::{DIGEST_LEN, ENCRYPTION_KEY_LEN};

/// Key material derived from a [`SharedSecret`].
///
/// Holds the whole digest and hands out the two non-overlapping slices.
/// Cheap to clone and safe to cache: derivation is deterministic, so the
/// receiver re-derives the same bytes from its copy of the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct DerivedKeys {
    digest: [u8; DIGEST_LEN],
}

impl DerivedKeys {
    /// AES key: `digest[0..ENCRYPTION_KEY_LEN)`.
    pub fn encryption_key(&self) -> &[u8] {
        &self.digest[..ENCRYPTION_KEY_LEN]
    }

    /// HMAC key: `digest[ENCRYPTION_KEY_LEN..DIGEST_LEN)`.
    pub fn signature_key(&self) -> &[u8] {
        &self.digest[ENCRYPTION_KEY_LEN..]
    }

    pub fn digest(&self) -> &[u8; DIGEST_LEN] {
        &self.digest
    }
}

impl fmt::Debug for DerivedKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKeys([REDACTED])")
    }
}

/// Hash the UTF-8 bytes of `secret` with SHA-256 and split the digest.
///
/// # Errors
///
/// Returns [`MultipassError::AlgorithmUnavailable`] if the digest primitive
/// produces output of an unexpected length.
pub fn derive(secret: &SharedSecret) -> Result<DerivedKeys, MultipassError> {
    let hash = Sha256::digest(secret.expose_bytes());
    let digest = <[u8; DIGEST_LEN]>::try_from(hash.as_slice()).map_err(|_| {
        MultipassError::AlgorithmUnavailable(format!(
            "SHA-256 returned {} bytes, expected {DIGEST_LEN}",
            hash.len()
        ))
    })?;
    debug!(stage = "derive", "derived multipass keys");
    Ok(DerivedKeys { digest })
}
