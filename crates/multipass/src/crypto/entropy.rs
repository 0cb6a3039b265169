//! Source of IV bytes.
//!
//! Production code draws from the OS CSPRNG via [`OsEntropy`]. The trait exists
//! so tests can pin the IV or simulate a starved random source.

use common::MultipassError;
use rand::{rngs::OsRng, TryRngCore};

/// Fills buffers with cryptographically secure random bytes.
#[cfg_attr(test, mockall::automock)]
pub trait EntropySource {
    /// Fill `dest` completely.
    ///
    /// # Errors
    ///
    /// Returns [`MultipassError::RandomSource`] if the source cannot supply entropy.
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), MultipassError>;
}

/// The operating system's CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), MultipassError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| MultipassError::RandomSource(e.to_string()))
    }
}
