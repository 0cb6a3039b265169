//! Common error types shared across crates.

use thiserror::Error;

/// Errors produced while building or opening a Multipass token.
///
/// Variants map to process exit codes returned by the CLI:
/// - [`MultipassError::Encoding`] → 65
/// - [`MultipassError::AlgorithmUnavailable`] → 69
/// - [`MultipassError::CipherInit`] → 70
/// - [`MultipassError::RandomSource`] → 71
/// - [`MultipassError::MalformedToken`], [`MultipassError::SignatureMismatch`],
///   [`MultipassError::Decryption`] → 76
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MultipassError {
    /// The secret or payload could not be turned into bytes.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A required hash, cipher, or MAC primitive refused to initialise.
    #[error("algorithm unavailable: {0}")]
    AlgorithmUnavailable(String),

    /// Key material has the wrong length for the cipher.
    #[error("cipher init failed: expected {expected}-byte key, got {actual} bytes")]
    CipherInit { expected: usize, actual: usize },

    /// The secure random source could not supply an IV.
    #[error("random source failure: {0}")]
    RandomSource(String),

    /// The token is not valid base64 or is too short to contain a frame.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// The trailing tag does not authenticate `IV || ciphertext`.
    #[error("token signature mismatch")]
    SignatureMismatch,

    /// The ciphertext authenticated but could not be decrypted or unpadded.
    #[error("token decryption failed")]
    Decryption,
}

impl MultipassError {
    /// Whether a single retry after a short delay may succeed.
    ///
    /// Only entropy starvation is transient; everything else is a programming
    /// or configuration fault.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MultipassError::RandomSource(_))
    }

    /// Returns the process exit code the CLI should use for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            MultipassError::Encoding(_) => 65,
            MultipassError::AlgorithmUnavailable(_) => 69,
            MultipassError::CipherInit { .. } => 70,
            MultipassError::RandomSource(_) => 71,
            MultipassError::MalformedToken(_)
            | MultipassError::SignatureMismatch
            | MultipassError::Decryption => 76,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(MultipassError::Encoding("x".into()).exit_code(), 65);
        assert_eq!(
            MultipassError::AlgorithmUnavailable("x".into()).exit_code(),
            69
        );
        assert_eq!(
            MultipassError::CipherInit {
                expected: 16,
                actual: 15
            }
            .exit_code(),
            70
        );
        assert_eq!(MultipassError::RandomSource("x".into()).exit_code(), 71);
        assert_eq!(MultipassError::SignatureMismatch.exit_code(), 76);
    }

    #[test]
    fn only_random_source_is_retryable() {
        assert!(MultipassError::RandomSource("starved".into()).is_retryable());
        assert!(!MultipassError::Encoding("x".into()).is_retryable());
        assert!(!MultipassError::CipherInit {
            expected: 16,
            actual: 0
        }
        .is_retryable());
        assert!(!MultipassError::Decryption.is_retryable());
    }

    #[test]
    fn display_includes_key_lengths() {
        let e = MultipassError::CipherInit {
            expected: 16,
            actual: 32,
        };
        let msg = e.to_string();
        assert!(msg.contains("16"));
        assert!(msg.contains("32"));
    }
}
