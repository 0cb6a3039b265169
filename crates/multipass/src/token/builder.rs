//! Orchestrates derive → encrypt → sign → encode.

use std::{thread, time::Duration};

use common::{MultipassError, Payload, SharedSecret};
use tracing::{debug, warn};

use super::{
    encoder::{self, PaddingMode, Token},
    frame::{CipherFrame, SignedFrame},
};
use crate::crypto::{
    cipher::{self, Iv},
    kdf, mac, DerivedKeys, EntropySource, OsEntropy,
};

/// Default pause before the single retry of a failed IV draw.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(25);

/// Builds tokens from a fixed set of derived keys.
///
/// Keys are derived once in [`TokenBuilder::new`]; each [`TokenBuilder::build`]
/// creates its own cipher and MAC state, so one builder can be shared across
/// threads.
#[derive(Debug, Clone)]
pub struct TokenBuilder {
    keys: DerivedKeys,
    padding: PaddingMode,
    retry_delay: Duration,
}

impl TokenBuilder {
    /// Derive keys from `secret`.
    ///
    /// # Errors
    ///
    /// Propagates any [`kdf::derive`] failure.
    pub fn new(secret: &SharedSecret) -> Result<Self, MultipassError> {
        kdf::derive(secret).map(Self::from_keys)
    }

    pub fn from_keys(keys: DerivedKeys) -> Self {
        Self {
            keys,
            padding: PaddingMode::default(),
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn with_padding(mut self, padding: PaddingMode) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn keys(&self) -> &DerivedKeys {
        &self.keys
    }

    pub fn padding(&self) -> PaddingMode {
        self.padding
    }

    /// Seal `payload` into a token with an IV from the OS CSPRNG.
    ///
    /// # Errors
    ///
    /// Returns the first stage failure. No token is produced on error.
    pub fn build(&self, payload: &Payload) -> Result<Token, MultipassError> {
        self.build_with(payload, &mut OsEntropy)
    }

    /// As [`TokenBuilder::build`], drawing the IV from `rng`.
    pub fn build_with<R>(&self, payload: &Payload, rng: &mut R) -> Result<Token, MultipassError>
    where
        R: EntropySource + ?Sized,
    {
        let (iv, ciphertext) = self.encrypt(payload.as_bytes(), rng)?;
        let frame = CipherFrame::new(&iv, &ciphertext);

        let tag = mac::sign(frame.as_bytes(), self.keys.signature_key())?;
        let signed = SignedFrame::new(&frame, &tag);

        let token = encoder::encode_frame(&signed, self.padding);
        debug!(
            stage = "encode",
            payload_len = payload.len(),
            frame_len = signed.len(),
            token_len = token.len(),
            "multipass token built"
        );
        Ok(token)
    }

    /// Encrypt, retrying once if the random source came up empty.
    fn encrypt<R>(&self, plaintext: &[u8], rng: &mut R) -> Result<(Iv, Vec<u8>), MultipassError>
    where
        R: EntropySource + ?Sized,
    {
        match cipher::encrypt(plaintext, self.keys.encryption_key(), rng) {
            Err(e) if e.is_retryable() => {
                warn!(
                    error = %e,
                    delay_ms = self.retry_delay.as_millis() as u64,
                    "random source failed; retrying once"
                );
                thread::sleep(self.retry_delay);
                cipher::encrypt(plaintext, self.keys.encryption_key(), rng)
            }
            other => other,
        }
    }
}

/// One-shot build: derive keys from `secret` and seal `payload`.
///
/// # Errors
///
/// Returns the first failure from any stage.
pub fn build(secret: &SharedSecret, payload: &Payload) -> Result<Token, MultipassError> {
    TokenBuilder::new(secret)?.build(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::entropy::MockEntropySource;
    use std::collections::HashSet;

    const SECRET: &str = "hard-to-guess-multipass-secret";
    const JSON: &str = r#"{"email":"a@example.com","created_at":"2015-07-24T12:36:40-0400"}"#;

    // IV = 00..0f, payload = JSON, secret = SECRET.
    const PINNED_TOKEN: &str = "AAECAwQFBgcICQoLDA0OD50tPHAHPimWAQDHgzfpCvdUT89htBHnxTc0MrobR4cA8K0owDCM0hqqsX4InzYr0VHir4XRMxuzeHNH6tMtTH0CjitOn8LsU9SqSv8JCsj-IncCpJG3uAbcIbVZhtxMiumerHmhYbJoqHVOFJAhW_w=";

    fn builder() -> TokenBuilder {
        TokenBuilder::new(&SharedSecret::new(SECRET))
            .unwrap()
            .with_retry_delay(Duration::ZERO)
    }

    fn counting_iv(dest: &mut [u8]) -> Result<(), MultipassError> {
        for (i, b) in dest.iter_mut().enumerate() {
            *b = i as u8;
        }
        Ok(())
    }

    #[test]
    fn pinned_iv_known_answer() {
        let mut rng = MockEntropySource::new();
        rng.expect_fill().times(1).returning(counting_iv);
        let token = builder().build_with(&Payload::from(JSON), &mut rng).unwrap();
        assert_eq!(token.as_str(), PINNED_TOKEN);
    }

    #[test]
    fn reference_scenario_lengths() {
        let payload = Payload::from(JSON);
        let token = build(&SharedSecret::new(SECRET), &payload).unwrap();
        assert_eq!(token.len(), 172);
        assert_eq!(encoder::decode(token.as_str()).unwrap().len(), 128);

        let unpadded = builder()
            .with_padding(PaddingMode::Unpadded)
            .build(&payload)
            .unwrap();
        assert_eq!(unpadded.len(), 171);
        assert!(unpadded
            .as_str()
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'));
    }

    #[test]
    fn same_input_gives_different_tokens() {
        let b = builder();
        let payload = Payload::from(JSON);
        let t1 = b.build(&payload).unwrap();
        let t2 = b.build(&payload).unwrap();
        assert_ne!(t1, t2);

        let f1 = encoder::decode(t1.as_str()).unwrap();
        let f2 = encoder::decode(t2.as_str()).unwrap();
        assert_ne!(&f1[16..f1.len() - 32], &f2[16..f2.len() - 32]);
    }

    #[test]
    fn random_source_retried_once() {
        let mut calls = 0;
        let mut rng = MockEntropySource::new();
        rng.expect_fill().times(2).returning(move |dest| {
            calls += 1;
            if calls == 1 {
                Err(MultipassError::RandomSource("entropy pool empty".into()))
            } else {
                counting_iv(dest)
            }
        });
        let token = builder().build_with(&Payload::from(JSON), &mut rng).unwrap();
        assert_eq!(token.as_str(), PINNED_TOKEN);
    }

    #[test]
    fn random_source_gives_up_after_retry() {
        let mut rng = MockEntropySource::new();
        rng.expect_fill()
            .times(2)
            .returning(|_| Err(MultipassError::RandomSource("entropy pool empty".into())));
        let err = builder()
            .build_with(&Payload::from(JSON), &mut rng)
            .unwrap_err();
        assert!(matches!(err, MultipassError::RandomSource(_)));
    }

    #[test]
    fn builder_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TokenBuilder>();

        let b = builder();
        let payload = Payload::from(JSON);
        let tokens: HashSet<Token> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| b.build(&payload).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(tokens.len(), 8);
    }

    #[test]
    fn empty_payload_builds_single_block() {
        let token = builder().build(&Payload::from("")).unwrap();
        assert_eq!(encoder::decode(token.as_str()).unwrap().len(), 16 + 16 + 32);
    }
}
