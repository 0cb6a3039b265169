//! AES-128-CBC with PKCS#7 padding.
//!
//! **IV freshness:** every call to [`encrypt`] draws a new IV from the supplied
//! [`EntropySource`]. CBC under a repeated IV leaks equality of plaintext
//! prefixes; never pass a fixed IV outside tests.

use aes::Aes128;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use common::MultipassError;

use super::{EntropySource, BLOCK_LEN, ENCRYPTION_KEY_LEN, IV_LEN};

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

/// Initialisation vector, one cipher block long.
pub type Iv = [u8; IV_LEN];

/// Encrypt `payload` under `key` with a fresh random IV.
///
/// Returns the IV and ciphertext separately; the caller decides the frame order.
///
/// # Errors
///
/// Returns [`MultipassError::CipherInit`] if `key` is not [`ENCRYPTION_KEY_LEN`] bytes.
/// Returns [`MultipassError::RandomSource`] if `rng` cannot produce the IV.
pub fn encrypt<R>(payload: &[u8], key: &[u8], rng: &mut R) -> Result<(Iv, Vec<u8>), MultipassError>
where
    R: EntropySource + ?Sized,
{
    // Validate before consuming entropy.
    check_key(key)?;

    let mut iv = [0u8; IV_LEN];
    rng.fill(&mut iv)?;

    let ciphertext = Aes128CbcEnc::new_from_slices(key, &iv)
        .map_err(|_| key_len_error(key))?
        .encrypt_padded_vec_mut::<Pkcs7>(payload);

    Ok((iv, ciphertext))
}

/// Decrypt and unpad `ciphertext`.
///
/// Only call this on a frame whose MAC has already been verified.
///
/// # Errors
///
/// Returns [`MultipassError::CipherInit`] if `key` is not [`ENCRYPTION_KEY_LEN`] bytes.
/// Returns [`MultipassError::Decryption`] if the ciphertext is not block-aligned
/// or the padding is invalid.
pub fn decrypt(iv: &Iv, ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>, MultipassError> {
    check_key(key)?;
    Aes128CbcDec::new_from_slices(key, iv)
        .map_err(|_| key_len_error(key))?
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| MultipassError::Decryption)
}

/// Ciphertext length for a payload of `payload_len` bytes.
///
/// PKCS#7 always adds between 1 and [`BLOCK_LEN`] bytes.
pub const fn ciphertext_len(payload_len: usize) -> usize {
    (payload_len / BLOCK_LEN + 1) * BLOCK_LEN
}

fn check_key(key: &[u8]) -> Result<(), MultipassError> {
    if key.len() != ENCRYPTION_KEY_LEN {
        return Err(key_len_error(key));
    }
    Ok(())
}

fn key_len_error(key: &[u8]) -> MultipassError {
    MultipassError::CipherInit {
        expected: ENCRYPTION_KEY_LEN,
        actual: key.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::entropy::{MockEntropySource, OsEntropy};

    // SHA-256("hard-to-guess-multipass-secret")[0..16)
    const KEY: &str = "9f70d94cfac6373c21b917ca76dc645f";

    fn key() -> Vec<u8> {
        hex::decode(KEY).unwrap()
    }

    fn counting_iv() -> MockEntropySource {
        let mut rng = MockEntropySource::new();
        rng.expect_fill().returning(|dest| {
            for (i, b) in dest.iter_mut().enumerate() {
                *b = i as u8;
            }
            Ok(())
        });
        rng
    }

    #[test]
    fn known_answer_with_pinned_iv() {
        let (iv, ct) = encrypt(b"", &key(), &mut counting_iv()).unwrap();
        assert_eq!(hex::encode(iv), "000102030405060708090a0b0c0d0e0f");
        assert_eq!(hex::encode(ct), "224f814c5e89a7fc7d56c2206556fba9");
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let plaintext = br#"{"email":"a@example.com"}"#;
        let (iv, ct) = encrypt(plaintext, &key(), &mut OsEntropy).unwrap();
        let decrypted = decrypt(&iv, &ct, &key()).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn fresh_iv_per_call() {
        let (iv1, ct1) = encrypt(b"same payload", &key(), &mut OsEntropy).unwrap();
        let (iv2, ct2) = encrypt(b"same payload", &key(), &mut OsEntropy).unwrap();
        assert_ne!(iv1, iv2);
        assert_ne!(ct1, ct2);
    }

    #[test]
    fn block_aligned_payload_gets_a_full_padding_block() {
        let (_, ct) = encrypt(&[7u8; 32], &key(), &mut OsEntropy).unwrap();
        assert_eq!(ct.len(), 48);
        assert_eq!(ciphertext_len(32), 48);
        assert_eq!(ciphertext_len(0), 16);
        assert_eq!(ciphertext_len(15), 16);
        assert_eq!(ciphertext_len(65), 80);
    }

    #[test]
    fn wrong_key_length_rejected_without_touching_entropy() {
        let mut rng = MockEntropySource::new();
        rng.expect_fill().never();
        let err = encrypt(b"x", &[0u8; 32], &mut rng).unwrap_err();
        assert_eq!(
            err,
            MultipassError::CipherInit {
                expected: 16,
                actual: 32
            }
        );
    }

    #[test]
    fn random_source_failure_propagates() {
        let mut rng = MockEntropySource::new();
        rng.expect_fill()
            .returning(|_| Err(MultipassError::RandomSource("entropy pool empty".into())));
        let err = encrypt(b"x", &key(), &mut rng).unwrap_err();
        assert!(matches!(err, MultipassError::RandomSource(_)));
    }

    #[test]
    fn wrong_key_fails_to_decrypt_or_garbles() {
        let (iv, ct) = encrypt(b"secret payload", &key(), &mut OsEntropy).unwrap();
        let other = [0x42u8; 16];
        match decrypt(&iv, &ct, &other) {
            Ok(pt) => assert_ne!(pt, b"secret payload"),
            Err(e) => assert_eq!(e, MultipassError::Decryption),
        }
    }

    #[test]
    fn unaligned_ciphertext_rejected() {
        let iv = [0u8; IV_LEN];
        assert_eq!(
            decrypt(&iv, &[0u8; 15], &key()).unwrap_err(),
            MultipassError::Decryption
        );
    }
}
