//! Byte frames passed between pipeline stages.
//!
//! Each stage produces a fresh immutable buffer; nothing is reset and reused.

use bytes::{BufMut, Bytes, BytesMut};
use common::MultipassError;

use crate::crypto::{cipher::Iv, mac::Tag, BLOCK_LEN, IV_LEN, TAG_LEN};

/// Smallest valid frame: IV, one padded block, tag.
pub const MIN_FRAME_LEN: usize = IV_LEN + BLOCK_LEN + TAG_LEN;

/// `IV || ciphertext`, the range the tag covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherFrame(Bytes);

impl CipherFrame {
    pub fn new(iv: &Iv, ciphertext: &[u8]) -> Self {
        let mut buf = BytesMut::with_capacity(IV_LEN + ciphertext.len());
        buf.put_slice(iv);
        buf.put_slice(ciphertext);
        Self(buf.freeze())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// `IV || ciphertext || tag`, the bytes that get base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedFrame(Bytes);

impl SignedFrame {
    pub fn new(frame: &CipherFrame, tag: &Tag) -> Self {
        let mut buf = BytesMut::with_capacity(frame.0.len() + TAG_LEN);
        buf.put_slice(&frame.0);
        buf.put_slice(tag);
        Self(buf.freeze())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Borrowed view of a decoded frame split at its fixed offsets.
#[derive(Debug, Clone, Copy)]
pub struct TokenParts<'a> {
    signed: &'a [u8],
    tag: &'a [u8],
}

impl<'a> TokenParts<'a> {
    /// Split `frame` into IV, ciphertext, and tag.
    ///
    /// # Errors
    ///
    /// Returns [`MultipassError::MalformedToken`] if `frame` is shorter than
    /// [`MIN_FRAME_LEN`] or the ciphertext is not a whole number of blocks.
    pub fn split(frame: &'a [u8]) -> Result<Self, MultipassError> {
        if frame.len() < MIN_FRAME_LEN {
            return Err(MultipassError::MalformedToken(format!(
                "frame is {} bytes, need at least {MIN_FRAME_LEN}",
                frame.len()
            )));
        }
        let (signed, tag) = frame.split_at(frame.len() - TAG_LEN);
        if (signed.len() - IV_LEN) % BLOCK_LEN != 0 {
            return Err(MultipassError::MalformedToken(format!(
                "ciphertext is {} bytes, not a multiple of {BLOCK_LEN}",
                signed.len() - IV_LEN
            )));
        }
        Ok(Self { signed, tag })
    }

    pub fn iv(&self) -> Iv {
        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&self.signed[..IV_LEN]);
        iv
    }

    pub fn ciphertext(&self) -> &'a [u8] {
        &self.signed[IV_LEN..]
    }

    /// `IV || ciphertext`, the bytes the tag must authenticate.
    pub fn signed(&self) -> &'a [u8] {
        self.signed
    }

    pub fn tag(&self) -> &'a [u8] {
        self.tag
    }
}
