//! Container binary layout
//!
//! ```text
//! offset 0..16   : salt   (PBKDF2 input, random, public)
//! offset 16..28  : nonce  (AES-GCM nonce, random, unique per encryption)
//! offset 28..end : AES-256-GCM output (ciphertext || 16-byte tag)
//! ```
//!
//! No magic bytes, no version, no algorithm id. A future format would need
//! its own distinguishable shape.

use crate::error::CryptoError;
use crate::{HEADER_SIZE, MIN_CONTAINER_SIZE, NONCE_SIZE, SALT_SIZE, TAG_SIZE};

/// Borrowed view over a container blob.
#[derive(Debug, Clone, Copy)]
pub struct Container<'a> {
    salt: &'a [u8; SALT_SIZE],
    nonce: &'a [u8; NONCE_SIZE],
    sealed: &'a [u8],
}

impl<'a> Container<'a> {
    /// Split a blob into salt, nonce, and AEAD output.
    ///
    /// Anything shorter than `MIN_CONTAINER_SIZE` is rejected: a GCM payload
    /// cannot be shorter than its tag.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, CryptoError> {
        if bytes.len() < MIN_CONTAINER_SIZE {
            return Err(CryptoError::MalformedContainer {
                len: bytes.len(),
                min: MIN_CONTAINER_SIZE,
            });
        }

        let (salt, rest) = bytes.split_at(SALT_SIZE);
        let (nonce, sealed) = rest.split_at(NONCE_SIZE);

        // Lengths are fixed by split_at above
        let salt = <&[u8; SALT_SIZE]>::try_from(salt).map_err(|_| malformed(bytes.len()))?;
        let nonce = <&[u8; NONCE_SIZE]>::try_from(nonce).map_err(|_| malformed(bytes.len()))?;

        Ok(Self {
            salt,
            nonce,
            sealed,
        })
    }

    /// Lay out `salt || nonce || sealed` as a new container blob.
    pub fn assemble(salt: &[u8; SALT_SIZE], nonce: &[u8; NONCE_SIZE], sealed: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE + sealed.len());
        out.extend_from_slice(salt);
        out.extend_from_slice(nonce);
        out.extend_from_slice(sealed);
        out
    }

    pub fn salt(&self) -> &'a [u8; SALT_SIZE] {
        self.salt
    }

    pub fn nonce(&self) -> &'a [u8; NONCE_SIZE] {
        self.nonce
    }

    /// Ciphertext with the trailing GCM tag.
    pub fn sealed(&self) -> &'a [u8] {
        self.sealed
    }

    /// Plaintext length the container decrypts to, if it authenticates.
    pub fn plaintext_len(&self) -> usize {
        self.sealed.len() - TAG_SIZE
    }
}

fn malformed(len: usize) -> CryptoError {
    CryptoError::MalformedContainer {
        len,
        min: MIN_CONTAINER_SIZE,
    }
}
