//! Whole-file AES-256-GCM encryption and decryption
//!
//! Each call draws a fresh salt and nonce, so the key is single-use and a
//! nonce can never repeat under it. The whole plaintext lives in memory.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::{rngs::OsRng, CryptoRng, RngCore};
use secrecy::{ExposeSecret, SecretString};

use crate::container::Container;
use crate::error::CryptoError;
use crate::kdf::{derive_key, DerivedKey};
use crate::{MIN_PASSPHRASE_CHARS, NONCE_SIZE, SALT_SIZE};

/// Check a passphrase against the length floor used for encryption.
///
/// The floor counts UTF-16 code units, the unit browser clients measure
/// string length in, so a character outside the BMP counts as two. It is an
/// input guard only and says nothing about entropy.
pub fn validate_passphrase(passphrase: &SecretString) -> Result<(), CryptoError> {
    let units = passphrase.expose_secret().encode_utf16().count();
    if units == 0 {
        return Err(CryptoError::InvalidInput("passphrase is required".into()));
    }
    if units < MIN_PASSPHRASE_CHARS {
        return Err(CryptoError::InvalidInput(format!(
            "passphrase must be at least {MIN_PASSPHRASE_CHARS} characters"
        )));
    }
    Ok(())
}

/// Encrypt `plaintext` under `passphrase` using the OS random source.
///
/// Returns `salt || nonce || ciphertext || tag`, always `plaintext.len() + 44` bytes.
pub fn encrypt(plaintext: &[u8], passphrase: &SecretString) -> Result<Vec<u8>, CryptoError> {
    encrypt_with_rng(&mut OsRng, plaintext, passphrase)
}

/// Encrypt with a caller-supplied CSPRNG for the salt and nonce.
///
/// The salt is drawn first, then the nonce.
pub fn encrypt_with_rng<R>(
    rng: &mut R,
    plaintext: &[u8],
    passphrase: &SecretString,
) -> Result<Vec<u8>, CryptoError>
where
    R: RngCore + CryptoRng,
{
    validate_passphrase(passphrase)?;

    let mut salt = [0u8; SALT_SIZE];
    rng.fill_bytes(&mut salt);
    let mut nonce = [0u8; NONCE_SIZE];
    rng.fill_bytes(&mut nonce);

    let key = derive_key(passphrase, &salt);
    let sealed = aead(&key)
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| CryptoError::InvalidInput("plaintext too large to encrypt".into()))?;

    let container = Container::assemble(&salt, &nonce, &sealed);
    tracing::debug!(
        plaintext_len = plaintext.len(),
        container_len = container.len(),
        "encrypted container"
    );
    Ok(container)
}

/// Decrypt a container produced by [`encrypt`].
///
/// Wrong passphrase and tampered bytes both surface as
/// [`CryptoError::DecryptionFailed`]. No plaintext is returned unless the
/// tag verifies.
pub fn decrypt(container: &[u8], passphrase: &SecretString) -> Result<Vec<u8>, CryptoError> {
    if passphrase.expose_secret().is_empty() {
        return Err(CryptoError::InvalidInput("passphrase is required".into()));
    }

    let parsed = Container::parse(container)?;
    let key = derive_key(passphrase, parsed.salt());

    let plaintext = aead(&key)
        .decrypt(Nonce::from_slice(parsed.nonce()), parsed.sealed())
        .map_err(|_| CryptoError::DecryptionFailed)?;

    tracing::debug!(
        container_len = container.len(),
        plaintext_len = plaintext.len(),
        "decrypted container"
    );
    Ok(plaintext)
}

fn aead(key: &DerivedKey) -> Aes256Gcm {
    Aes256Gcm::new(key.as_bytes().into())
}
