//! Key derivation: PBKDF2-HMAC-SHA256 passphrase → AES-256 key

use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::{KEY_SIZE, PBKDF2_ITERATIONS, SALT_SIZE};

/// A 256-bit key derived from a passphrase and a per-container salt.
///
/// Recomputed on every call and zeroized on drop.
pub struct DerivedKey {
    bytes: [u8; KEY_SIZE],
}

impl DerivedKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derive the AES-256 key for a container from a passphrase and its salt.
///
/// Deterministic: the same passphrase and salt always give the same key,
/// which is what lets `decrypt` re-create the key from the stored salt.
/// Costs `PBKDF2_ITERATIONS` HMAC-SHA256 rounds of CPU time.
pub fn derive_key(passphrase: &SecretString, salt: &[u8; SALT_SIZE]) -> DerivedKey {
    let start = std::time::Instant::now();
    let key = pbkdf2_sha256(
        passphrase.expose_secret().as_bytes(),
        salt,
        PBKDF2_ITERATIONS,
    );
    tracing::debug!(
        iterations = PBKDF2_ITERATIONS,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "derived container key"
    );
    key
}

fn pbkdf2_sha256(password: &[u8], salt: &[u8], rounds: u32) -> DerivedKey {
    let mut key = [0u8; KEY_SIZE];
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, rounds, &mut key);
    let derived = DerivedKey::from_bytes(key);
    key.zeroize();
    derived
}
