//! cvault-crypto: client-side file encryption for CryptoVault
//!
//! Passphrase-based, single-shot, in-memory encryption of whole files.
//!
//! Pipeline:
//! ```text
//! passphrase + salt(16, random) ──PBKDF2-HMAC-SHA256 (100k)──► key (256-bit)
//! key + nonce(12, random) + plaintext ──AES-256-GCM──► ciphertext || tag(16)
//! container = salt || nonce || ciphertext || tag
//! ```
//!
//! The container carries everything needed to decrypt except the passphrase.
//! There is no version byte or algorithm identifier: iteration count, hash,
//! and cipher are fixed constants of this crate.

pub mod cipher;
pub mod container;
pub mod error;
pub mod kdf;

pub use cipher::{decrypt, encrypt, encrypt_with_rng, validate_passphrase};
pub use container::Container;
pub use error::CryptoError;
pub use kdf::{derive_key, DerivedKey};

/// Size of a derived AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// Size of the PBKDF2 salt stored at the front of every container
pub const SALT_SIZE: usize = 16;

/// Size of an AES-GCM nonce (96-bit)
pub const NONCE_SIZE: usize = 12;

/// Size of the GCM authentication tag appended to the ciphertext
pub const TAG_SIZE: usize = 16;

/// Salt + nonce prefix preceding the AEAD output
pub const HEADER_SIZE: usize = SALT_SIZE + NONCE_SIZE;

/// Bytes added to the plaintext length by `encrypt`
pub const OVERHEAD: usize = HEADER_SIZE + TAG_SIZE;

/// Shortest blob `decrypt` will attempt: header plus a bare tag (empty plaintext)
pub const MIN_CONTAINER_SIZE: usize = OVERHEAD;

/// PBKDF2 rounds. Not stored in the container; changing it breaks every existing file.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Minimum passphrase length accepted by `encrypt`, in UTF-16 code units
pub const MIN_PASSPHRASE_CHARS: usize = 8;
