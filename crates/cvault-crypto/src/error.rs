use thiserror::Error;

/// Failure kinds of the encryption core.
///
/// Every variant is terminal for the call that produced it; nothing is
/// retried internally and no partial output accompanies an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Passphrase missing or too short, or no data supplied.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Blob is too short to be a container.
    #[error("invalid encrypted file format ({len} bytes, minimum {min})")]
    MalformedContainer { len: usize, min: usize },

    /// Authentication tag did not verify.
    ///
    /// Covers both a wrong passphrase and tampered data; the two are
    /// deliberately indistinguishable.
    #[error("decryption failed: incorrect key or corrupted file")]
    DecryptionFailed,
}

impl CryptoError {
    /// True if re-prompting the user for input could lead to success.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CryptoError::InvalidInput(_))
    }
}
