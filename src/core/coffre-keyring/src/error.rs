//! Keyring error types.

use thiserror::Error;

/// Errors that can occur while generating or persisting key material.
#[derive(Debug, Error)]
pub enum KeyringError {
    /// Filesystem read or write failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialized key material is shorter than the algorithm requires.
    #[error("truncated key material: expected {expected} bytes, got {actual}")]
    TruncatedKeyMaterial {
        /// Required blob length (`key_len + block_size`).
        expected: usize,
        /// Length actually available.
        actual: usize,
    },

    /// Key or IV bytes do not match the algorithm's required sizes.
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// Cryptographic error.
    #[error("crypto error: {0}")]
    Crypto(#[from] coffre_crypto::CryptoError),
}
