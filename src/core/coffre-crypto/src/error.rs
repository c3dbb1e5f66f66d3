//! Cryptographic error types.

use thiserror::Error;

/// Errors that can occur during cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The operating system entropy source could not be read.
    #[error("random source unavailable: {0}")]
    RandomSourceUnavailable(String),

    /// Key or IV length does not match the algorithm's required sizes.
    #[error("cipher setup failed: {0}")]
    CipherSetup(String),

    /// Ciphertext length is not a positive multiple of the block size.
    #[error("invalid ciphertext length: {len} bytes is not a positive multiple of the {block_size}-byte block size")]
    InvalidCiphertextLength {
        /// Total ciphertext length in bytes.
        len: usize,
        /// Block size of the cipher in bytes.
        block_size: usize,
    },

    /// PKCS#7 padding check failed after decryption.
    ///
    /// Carries no position information: the check runs in constant time and
    /// reports only success or failure.
    #[error("padding validation failed")]
    PaddingValidation,

    /// Input is not valid hex or base64.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Unrecognized algorithm name.
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),
}
