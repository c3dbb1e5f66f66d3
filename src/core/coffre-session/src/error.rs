//! Cipher session error types.

use thiserror::Error;

/// Errors that can occur during a cipher session operation.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Source or destination file access failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Cryptographic error.
    #[error("crypto error: {0}")]
    Crypto(#[from] coffre_crypto::CryptoError),
}
