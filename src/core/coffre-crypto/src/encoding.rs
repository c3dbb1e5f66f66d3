//! Lossless conversion between raw bytes and hex / base64 text.
//!
//! Used for human-readable display of ciphertext and for passing binary data
//! through text-only channels. Both encodings round-trip for every byte
//! sequence.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::error::CryptoError;

/// Encodes bytes as lowercase hexadecimal.
pub fn to_hex(data: &[u8]) -> String {
    hex::encode(data)
}

/// Decodes a hexadecimal string.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidEncoding`] on odd-length input or non-hex
/// characters.
pub fn from_hex(text: &str) -> Result<Vec<u8>, CryptoError> {
    hex::decode(text).map_err(|e| CryptoError::InvalidEncoding(e.to_string()))
}

/// Encodes bytes as base64 (standard alphabet, padded).
pub fn to_base64(data: &[u8]) -> String {
    BASE64.encode(data)
}

/// Decodes a base64 string.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidEncoding`] on characters outside the
/// standard alphabet or malformed padding.
pub fn from_base64(text: &str) -> Result<Vec<u8>, CryptoError> {
    BASE64
        .decode(text)
        .map_err(|e| CryptoError::InvalidEncoding(e.to_string()))
}
