//! Cryptographically secure random generation.
//!
//! Uses the operating system's CSPRNG. Components that generate key material
//! accept any caller-supplied `RngCore + CryptoRng` instead of reaching for a
//! global generator, so tests can substitute a seeded source.

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Fills `buf` with bytes from the operating system CSPRNG.
///
/// # Errors
///
/// Returns [`CryptoError::RandomSourceUnavailable`] if the entropy source
/// cannot be read.
pub fn fill_bytes(buf: &mut [u8]) -> Result<(), CryptoError> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| CryptoError::RandomSourceUnavailable(e.to_string()))
}

/// Generates `len` cryptographically secure random bytes.
///
/// The bytes are wrapped in `Zeroizing` so they are cleared from memory
/// when dropped.
pub fn generate_bytes(len: usize) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let mut bytes = Zeroizing::new(vec![0u8; len]);
    fill_bytes(&mut bytes)?;
    Ok(bytes)
}
