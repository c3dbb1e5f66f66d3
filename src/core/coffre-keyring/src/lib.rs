//! # Coffre Keyring
//!
//! Key material lifecycle for Coffre: generation, buffer serialization, and
//! file persistence of symmetric key + IV pairs.
//!
//! ## Blob layout
//!
//! Key material serializes to a flat binary blob `key ‖ iv` at fixed
//! offsets — no header, no version tag, no checksum. The required length is
//! `Algorithm::material_len()`; shorter input is rejected as truncated
//! rather than zero-padded.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;

use std::fs;
use std::path::Path;

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use tracing::{debug, info};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use coffre_crypto::{Algorithm, CryptoError};

pub use error::KeyringError;

/// A symmetric key and IV pair bound to one algorithm.
///
/// Key and IV bytes are securely erased from memory when the value is
/// dropped. The pair is immutable once constructed, so independent cipher
/// sessions may read it concurrently without locking.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    #[zeroize(skip)]
    algorithm: Algorithm,
    key: Vec<u8>,
    iv: Vec<u8>,
}

impl KeyMaterial {
    /// Generates fresh key material from the operating system CSPRNG.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::RandomSourceUnavailable`] (wrapped) if the
    /// entropy source cannot be read.
    pub fn generate(algorithm: Algorithm) -> Result<Self, KeyringError> {
        Self::generate_with(algorithm, &mut OsRng)
    }

    /// Generates key material from a caller-supplied secure random source.
    ///
    /// Tests can pass a seeded generator to obtain deterministic material
    /// without touching global state.
    pub fn generate_with<R>(algorithm: Algorithm, rng: &mut R) -> Result<Self, KeyringError>
    where
        R: RngCore + CryptoRng,
    {
        let mut key = vec![0u8; algorithm.key_len()];
        let mut iv = vec![0u8; algorithm.block_size()];
        rng.try_fill_bytes(&mut key)
            .map_err(|e| CryptoError::RandomSourceUnavailable(e.to_string()))?;
        rng.try_fill_bytes(&mut iv)
            .map_err(|e| CryptoError::RandomSourceUnavailable(e.to_string()))?;

        debug!(algorithm = %algorithm, "key material generated");

        Ok(Self { algorithm, key, iv })
    }

    /// Builds key material from existing key and IV bytes.
    ///
    /// # Errors
    ///
    /// Returns [`KeyringError::InvalidKeyMaterial`] if either slice does not
    /// match the algorithm's required sizes.
    pub fn from_parts(algorithm: Algorithm, key: &[u8], iv: &[u8]) -> Result<Self, KeyringError> {
        if key.len() != algorithm.key_len() {
            return Err(KeyringError::InvalidKeyMaterial(format!(
                "{} requires a {}-byte key, got {}",
                algorithm,
                algorithm.key_len(),
                key.len()
            )));
        }
        if iv.len() != algorithm.block_size() {
            return Err(KeyringError::InvalidKeyMaterial(format!(
                "{} requires a {}-byte iv, got {}",
                algorithm,
                algorithm.block_size(),
                iv.len()
            )));
        }

        Ok(Self {
            algorithm,
            key: key.to_vec(),
            iv: iv.to_vec(),
        })
    }

    /// The algorithm this material is bound to.
    #[inline]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Raw key bytes.
    ///
    /// Use with caution - the returned slice is not zeroized automatically.
    #[inline]
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Raw IV bytes.
    #[inline]
    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    /// Serializes to the flat `key ‖ iv` blob.
    ///
    /// The blob is wrapped in `Zeroizing` since it contains the key.
    pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
        let mut blob = Zeroizing::new(Vec::with_capacity(self.algorithm.material_len()));
        blob.extend_from_slice(&self.key);
        blob.extend_from_slice(&self.iv);
        blob
    }

    /// Deserializes key material from a `key ‖ iv` blob.
    ///
    /// Reads exactly `material_len` bytes; anything past that is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`KeyringError::TruncatedKeyMaterial`] if the buffer is
    /// shorter than `material_len`.
    pub fn from_bytes(algorithm: Algorithm, bytes: &[u8]) -> Result<Self, KeyringError> {
        let expected = algorithm.material_len();
        if bytes.len() < expected {
            return Err(KeyringError::TruncatedKeyMaterial {
                expected,
                actual: bytes.len(),
            });
        }

        let key_len = algorithm.key_len();
        Self::from_parts(algorithm, &bytes[..key_len], &bytes[key_len..expected])
    }

    /// Writes the `key ‖ iv` blob to `path`, overwriting any existing file.
    ///
    /// The write is not atomic: a crash mid-write can leave a truncated
    /// file. Callers needing atomicity should write to a temporary path and
    /// rename.
    ///
    /// # Errors
    ///
    /// Returns [`KeyringError::Io`] on write failure.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), KeyringError> {
        let path = path.as_ref();
        let blob = self.to_bytes();
        fs::write(path, blob.as_slice())?;
        info!(algorithm = %self.algorithm, path = %path.display(), "key material saved");
        Ok(())
    }

    /// Loads key material from a file written by [`save_to_file`](Self::save_to_file).
    ///
    /// # Errors
    ///
    /// Returns [`KeyringError::Io`] if the file is missing or unreadable and
    /// [`KeyringError::TruncatedKeyMaterial`] if it holds fewer than
    /// `material_len` bytes.
    pub fn load_from_file(
        algorithm: Algorithm,
        path: impl AsRef<Path>,
    ) -> Result<Self, KeyringError> {
        let path = path.as_ref();
        let bytes = Zeroizing::new(fs::read(path)?);
        let material = Self::from_bytes(algorithm, &bytes)?;
        info!(algorithm = %algorithm, path = %path.display(), "key material loaded");
        Ok(material)
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("algorithm", &self.algorithm)
            .field("key", &"[REDACTED]")
            .field("iv", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    #[test]
    fn test_generate_lengths() {
        for alg in [Algorithm::Des, Algorithm::Aes128, Algorithm::Aes256] {
            let material = KeyMaterial::generate(alg).unwrap();
            assert_eq!(material.key().len(), alg.key_len());
            assert_eq!(material.iv().len(), alg.block_size());
        }
    }

    #[test]
    fn test_generate_unique() {
        let a = KeyMaterial::generate(Algorithm::Aes256).unwrap();
        let b = KeyMaterial::generate(Algorithm::Aes256).unwrap();
        assert_ne!(a.key(), b.key());
        assert_ne!(a.iv(), b.iv());
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);
        let a = KeyMaterial::generate_with(Algorithm::Aes128, &mut rng1).unwrap();
        let b = KeyMaterial::generate_with(Algorithm::Aes128, &mut rng2).unwrap();
        assert_eq!(a.key(), b.key());
        assert_eq!(a.iv(), b.iv());
    }

    #[test]
    fn test_buffer_roundtrip() {
        let material = KeyMaterial::generate(Algorithm::Aes256).unwrap();
        let blob = material.to_bytes();
        assert_eq!(blob.len(), Algorithm::Aes256.material_len());

        let restored = KeyMaterial::from_bytes(Algorithm::Aes256, &blob).unwrap();
        assert_eq!(restored.key(), material.key());
        assert_eq!(restored.iv(), material.iv());
    }

    #[test]
    fn test_from_bytes_truncated() {
        let result = KeyMaterial::from_bytes(Algorithm::Aes128, &[0u8; 10]);
        assert!(matches!(
            result,
            Err(KeyringError::TruncatedKeyMaterial {
                expected: 32,
                actual: 10
            })
        ));
    }

    #[test]
    fn test_from_bytes_ignores_trailing_bytes() {
        let material = KeyMaterial::generate(Algorithm::Des).unwrap();
        let mut blob = material.to_bytes().to_vec();
        blob.extend_from_slice(b"trailing garbage");

        let restored = KeyMaterial::from_bytes(Algorithm::Des, &blob).unwrap();
        assert_eq!(restored.key(), material.key());
        assert_eq!(restored.iv(), material.iv());
    }

    #[test]
    fn test_file_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("material.key");

        let material = KeyMaterial::generate(Algorithm::Aes256).unwrap();
        material.save_to_file(&path).unwrap();

        let restored = KeyMaterial::load_from_file(Algorithm::Aes256, &path).unwrap();
        assert_eq!(restored.key(), material.key());
        assert_eq!(restored.iv(), material.iv());
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = TempDir::new().unwrap();
        let result = KeyMaterial::load_from_file(Algorithm::Aes128, tmp.path().join("nope.key"));
        assert!(matches!(result, Err(KeyringError::Io(_))));
    }

    #[test]
    fn test_load_short_file_is_truncated_not_zero_padded() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("short.key");
        std::fs::write(&path, [0u8; 10]).unwrap();

        let result = KeyMaterial::load_from_file(Algorithm::Aes128, &path);
        assert!(matches!(
            result,
            Err(KeyringError::TruncatedKeyMaterial {
                expected: 32,
                actual: 10
            })
        ));
    }

    #[test]
    fn test_save_overwrites_existing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("material.key");

        let first = KeyMaterial::generate(Algorithm::Aes128).unwrap();
        first.save_to_file(&path).unwrap();
        let second = KeyMaterial::generate(Algorithm::Aes128).unwrap();
        second.save_to_file(&path).unwrap();

        let restored = KeyMaterial::load_from_file(Algorithm::Aes128, &path).unwrap();
        assert_eq!(restored.key(), second.key());
    }

    #[test]
    fn test_from_parts_length_checks() {
        let result = KeyMaterial::from_parts(Algorithm::Aes256, &[0u8; 16], &[0u8; 16]);
        assert!(matches!(result, Err(KeyringError::InvalidKeyMaterial(_))));

        let result = KeyMaterial::from_parts(Algorithm::Aes256, &[0u8; 32], &[0u8; 8]);
        assert!(matches!(result, Err(KeyringError::InvalidKeyMaterial(_))));
    }

    #[test]
    fn test_debug_redacted() {
        let material = KeyMaterial::generate(Algorithm::Aes256).unwrap();
        let debug_str = format!("{:?}", material);
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains(&coffre_crypto::encoding::to_hex(material.key())));
    }
}
