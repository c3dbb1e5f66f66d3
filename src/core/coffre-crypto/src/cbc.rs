//! CBC-mode block encryption with PKCS#7 padding.
//!
//! The streaming types process data in bounded-memory chunks: callers feed
//! arbitrary slices through `update` and finish with `finalize`, which
//! applies (or strips and validates) padding exactly once at the end of the
//! stream. The one-shot [`encrypt`] and [`decrypt`] functions are thin
//! wrappers over the same core.
//!
//! Padding validation runs in constant time and reports no position
//! information, closing the timing channel a CBC padding oracle needs.

use aes::{Aes128, Aes256};
use cbc::cipher::block_padding::{Pkcs7, RawPadding};
use cbc::cipher::generic_array::GenericArray;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use des::Des;
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroizing;

use crate::algorithm::Algorithm;
use crate::error::CryptoError;

// ============================================================================
// Backend dispatch
// ============================================================================

enum EncBackend {
    Des(cbc::Encryptor<Des>),
    Aes128(cbc::Encryptor<Aes128>),
    Aes256(cbc::Encryptor<Aes256>),
}

enum DecBackend {
    Des(cbc::Decryptor<Des>),
    Aes128(cbc::Decryptor<Aes128>),
    Aes256(cbc::Decryptor<Aes256>),
}

/// Checks key and IV lengths against the algorithm's requirements.
fn check_setup(algorithm: Algorithm, key: &[u8], iv: &[u8]) -> Result<(), CryptoError> {
    if key.len() != algorithm.key_len() {
        return Err(CryptoError::CipherSetup(format!(
            "{} requires a {}-byte key, got {}",
            algorithm,
            algorithm.key_len(),
            key.len()
        )));
    }
    if iv.len() != algorithm.block_size() {
        return Err(CryptoError::CipherSetup(format!(
            "{} requires a {}-byte iv, got {}",
            algorithm,
            algorithm.block_size(),
            iv.len()
        )));
    }
    Ok(())
}

impl EncBackend {
    fn new(algorithm: Algorithm, key: &[u8], iv: &[u8]) -> Result<Self, CryptoError> {
        check_setup(algorithm, key, iv)?;
        let setup = |e: cbc::cipher::InvalidLength| CryptoError::CipherSetup(e.to_string());
        Ok(match algorithm {
            Algorithm::Des => Self::Des(cbc::Encryptor::new_from_slices(key, iv).map_err(setup)?),
            Algorithm::Aes128 => {
                Self::Aes128(cbc::Encryptor::new_from_slices(key, iv).map_err(setup)?)
            }
            Algorithm::Aes256 => {
                Self::Aes256(cbc::Encryptor::new_from_slices(key, iv).map_err(setup)?)
            }
        })
    }

    /// Encrypts `buf` in place. The length must be a multiple of the block size.
    fn encrypt_blocks(&mut self, buf: &mut [u8]) {
        match self {
            Self::Des(c) => {
                for block in buf.chunks_exact_mut(8) {
                    c.encrypt_block_mut(GenericArray::from_mut_slice(block));
                }
            }
            Self::Aes128(c) => {
                for block in buf.chunks_exact_mut(16) {
                    c.encrypt_block_mut(GenericArray::from_mut_slice(block));
                }
            }
            Self::Aes256(c) => {
                for block in buf.chunks_exact_mut(16) {
                    c.encrypt_block_mut(GenericArray::from_mut_slice(block));
                }
            }
        }
    }
}

impl DecBackend {
    fn new(algorithm: Algorithm, key: &[u8], iv: &[u8]) -> Result<Self, CryptoError> {
        check_setup(algorithm, key, iv)?;
        let setup = |e: cbc::cipher::InvalidLength| CryptoError::CipherSetup(e.to_string());
        Ok(match algorithm {
            Algorithm::Des => Self::Des(cbc::Decryptor::new_from_slices(key, iv).map_err(setup)?),
            Algorithm::Aes128 => {
                Self::Aes128(cbc::Decryptor::new_from_slices(key, iv).map_err(setup)?)
            }
            Algorithm::Aes256 => {
                Self::Aes256(cbc::Decryptor::new_from_slices(key, iv).map_err(setup)?)
            }
        })
    }

    /// Decrypts `buf` in place. The length must be a multiple of the block size.
    fn decrypt_blocks(&mut self, buf: &mut [u8]) {
        match self {
            Self::Des(c) => {
                for block in buf.chunks_exact_mut(8) {
                    c.decrypt_block_mut(GenericArray::from_mut_slice(block));
                }
            }
            Self::Aes128(c) => {
                for block in buf.chunks_exact_mut(16) {
                    c.decrypt_block_mut(GenericArray::from_mut_slice(block));
                }
            }
            Self::Aes256(c) => {
                for block in buf.chunks_exact_mut(16) {
                    c.decrypt_block_mut(GenericArray::from_mut_slice(block));
                }
            }
        }
    }
}

// ============================================================================
// Constant-time padding validation
// ============================================================================

/// Constant-time `a <= b` for bytes.
fn ct_le(a: u8, b: u8) -> Choice {
    // 16-bit a - b - 1 has its high bit set exactly when a <= b
    let diff = (a as u16).wrapping_sub(b as u16).wrapping_sub(1);
    Choice::from(((diff >> 15) & 1) as u8)
}

/// Validates PKCS#7 padding on the final plaintext block and returns the pad
/// length, examining every byte of the block regardless of where (or whether)
/// the padding is malformed.
fn checked_pad_len(block: &[u8]) -> Result<usize, CryptoError> {
    let block_size = block.len() as u8;
    let pad = block[block.len() - 1];

    let mut valid = !pad.ct_eq(&0) & ct_le(pad, block_size);
    for (i, &byte) in block.iter().enumerate() {
        // 1-based distance of this byte from the end of the block
        let distance = block_size - i as u8;
        let in_pad = ct_le(distance, pad);
        valid &= byte.ct_eq(&pad) | !in_pad;
    }

    if valid.unwrap_u8() == 1 {
        Ok(pad as usize)
    } else {
        Err(CryptoError::PaddingValidation)
    }
}

// ============================================================================
// Streaming encryptor
// ============================================================================

/// Incremental CBC encryptor.
///
/// Feed plaintext through [`update`](Self::update) in chunks of any size;
/// complete blocks are encrypted immediately and any partial block is carried
/// to the next call. [`finalize`](Self::finalize) consumes the encryptor and
/// emits the padded final block, so padding is applied exactly once.
pub struct StreamEncryptor {
    backend: EncBackend,
    block_size: usize,
    // plaintext tail shorter than one block, wiped on drop
    carry: Zeroizing<Vec<u8>>,
}

impl StreamEncryptor {
    /// Creates an encryptor for `algorithm` bound to `key` and `iv`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::CipherSetup`] if either length does not match
    /// the algorithm's requirements.
    pub fn new(algorithm: Algorithm, key: &[u8], iv: &[u8]) -> Result<Self, CryptoError> {
        Ok(Self {
            backend: EncBackend::new(algorithm, key, iv)?,
            block_size: algorithm.block_size(),
            carry: Zeroizing::new(Vec::new()),
        })
    }

    /// Encrypts every complete block of `carry ‖ input` and returns the
    /// ciphertext produced so far.
    pub fn update(&mut self, input: &[u8]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.carry.len() + input.len());
        buf.extend_from_slice(&self.carry);
        buf.extend_from_slice(input);

        let keep = buf.len() % self.block_size;
        let split = buf.len() - keep;
        self.carry.clear();
        self.carry.extend_from_slice(&buf[split..]);
        buf.truncate(split);

        self.backend.encrypt_blocks(&mut buf);
        buf
    }

    /// Pads the remaining partial block with PKCS#7 and encrypts it.
    ///
    /// Always emits exactly one block, so the total ciphertext is a positive
    /// multiple of the block size even for empty plaintext.
    pub fn finalize(mut self) -> Vec<u8> {
        let pos = self.carry.len();
        let mut block = vec![0u8; self.block_size];
        block[..pos].copy_from_slice(&self.carry);
        Pkcs7::raw_pad(&mut block, pos);
        self.backend.encrypt_blocks(&mut block);
        block
    }
}

// ============================================================================
// Streaming decryptor
// ============================================================================

/// Incremental CBC decryptor.
///
/// At least one block of ciphertext is held back across
/// [`update`](Self::update) calls so that the padding block is still
/// available when [`finalize`](Self::finalize) runs. Padding is stripped and
/// validated exactly once, at the end of the stream.
pub struct StreamDecryptor {
    backend: DecBackend,
    block_size: usize,
    // undecrypted ciphertext tail, between 1 and block_size bytes once fed
    carry: Vec<u8>,
    total: usize,
}

impl StreamDecryptor {
    /// Creates a decryptor for `algorithm` bound to `key` and `iv`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::CipherSetup`] if either length does not match
    /// the algorithm's requirements.
    pub fn new(algorithm: Algorithm, key: &[u8], iv: &[u8]) -> Result<Self, CryptoError> {
        Ok(Self {
            backend: DecBackend::new(algorithm, key, iv)?,
            block_size: algorithm.block_size(),
            carry: Vec::new(),
            total: 0,
        })
    }

    /// Decrypts every block of `carry ‖ input` except the trailing one and
    /// returns the recovered plaintext so far.
    pub fn update(&mut self, input: &[u8]) -> Zeroizing<Vec<u8>> {
        self.total += input.len();

        let mut buf = Vec::with_capacity(self.carry.len() + input.len());
        buf.extend_from_slice(&self.carry);
        buf.extend_from_slice(input);

        // retain the partial tail plus, when aligned, the final full block:
        // it may be the padding block
        let keep = if buf.is_empty() {
            0
        } else {
            (buf.len() - 1) % self.block_size + 1
        };
        let split = buf.len() - keep;
        self.carry.clear();
        self.carry.extend_from_slice(&buf[split..]);
        buf.truncate(split);

        self.backend.decrypt_blocks(&mut buf);
        Zeroizing::new(buf)
    }

    /// Decrypts the held-back block, validates its padding in constant time,
    /// and returns the remaining plaintext.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidCiphertextLength`] if the total input
    /// was empty or not a multiple of the block size, and
    /// [`CryptoError::PaddingValidation`] if the padding is inconsistent
    /// (which is also the usual symptom of decrypting with the wrong key or
    /// IV).
    pub fn finalize(mut self) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        if self.total == 0 || self.total % self.block_size != 0 {
            return Err(CryptoError::InvalidCiphertextLength {
                len: self.total,
                block_size: self.block_size,
            });
        }

        // carry is exactly one block here
        let mut block = Zeroizing::new(std::mem::take(&mut self.carry));
        self.backend.decrypt_blocks(&mut block);
        let pad = checked_pad_len(&block)?;
        block.truncate(self.block_size - pad);
        Ok(block)
    }
}

// ============================================================================
// One-shot operations
// ============================================================================

/// Encrypts `plaintext` under CBC with PKCS#7 padding.
///
/// Deterministic for identical (key, iv, plaintext); the output never embeds
/// the key or IV.
///
/// # Errors
///
/// Returns [`CryptoError::CipherSetup`] on key or IV length mismatch.
pub fn encrypt(
    algorithm: Algorithm,
    key: &[u8],
    iv: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let mut encryptor = StreamEncryptor::new(algorithm, key, iv)?;
    let mut ciphertext = encryptor.update(plaintext);
    ciphertext.extend_from_slice(&encryptor.finalize());
    Ok(ciphertext)
}

/// Decrypts CBC ciphertext and strips PKCS#7 padding.
///
/// The recovered plaintext is wrapped in `Zeroizing` for automatic memory
/// cleanup.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidCiphertextLength`] when the input is empty
/// or not block-aligned (before any cipher work), and
/// [`CryptoError::PaddingValidation`] on a failed padding check.
pub fn decrypt(
    algorithm: Algorithm,
    key: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if ciphertext.is_empty() || ciphertext.len() % algorithm.block_size() != 0 {
        return Err(CryptoError::InvalidCiphertextLength {
            len: ciphertext.len(),
            block_size: algorithm.block_size(),
        });
    }

    let mut decryptor = StreamDecryptor::new(algorithm, key, iv)?;
    let mut plaintext = decryptor.update(ciphertext);
    let tail = decryptor.finalize()?;
    plaintext.extend_from_slice(&tail);
    Ok(plaintext)
}

// ============================================================================
// Tests
// ============================================================================
