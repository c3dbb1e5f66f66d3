//! # Coffre Session
//!
//! Symmetric cipher sessions: CBC + PKCS#7 encryption and decryption of byte
//! buffers and file streams under one [`KeyMaterial`].
//!
//! ## Encrypted file format
//!
//! `encrypt_file` writes `iv ‖ ciphertext`: the session IV becomes a header
//! so the file can later be decrypted with the key alone. The in-memory
//! operations return raw ciphertext with nothing embedded; callers retain
//! the IV themselves.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::debug;
use zeroize::Zeroizing;

use coffre_crypto::cbc::{self, StreamDecryptor, StreamEncryptor};
use coffre_keyring::KeyMaterial;

pub use error::SessionError;

/// File-streaming chunk size. A multiple of every supported block size.
const CHUNK_SIZE: usize = 4096;

/// A cipher session binding one [`KeyMaterial`] to CBC mode with PKCS#7
/// padding.
///
/// The session borrows its key material and never outlives it. It holds no
/// state between calls: every `encrypt`/`decrypt` is independent, and
/// distinct sessions over distinct material may run on separate threads.
pub struct CipherSession<'k> {
    material: &'k KeyMaterial,
}

impl<'k> CipherSession<'k> {
    /// Creates a session over `material`.
    pub fn new(material: &'k KeyMaterial) -> Self {
        Self { material }
    }

    /// Encrypts `plaintext`, returning ciphertext whose length is a positive
    /// multiple of the block size.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::CipherSetup`](coffre_crypto::CryptoError) on
    /// key or IV length mismatch.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, SessionError> {
        let ciphertext = cbc::encrypt(
            self.material.algorithm(),
            self.material.key(),
            self.material.iv(),
            plaintext,
        )?;
        debug!(
            algorithm = %self.material.algorithm(),
            plaintext_len = plaintext.len(),
            ciphertext_len = ciphertext.len(),
            "buffer encrypted"
        );
        Ok(ciphertext)
    }

    /// Decrypts `ciphertext` and strips padding.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCiphertextLength` when the input is empty or not
    /// block-aligned and `PaddingValidation` when the padding check fails
    /// (the usual symptom of mismatched key material).
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>, SessionError> {
        let plaintext = cbc::decrypt(
            self.material.algorithm(),
            self.material.key(),
            self.material.iv(),
            ciphertext,
        )?;
        debug!(
            algorithm = %self.material.algorithm(),
            ciphertext_len = ciphertext.len(),
            "buffer decrypted"
        );
        Ok(plaintext)
    }

    /// Encrypts `input` to `output` in bounded-memory chunks.
    ///
    /// The output file starts with the session IV (`iv ‖ ciphertext`), so it
    /// can be decrypted later from the key alone. The write is not atomic;
    /// an I/O failure can leave a partial output file for the caller to
    /// clean up.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] for source or destination access
    /// failures and the cipher errors of [`encrypt`](Self::encrypt)
    /// otherwise.
    pub fn encrypt_file(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<(), SessionError> {
        let input = input.as_ref();
        let output = output.as_ref();

        let mut reader = BufReader::new(File::open(input)?);
        let mut writer = BufWriter::new(File::create(output)?);

        writer.write_all(self.material.iv())?;

        let mut encryptor = StreamEncryptor::new(
            self.material.algorithm(),
            self.material.key(),
            self.material.iv(),
        )?;

        let mut buf = Zeroizing::new([0u8; CHUNK_SIZE]);
        loop {
            let n = reader.read(&mut *buf)?;
            if n == 0 {
                break;
            }
            writer.write_all(&encryptor.update(&buf[..n]))?;
        }
        writer.write_all(&encryptor.finalize())?;
        writer.flush()?;

        debug!(
            algorithm = %self.material.algorithm(),
            input = %input.display(),
            output = %output.display(),
            "file encrypted"
        );
        Ok(())
    }

    /// Decrypts a file written by [`encrypt_file`](Self::encrypt_file).
    ///
    /// The IV is read from the file header; the session's key material
    /// supplies only the key. Padding is stripped exactly once, at the end
    /// of the stream.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] for access failures (including a file
    /// too short to hold the IV header) and the cipher errors of
    /// [`decrypt`](Self::decrypt) otherwise.
    pub fn decrypt_file(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<(), SessionError> {
        let input = input.as_ref();
        let output = output.as_ref();

        let mut reader = BufReader::new(File::open(input)?);
        let mut writer = BufWriter::new(File::create(output)?);

        let mut iv = vec![0u8; self.material.algorithm().block_size()];
        reader.read_exact(&mut iv)?;

        let mut decryptor =
            StreamDecryptor::new(self.material.algorithm(), self.material.key(), &iv)?;

        let mut buf = [0u8; CHUNK_SIZE];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            writer.write_all(&decryptor.update(&buf[..n]))?;
        }
        writer.write_all(&decryptor.finalize()?)?;
        writer.flush()?;

        debug!(
            algorithm = %self.material.algorithm(),
            input = %input.display(),
            output = %output.display(),
            "file decrypted"
        );
        Ok(())
    }
}
