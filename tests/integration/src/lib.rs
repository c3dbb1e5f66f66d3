//! Integration tests for the Coffre workspace.
//!
//! These tests verify the complete workflow: generate key material, persist
//! and reload it, run cipher sessions over buffers and files, and move
//! ciphertext through the text encodings.

// Allow unwrap() in tests - panics are acceptable for test assertions
#![allow(clippy::disallowed_methods)]

#[cfg(test)]
mod tests {
    use coffre_crypto::{encoding, Algorithm, CryptoError};
    use coffre_keyring::{KeyMaterial, KeyringError};
    use coffre_session::{CipherSession, SessionError};
    use tempfile::TempDir;

    #[test]
    fn test_full_workflow_buffer() {
        let tmp = TempDir::new().unwrap();
        let key_path = tmp.path().join("workflow.key");

        // generate and persist
        let material = KeyMaterial::generate(Algorithm::Aes256).unwrap();
        material.save_to_file(&key_path).unwrap();

        // reload in a "second process" and encrypt
        let reloaded = KeyMaterial::load_from_file(Algorithm::Aes256, &key_path).unwrap();
        let session = CipherSession::new(&reloaded);
        let ciphertext = session.encrypt(b"hello world").unwrap();

        // ship as base64, receive, decrypt with the original material
        let wire = encoding::to_base64(&ciphertext);
        let received = encoding::from_base64(&wire).unwrap();
        let recovered = CipherSession::new(&material).decrypt(&received).unwrap();
        assert_eq!(&*recovered, b"hello world");
    }

    #[test]
    fn test_full_workflow_files() {
        let tmp = TempDir::new().unwrap();
        let key_path = tmp.path().join("files.key");
        let plain_path = tmp.path().join("report.txt");
        let enc_path = tmp.path().join("report.enc");
        let dec_path = tmp.path().join("report.out");

        let content: Vec<u8> = (0..50_000).map(|i| (i * 7 % 256) as u8).collect();
        std::fs::write(&plain_path, &content).unwrap();

        KeyMaterial::generate(Algorithm::Aes128)
            .unwrap()
            .save_to_file(&key_path)
            .unwrap();

        // encrypt with one loaded copy, decrypt with another
        {
            let material = KeyMaterial::load_from_file(Algorithm::Aes128, &key_path).unwrap();
            CipherSession::new(&material)
                .encrypt_file(&plain_path, &enc_path)
                .unwrap();
        }
        {
            let material = KeyMaterial::load_from_file(Algorithm::Aes128, &key_path).unwrap();
            CipherSession::new(&material)
                .decrypt_file(&enc_path, &dec_path)
                .unwrap();
        }

        assert_eq!(std::fs::read(&dec_path).unwrap(), content);
    }

    #[test]
    fn test_all_algorithms_end_to_end() {
        for alg in [Algorithm::Des, Algorithm::Aes128, Algorithm::Aes256] {
            let material = KeyMaterial::generate(alg).unwrap();
            let session = CipherSession::new(&material);

            let blob = material.to_bytes();
            let restored = KeyMaterial::from_bytes(alg, &blob).unwrap();
            assert_eq!(restored.key(), material.key());

            let ciphertext = session.encrypt(b"portable payload").unwrap();
            let recovered = CipherSession::new(&restored).decrypt(&ciphertext).unwrap();
            assert_eq!(&*recovered, b"portable payload");
        }
    }

    #[test]
    fn test_error_paths_surface_correct_kinds() {
        let tmp = TempDir::new().unwrap();

        // short key file
        let short_path = tmp.path().join("short.key");
        std::fs::write(&short_path, [0u8; 10]).unwrap();
        assert!(matches!(
            KeyMaterial::load_from_file(Algorithm::Aes128, &short_path),
            Err(KeyringError::TruncatedKeyMaterial {
                expected: 32,
                actual: 10
            })
        ));

        // misaligned ciphertext
        let material = KeyMaterial::generate(Algorithm::Aes128).unwrap();
        assert!(matches!(
            CipherSession::new(&material).decrypt(&[0u8; 17]),
            Err(SessionError::Crypto(
                CryptoError::InvalidCiphertextLength { len: 17, .. }
            ))
        ));

        // tampered padding block
        let session = CipherSession::new(&material);
        let mut ciphertext = session.encrypt(b"tamper target").unwrap();
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0xff;
        match session.decrypt(&ciphertext) {
            Err(SessionError::Crypto(CryptoError::PaddingValidation)) => {}
            Ok(recovered) => assert_ne!(&*recovered, b"tamper target"),
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn test_hex_transport_of_key_file_blob() {
        // a key blob can be moved through a text channel and reconstructed
        let material = KeyMaterial::generate(Algorithm::Aes256).unwrap();
        let hex_blob = encoding::to_hex(&material.to_bytes());

        let bytes = encoding::from_hex(&hex_blob).unwrap();
        let restored = KeyMaterial::from_bytes(Algorithm::Aes256, &bytes).unwrap();
        assert_eq!(restored.key(), material.key());
        assert_eq!(restored.iv(), material.iv());
    }
}
