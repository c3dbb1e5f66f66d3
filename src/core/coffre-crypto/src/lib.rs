//! # Coffre Crypto
//!
//! Core cryptographic primitives for Coffre.
//!
//! This crate provides low-level cryptographic operations including:
//! - CBC-mode block encryption with PKCS#7 padding (DES, AES-128, AES-256)
//! - Streaming encrypt/decrypt for bounded-memory file processing
//! - Hex and base64 encoding for text-safe transport
//! - Secure random generation
//!
//! Block-cipher transforms themselves come from the RustCrypto backend
//! crates; nothing in this crate implements a primitive.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod algorithm;
pub mod cbc;
pub mod encoding;
pub mod error;
pub mod random;

pub use algorithm::Algorithm;
pub use error::CryptoError;
