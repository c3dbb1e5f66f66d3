//! Supported block-cipher algorithms and their parameter sizes.

use std::str::FromStr;

use crate::error::CryptoError;

/// Block ciphers supported for CBC encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// DES with a 64-bit key (parity bits included) and 64-bit blocks.
    ///
    /// Kept for interoperability with legacy material only.
    Des,
    /// AES with a 128-bit key.
    Aes128,
    /// AES with a 256-bit key.
    Aes256,
}

impl Algorithm {
    /// Key length in bytes.
    pub fn key_len(self) -> usize {
        match self {
            Self::Des => 8,
            Self::Aes128 => 16,
            Self::Aes256 => 32,
        }
    }

    /// Block size in bytes. The IV is always exactly one block.
    pub fn block_size(self) -> usize {
        match self {
            Self::Des => 8,
            Self::Aes128 | Self::Aes256 => 16,
        }
    }

    /// Length of the serialized key material blob (`key ‖ iv`).
    pub fn material_len(self) -> usize {
        self.key_len() + self.block_size()
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Des => write!(f, "des"),
            Self::Aes128 => write!(f, "aes128"),
            Self::Aes256 => write!(f, "aes256"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "des" => Ok(Self::Des),
            "aes128" => Ok(Self::Aes128),
            "aes256" => Ok(Self::Aes256),
            _ => Err(CryptoError::UnknownAlgorithm(s.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_sizes() {
        assert_eq!(Algorithm::Des.key_len(), 8);
        assert_eq!(Algorithm::Des.block_size(), 8);
        assert_eq!(Algorithm::Aes128.key_len(), 16);
        assert_eq!(Algorithm::Aes128.block_size(), 16);
        assert_eq!(Algorithm::Aes256.key_len(), 32);
        assert_eq!(Algorithm::Aes256.block_size(), 16);
        assert_eq!(Algorithm::Aes256.material_len(), 48);
    }

    #[test]
    fn test_display_parse_roundtrip() {
        for alg in [Algorithm::Des, Algorithm::Aes128, Algorithm::Aes256] {
            let parsed: Algorithm = alg.to_string().parse().unwrap();
            assert_eq!(parsed, alg);
        }
    }

    #[test]
    fn test_unknown_algorithm() {
        let result = "3des".parse::<Algorithm>();
        assert!(matches!(result, Err(CryptoError::UnknownAlgorithm(_))));
    }
}
