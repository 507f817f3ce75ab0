use crate::encoding::{self, HashInput};
use crate::error::{LedgerError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DigestAlgorithm {
    #[default]
    Sha256,
}

impl FromStr for DigestAlgorithm {
    type Err = LedgerError;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(DigestAlgorithm::Sha256),
            _ => Err(LedgerError::DigestUnavailable(name.to_string())),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DigestAlgorithm::Sha256 => f.write_str("SHA-256"),
        }
    }
}

/// Digests canonical bytes and renders them as standard base64 text. The
/// difficulty check runs against this text, not the raw digest bits.
#[derive(Clone, Debug, Default)]
pub struct Hasher {
    algorithm: DigestAlgorithm,
}

impl Hasher {
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Resolves a configured algorithm name. An unknown name is a start-up
    /// failure, never something to recover from at runtime.
    pub fn from_name(name: &str) -> Result<Self> {
        name.parse().map(Self::new)
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn hash(&self, bytes: &[u8]) -> String {
        match self.algorithm {
            DigestAlgorithm::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(bytes);
                STANDARD.encode(hasher.finalize())
            }
        }
    }

    pub fn hash_block(&self, input: &HashInput<'_>) -> Result<String> {
        Ok(self.hash(&encoding::encode(input)?))
    }
}
