//! Internal content identifiers (ACI)
//!
//! An ACI names a bundle by the digest of its content:
//! `aci:<version>:<algorithm>:<digest-hex>`
//! Example: `aci:1:sha256:9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08`
//!
//! Only version `1` with `sha256` and a 64-character lowercase hex digest is
//! valid. Anything else is rejected rather than interpreted.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Scheme tag that starts every ACI
pub const ACI_SCHEME: &str = "aci";

/// The only ACI version currently defined
pub const ACI_VERSION: &str = "1";

/// The only digest algorithm currently defined
pub const ACI_ALGORITHM: &str = "sha256";

/// Raw digest length in bytes
pub const DIGEST_LEN: usize = 32;

/// Digest length in hex characters
pub const DIGEST_HEX_LEN: usize = DIGEST_LEN * 2;

/// Reasons an ACI string is rejected, in validation order
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AciError {
    #[error("empty identifier")]
    Empty,

    #[error("expected 4 ':'-separated components, got {0}")]
    ComponentCount(usize),

    #[error("invalid scheme tag: {0}")]
    InvalidScheme(String),

    #[error("unsupported ACI version: {0}")]
    UnsupportedVersion(String),

    #[error("unsupported digest algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("digest must be {DIGEST_HEX_LEN} hex characters, got {0}")]
    DigestLength(usize),

    #[error("digest contains invalid character {0:?} (lowercase hex only)")]
    InvalidDigestChar(char),
}

/// A validated ACI (version 1, sha256)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Aci {
    digest: [u8; DIGEST_LEN],
}

impl Aci {
    /// Build an ACI from an already computed sha-256 digest
    pub fn from_digest(digest: [u8; DIGEST_LEN]) -> Self {
        Self { digest }
    }

    /// Hash `data` with sha-256 and wrap the digest
    pub fn compute(data: &[u8]) -> Self {
        Self::from_digest(Sha256::digest(data).into())
    }

    /// Parse and validate an ACI string
    pub fn parse(s: &str) -> Result<Self, AciError> {
        if s.is_empty() {
            return Err(AciError::Empty);
        }

        let parts: Vec<&str> = s.split(':').collect();
        let [scheme, version, algorithm, digest_hex] = parts[..] else {
            return Err(AciError::ComponentCount(parts.len()));
        };

        if scheme != ACI_SCHEME {
            return Err(AciError::InvalidScheme(scheme.to_string()));
        }
        if version != ACI_VERSION {
            return Err(AciError::UnsupportedVersion(version.to_string()));
        }
        if algorithm != ACI_ALGORITHM {
            return Err(AciError::UnsupportedAlgorithm(algorithm.to_string()));
        }
        if digest_hex.len() != DIGEST_HEX_LEN {
            return Err(AciError::DigestLength(digest_hex.len()));
        }
        // hex::decode accepts uppercase, the ACI grammar does not
        if let Some(bad) = digest_hex
            .chars()
            .find(|c| !matches!(c, '0'..='9' | 'a'..='f'))
        {
            return Err(AciError::InvalidDigestChar(bad));
        }

        let mut digest = [0u8; DIGEST_LEN];
        hex::decode_to_slice(digest_hex, &mut digest)
            .map_err(|_| AciError::DigestLength(digest_hex.len()))?;

        Ok(Self { digest })
    }

    /// Raw digest bytes
    pub fn digest(&self) -> &[u8; DIGEST_LEN] {
        &self.digest
    }

    /// Lowercase hex digest
    pub fn to_hex(&self) -> String {
        hex::encode(self.digest)
    }

    /// Verify that `data` hashes to this ACI
    pub fn verify(&self, data: &[u8]) -> bool {
        Self::compute(data) == *self
    }
}

impl fmt::Display for Aci {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            ACI_SCHEME,
            ACI_VERSION,
            ACI_ALGORITHM,
            self.to_hex()
        )
    }
}

impl fmt::Debug for Aci {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Aci({})", &self.to_hex()[..16])
    }
}

impl FromStr for Aci {
    type Err = AciError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Aci {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Aci {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
