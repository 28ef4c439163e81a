//! External content identifiers
//!
//! The shareable form of an [`Aci`], framed with multiformat conventions:
//!
//! ```text
//! 'b' ‖ base32lower( varint(version) ‖ varint(codec) ‖ varint(hash-fn) ‖ varint(len) ‖ digest )
//! ```
//!
//! | Field    | Value      | Meaning                                         |
//! |----------|------------|-------------------------------------------------|
//! | marker   | `b`        | multibase: RFC4648 base32, lowercase, no padding |
//! | version  | `0x01`     | identifier layout version                       |
//! | codec    | `0x300a01` | ACI v1 / sha256 / 32 bytes (multicodec private-use range) |
//! | hash-fn  | `0x12`     | sha2-256                                        |
//! | len      | `0x20`     | 32 digest bytes                                 |
//!
//! A future ACI version or algorithm gets a new [`CodecVersion`] with its own
//! codec value, so identifiers from different versions never collide.

use crate::aci::{Aci, DIGEST_LEN};
use data_encoding::{DecodeKind, Encoding};
use data_encoding_macro::new_encoding;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Multibase marker for lowercase unpadded base32
pub const MULTIBASE_BASE32_LOWER: char = 'b';

/// Multihash function code for sha2-256
pub const MULTIHASH_SHA2_256: u64 = 0x12;

/// Multicodec for "ACI v1, sha256, 32-byte digest"
pub const CODEC_ACI_V1_SHA256: u64 = 0x300a01;

/// Longest varint field accepted (63-bit values)
pub const MAX_VARINT_LEN: usize = 9;

/// RFC4648 base32, lowercase, unpadded; stray trailing bits are rejected
const BASE32_LOWER: Encoding = new_encoding! {
    symbols: "abcdefghijklmnopqrstuvwxyz234567",
    check_trailing_bits: true,
};

/// Reasons an external identifier is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentIdError {
    #[error("empty identifier")]
    Empty,

    #[error("unsupported multibase marker {0:?}")]
    UnsupportedMultibase(char),

    #[error("invalid base32 character {ch:?} at position {position}")]
    InvalidBase32Char { ch: char, position: usize },

    #[error("invalid base32 length: {0}")]
    InvalidBase32Length(usize),

    #[error("non-canonical base32 encoding")]
    NonCanonicalBase32,

    #[error("truncated identifier: missing {field}")]
    Truncated { field: &'static str },

    #[error("varint too long in {field}")]
    VarintOverflow { field: &'static str },

    #[error("varint not minimally encoded in {field}")]
    VarintNotMinimal { field: &'static str },

    #[error("unsupported identifier version: {0}")]
    UnsupportedVersion(u64),

    #[error("unsupported codec: {0:#x}")]
    UnsupportedCodec(u64),

    #[error("unsupported hash function: {0:#x}")]
    UnsupportedHashFunction(u64),

    #[error("declared digest length {0} does not match {DIGEST_LEN}")]
    DigestLengthMismatch(u64),

    #[error("digest payload is {actual} bytes, expected {expected}")]
    PayloadLength { expected: usize, actual: usize },
}

/// Identifier layouts this codec knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecVersion {
    /// ACI version 1 with a sha-256 digest
    V1,
}

impl CodecVersion {
    /// All known layouts, oldest first
    pub const ALL: [CodecVersion; 1] = [CodecVersion::V1];

    /// Value of the version field
    pub fn version(&self) -> u64 {
        match self {
            CodecVersion::V1 => 1,
        }
    }

    /// Value of the codec field
    pub fn codec(&self) -> u64 {
        match self {
            CodecVersion::V1 => CODEC_ACI_V1_SHA256,
        }
    }

    /// Multihash function code carried in the payload
    pub fn hash_code(&self) -> u64 {
        match self {
            CodecVersion::V1 => MULTIHASH_SHA2_256,
        }
    }

    /// Digest length the multihash must declare
    pub fn digest_len(&self) -> usize {
        match self {
            CodecVersion::V1 => DIGEST_LEN,
        }
    }

    /// Resolve a (version, codec) pair read from an identifier
    fn resolve(version: u64, codec: u64) -> Result<Self, ContentIdError> {
        let mut version_known = false;
        for candidate in Self::ALL {
            if candidate.version() == version {
                version_known = true;
                if candidate.codec() == codec {
                    return Ok(candidate);
                }
            }
        }

        if version_known {
            Err(ContentIdError::UnsupportedCodec(codec))
        } else {
            Err(ContentIdError::UnsupportedVersion(version))
        }
    }
}

/// A decoded external content identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentId {
    version: CodecVersion,
    digest: [u8; DIGEST_LEN],
}

impl ContentId {
    /// Derive the external identifier of an ACI
    pub fn from_aci(aci: &Aci) -> Self {
        Self {
            version: CodecVersion::V1,
            digest: *aci.digest(),
        }
    }

    /// Recover the ACI this identifier names
    pub fn to_aci(&self) -> Aci {
        Aci::from_digest(self.digest)
    }

    /// Layout version of this identifier
    pub fn version(&self) -> CodecVersion {
        self.version
    }

    /// Raw digest bytes
    pub fn digest(&self) -> &[u8; DIGEST_LEN] {
        &self.digest
    }

    /// Binary form, without the multibase marker
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + DIGEST_LEN);
        write_varint(&mut out, self.version.version());
        write_varint(&mut out, self.version.codec());
        write_varint(&mut out, self.version.hash_code());
        write_varint(&mut out, self.version.digest_len() as u64);
        out.extend_from_slice(&self.digest);
        out
    }

    /// Parse the binary form (no multibase marker)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ContentIdError> {
        let (version, rest) = read_varint(bytes, "version")?;
        let (codec, rest) = read_varint(rest, "codec")?;

        let layout = CodecVersion::resolve(version, codec)?;

        let (hash_code, rest) = read_varint(rest, "hash function")?;
        if hash_code != layout.hash_code() {
            return Err(ContentIdError::UnsupportedHashFunction(hash_code));
        }

        let (declared_len, rest) = read_varint(rest, "digest length")?;
        if declared_len != layout.digest_len() as u64 {
            return Err(ContentIdError::DigestLengthMismatch(declared_len));
        }

        if rest.len() != layout.digest_len() {
            return Err(ContentIdError::PayloadLength {
                expected: layout.digest_len(),
                actual: rest.len(),
            });
        }

        let mut digest = [0u8; DIGEST_LEN];
        digest.copy_from_slice(rest);
        Ok(Self {
            version: layout,
            digest,
        })
    }

    /// Text form: multibase marker followed by base32
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(64);
        out.push(MULTIBASE_BASE32_LOWER);
        out.push_str(&BASE32_LOWER.encode(&self.to_bytes()));
        out
    }

    /// Parse the text form
    pub fn parse(s: &str) -> Result<Self, ContentIdError> {
        let mut chars = s.chars();
        let marker = chars.next().ok_or(ContentIdError::Empty)?;
        if marker != MULTIBASE_BASE32_LOWER {
            return Err(ContentIdError::UnsupportedMultibase(marker));
        }

        let bytes = base32_decode(chars.as_str())?;
        Self::from_bytes(&bytes)
    }
}

fn base32_decode(s: &str) -> Result<Vec<u8>, ContentIdError> {
    BASE32_LOWER.decode(s.as_bytes()).map_err(|e| match e.kind {
        DecodeKind::Symbol => ContentIdError::InvalidBase32Char {
            ch: s
                .get(e.position..)
                .and_then(|rest| rest.chars().next())
                .unwrap_or(char::REPLACEMENT_CHARACTER),
            position: e.position,
        },
        DecodeKind::Length => ContentIdError::InvalidBase32Length(s.len()),
        _ => ContentIdError::NonCanonicalBase32,
    })
}

fn write_varint(out: &mut Vec<u8>, value: u64) {
    let mut buf = unsigned_varint::encode::u64_buffer();
    out.extend_from_slice(unsigned_varint::encode::u64(value, &mut buf));
}

/// Read one varint field, returning its value and the bytes after it
fn read_varint<'a>(
    input: &'a [u8],
    field: &'static str,
) -> Result<(u64, &'a [u8]), ContentIdError> {
    use unsigned_varint::decode::Error;

    let (value, rest) = unsigned_varint::decode::u64(input).map_err(|e| match e {
        Error::Insufficient => ContentIdError::Truncated { field },
        Error::NotMinimal => ContentIdError::VarintNotMinimal { field },
        _ => ContentIdError::VarintOverflow { field },
    })?;
    if input.len() - rest.len() > MAX_VARINT_LEN {
        return Err(ContentIdError::VarintOverflow { field });
    }
    Ok((value, rest))
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({:?}, {})", self.version, &hex::encode(self.digest)[..16])
    }
}

impl FromStr for ContentId {
    type Err = ContentIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<&Aci> for ContentId {
    fn from(aci: &Aci) -> Self {
        Self::from_aci(aci)
    }
}

impl Serialize for ContentId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for ContentId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_id() -> ContentId {
        ContentId::from_aci(&Aci::from_digest([0u8; 32]))
    }

    #[test]
    fn test_binary_layout() {
        let bytes = zero_id().to_bytes();
        assert_eq!(&bytes[..7], &[0x01, 0x81, 0x94, 0xc0, 0x01, 0x12, 0x20]);
        assert_eq!(bytes.len(), 7 + 32);
        assert!(bytes[7..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_text_form_shape() {
        let encoded = zero_id().encode();
        assert!(encoded.starts_with('b'));
        // 39 bytes -> 63 base32 symbols, plus marker
        assert_eq!(encoded.len(), 64);
        assert!(encoded[1..]
            .chars()
            .all(|c| c.is_ascii_lowercase() || ('2'..='7').contains(&c)));
    }

    #[test]
    fn test_parse_roundtrip() {
        let id = zero_id();
        let parsed = ContentId::parse(&id.encode()).unwrap();
        assert_eq!(parsed, id);
        assert_eq!(parsed.version(), CodecVersion::V1);
        assert_eq!(parsed.to_aci(), Aci::from_digest([0u8; 32]));
    }

    #[test]
    fn test_rejects_other_multibase() {
        let encoded = zero_id().encode();
        let foreign = format!("B{}", &encoded[1..]);
        assert_eq!(
            ContentId::parse(&foreign),
            Err(ContentIdError::UnsupportedMultibase('B'))
        );
        assert_eq!(
            ContentId::parse("zQmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG"),
            Err(ContentIdError::UnsupportedMultibase('z'))
        );
        assert_eq!(ContentId::parse(""), Err(ContentIdError::Empty));
    }

    #[test]
    fn test_rejects_unknown_version_and_codec() {
        let mut bytes = zero_id().to_bytes();
        bytes[0] = 0x02;
        assert_eq!(
            ContentId::from_bytes(&bytes),
            Err(ContentIdError::UnsupportedVersion(2))
        );

        // version 1 with the dag-pb codec
        let mut other = vec![0x01, 0x70, 0x12, 0x20];
        other.extend_from_slice(&[0u8; 32]);
        assert_eq!(
            ContentId::from_bytes(&other),
            Err(ContentIdError::UnsupportedCodec(0x70))
        );
    }

    #[test]
    fn test_rejects_multihash_mismatches() {
        let mut bytes = zero_id().to_bytes();
        bytes[5] = 0x1e; // blake3
        assert_eq!(
            ContentId::from_bytes(&bytes),
            Err(ContentIdError::UnsupportedHashFunction(0x1e))
        );

        let mut bytes = zero_id().to_bytes();
        bytes[6] = 0x10;
        assert_eq!(
            ContentId::from_bytes(&bytes),
            Err(ContentIdError::DigestLengthMismatch(0x10))
        );

        let bytes = zero_id().to_bytes();
        assert_eq!(
            ContentId::from_bytes(&bytes[..bytes.len() - 1]),
            Err(ContentIdError::PayloadLength {
                expected: 32,
                actual: 31
            })
        );

        let mut long = zero_id().to_bytes();
        long.push(0);
        assert_eq!(
            ContentId::from_bytes(&long),
            Err(ContentIdError::PayloadLength {
                expected: 32,
                actual: 33
            })
        );
    }

    #[test]
    fn test_rejects_truncated_header() {
        assert_eq!(
            ContentId::parse("b"),
            Err(ContentIdError::Truncated { field: "version" })
        );
        assert_eq!(
            ContentId::from_bytes(&[0x01, 0x81, 0x94]),
            Err(ContentIdError::Truncated { field: "codec" })
        );
        assert_eq!(
            ContentId::from_bytes(&[0x01, 0x81, 0x94, 0xc0, 0x01, 0x12]),
            Err(ContentIdError::Truncated {
                field: "digest length"
            })
        );
    }

    #[test]
    fn test_base32_matches_rfc4648_lowercase() {
        // RFC4648 section 10, lowercased, padding removed
        let vectors: [(&[u8], &str); 4] = [
            (b"", ""),
            (b"f", "my"),
            (b"foob", "mzxw6yq"),
            (b"foobar", "mzxw6ytboi"),
        ];
        for (raw, encoded) in vectors {
            assert_eq!(BASE32_LOWER.encode(raw), encoded);
            assert_eq!(base32_decode(encoded).unwrap(), raw);
        }
    }

    #[test]
    fn test_base32_error_mapping() {
        assert_eq!(
            base32_decode("mzxW6"),
            Err(ContentIdError::InvalidBase32Char { ch: 'W', position: 3 })
        );
        assert_eq!(
            base32_decode("mz=a"),
            Err(ContentIdError::InvalidBase32Char { ch: '=', position: 2 })
        );
        assert!(matches!(
            base32_decode("mzé"),
            Err(ContentIdError::InvalidBase32Char { ch: 'é', .. })
        ));
        assert_eq!(base32_decode("mzx"), Err(ContentIdError::InvalidBase32Length(3)));
        // "my" is "f"; "mz" carries a stray low bit
        assert_eq!(base32_decode("mz"), Err(ContentIdError::NonCanonicalBase32));
    }

    #[test]
    fn test_varint_error_mapping() {
        assert_eq!(
            read_varint(&[0x81, 0x94, 0xc0, 0x01, 0xaa], "codec"),
            Ok((CODEC_ACI_V1_SHA256, &[0xaa][..]))
        );
        assert_eq!(
            read_varint(&[0x81, 0x80], "codec"),
            Err(ContentIdError::Truncated { field: "codec" })
        );
        assert_eq!(
            read_varint(&[0x81, 0x00], "codec"),
            Err(ContentIdError::VarintNotMinimal { field: "codec" })
        );
        assert_eq!(
            read_varint(&[0xff; 11], "codec"),
            Err(ContentIdError::VarintOverflow { field: "codec" })
        );
        // a 10-byte varint is valid u64 but longer than the field allows
        let mut ten = vec![0xff; 9];
        ten.push(0x01);
        assert_eq!(
            read_varint(&ten, "codec"),
            Err(ContentIdError::VarintOverflow { field: "codec" })
        );
    }

    #[test]
    fn test_padded_version_field_rejected() {
        // 0x81 0x00 is a two-byte spelling of 1
        let mut bytes = vec![0x81, 0x00];
        bytes.extend_from_slice(&zero_id().to_bytes()[1..]);
        assert_eq!(
            ContentId::from_bytes(&bytes),
            Err(ContentIdError::VarintNotMinimal { field: "version" })
        );
    }
}
