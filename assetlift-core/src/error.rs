//! Error types for AssetLift
//!
//! Provides a unified error type for all AssetLift library operations.

use crate::aci::AciError;
use crate::content_id::ContentIdError;
use thiserror::Error;

/// Result type alias for AssetLift operations
pub type Result<T> = std::result::Result<T, AssetLiftError>;

/// Unified error type for AssetLift
#[derive(Error, Debug)]
pub enum AssetLiftError {
    // ===== Identity Errors =====
    #[error("Invalid ACI: {0}")]
    InvalidAci(#[from] AciError),

    #[error("Invalid content identifier: {0}")]
    InvalidContentId(#[from] ContentIdError),

    // ===== Session Errors =====
    #[error("Invalid upload session: {0}")]
    InvalidSession(String),

    #[error("Chunk index out of range: {index} (total chunks: {total})")]
    ChunkIndexOutOfRange { index: u64, total: u64 },

    // ===== Storage Errors =====
    #[error("Storage error: {0}")]
    Storage(String),

    // ===== I/O Errors =====
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ===== Serialization Errors =====
    #[error("Serialization error: {0}")]
    Serialization(String),

    // ===== Configuration Errors =====
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ===== Generic Errors =====
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<bincode::Error> for AssetLiftError {
    fn from(err: bincode::Error) -> Self {
        AssetLiftError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AssetLiftError::ChunkIndexOutOfRange { index: 9, total: 4 };
        assert_eq!(
            err.to_string(),
            "Chunk index out of range: 9 (total chunks: 4)"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: AssetLiftError = io_err.into();
        assert!(matches!(err, AssetLiftError::Io(_)));
    }

    #[test]
    fn test_error_from_aci() {
        let err: AssetLiftError = AciError::UnsupportedVersion("2".to_string()).into();
        assert_eq!(err.to_string(), "Invalid ACI: unsupported ACI version: 2");
    }
}
