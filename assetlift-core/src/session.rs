//! Resumable upload session state
//!
//! An `UploadSession` records which chunks of one file have been committed.
//! It is owned by the caller and persisted explicitly; mutating it never
//! touches storage.

use crate::error::{AssetLiftError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::Range;
use uuid::Uuid;

/// Progress of one resumable upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSession {
    /// Stable identifier of this upload attempt
    pub session_id: String,

    /// Name of the file being uploaded
    pub file_name: String,

    /// Total file size in bytes
    pub file_size: u64,

    /// Chunk size in bytes (never zero)
    pub chunk_size: u64,

    /// Zero-based indices of committed chunks
    completed_chunks: BTreeSet<u64>,

    /// When the session was created
    pub created_at: DateTime<Utc>,

    /// When a chunk was last marked complete
    pub updated_at: DateTime<Utc>,
}

impl UploadSession {
    /// Start a new session with a random id
    pub fn new(file_name: impl Into<String>, file_size: u64, chunk_size: u64) -> Result<Self> {
        Self::with_session_id(Uuid::new_v4().to_string(), file_name, file_size, chunk_size)
    }

    /// Start a new session under a caller-chosen id
    pub fn with_session_id(
        session_id: impl Into<String>,
        file_name: impl Into<String>,
        file_size: u64,
        chunk_size: u64,
    ) -> Result<Self> {
        let session_id = session_id.into();
        if session_id.is_empty() {
            return Err(AssetLiftError::InvalidSession(
                "session id must not be empty".to_string(),
            ));
        }
        if chunk_size == 0 {
            return Err(AssetLiftError::InvalidSession(
                "chunk size must be greater than zero".to_string(),
            ));
        }

        let now = Utc::now();
        Ok(Self {
            session_id,
            file_name: file_name.into(),
            file_size,
            chunk_size,
            completed_chunks: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Number of chunks the file splits into
    pub fn total_chunks(&self) -> u64 {
        self.file_size.div_ceil(self.chunk_size)
    }

    /// Record chunk `index` as committed.
    ///
    /// Returns `true` if the chunk was newly recorded, `false` if it was
    /// already complete.
    pub fn mark_chunk_completed(&mut self, index: u64) -> Result<bool> {
        let total = self.total_chunks();
        if index >= total {
            return Err(AssetLiftError::ChunkIndexOutOfRange { index, total });
        }

        let inserted = self.completed_chunks.insert(index);
        if inserted {
            self.updated_at = Utc::now();
        }
        Ok(inserted)
    }

    /// Whether chunk `index` is committed
    pub fn is_chunk_completed(&self, index: u64) -> bool {
        self.completed_chunks.contains(&index)
    }

    /// Committed chunk indices in ascending order
    pub fn completed_chunks(&self) -> &BTreeSet<u64> {
        &self.completed_chunks
    }

    /// Number of committed chunks
    pub fn completed_count(&self) -> u64 {
        self.completed_chunks.len() as u64
    }

    /// Chunks still to send, in ascending order
    pub fn missing_chunks(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.total_chunks()).filter(move |i| !self.completed_chunks.contains(i))
    }

    /// Whether every chunk is committed
    pub fn is_complete(&self) -> bool {
        self.completed_count() == self.total_chunks()
    }

    /// Fraction of chunks committed, in [0, 1]. An empty file is complete.
    pub fn progress(&self) -> f64 {
        let total = self.total_chunks();
        if total == 0 {
            1.0
        } else {
            self.completed_count() as f64 / total as f64
        }
    }

    /// Byte range of chunk `index`; the last chunk may be short
    pub fn chunk_range(&self, index: u64) -> Option<Range<u64>> {
        if index >= self.total_chunks() {
            return None;
        }
        let start = index * self.chunk_size;
        let end = start.saturating_add(self.chunk_size).min(self.file_size);
        Some(start..end)
    }

    /// Bytes covered by committed chunks
    pub fn bytes_committed(&self) -> u64 {
        self.completed_chunks
            .iter()
            .filter_map(|&i| self.chunk_range(i))
            .map(|r| r.end - r.start)
            .sum()
    }

    /// Check the subset invariant on a session that came from outside
    /// (e.g. deserialized from storage)
    pub fn validate(&self) -> Result<()> {
        if self.session_id.is_empty() {
            return Err(AssetLiftError::InvalidSession(
                "session id must not be empty".to_string(),
            ));
        }
        if self.chunk_size == 0 {
            return Err(AssetLiftError::InvalidSession(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        let total = self.total_chunks();
        if let Some(&index) = self.completed_chunks.iter().next_back() {
            if index >= total {
                return Err(AssetLiftError::ChunkIndexOutOfRange { index, total });
            }
        }
        Ok(())
    }
}
