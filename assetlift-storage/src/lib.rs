//! AssetLift Storage Backend
//!
//! Provides persistence for resumable uploads:
//! - `KeyValueStore` trait for pluggable byte-keyed storage
//! - `SledKvStore` for durable on-disk storage
//! - `MemoryKvStore` for testing
//! - `ResumableSessionStore`, namespaced CRUD over upload sessions

pub mod backend;
pub mod memory;
pub mod session_store;
pub mod sled_backend;

pub use backend::KeyValueStore;
pub use memory::MemoryKvStore;
pub use session_store::{ResumableSessionStore, SaveHandle, DEFAULT_PREFIX};
pub use sled_backend::SledKvStore;

use assetlift_core::error::Result;
use std::sync::Arc;

/// Session storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Path to the Sled database directory
    pub path: std::path::PathBuf,

    /// Key prefix isolating this consumer's sessions
    pub prefix: String,

    /// Flush the database after every save
    pub flush_on_save: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: std::path::PathBuf::from("./assetlift_sessions"),
            prefix: DEFAULT_PREFIX.to_string(),
            flush_on_save: true,
        }
    }
}

impl StorageConfig {
    /// Create a new storage config with the given path
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Set the key prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Enable/disable flushing after each save
    pub fn with_flush_on_save(mut self, enabled: bool) -> Self {
        self.flush_on_save = enabled;
        self
    }

    /// Open the Sled database and build a session store over it
    pub fn open_session_store(&self) -> Result<ResumableSessionStore> {
        let kv = SledKvStore::open(&self.path)?;
        Ok(ResumableSessionStore::new(Arc::new(kv), self.prefix.clone())
            .with_flush_on_save(self.flush_on_save))
    }
}
