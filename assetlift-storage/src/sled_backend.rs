//! Sled-based key-value store
//!
//! Durable backing store for upload session records.
//! Sled provides atomic single-key writes and is pure Rust.

use crate::backend::KeyValueStore;
use assetlift_core::error::{AssetLiftError, Result};
use bytes::Bytes;
use std::path::Path;
use tracing::{debug, info};

/// Tree used when none is named explicitly
pub const DEFAULT_TREE: &str = "upload_sessions";

fn storage_err(e: sled::Error) -> AssetLiftError {
    AssetLiftError::Storage(e.to_string())
}

/// Sled-based key-value store
pub struct SledKvStore {
    db: sled::Db,
    tree: sled::Tree,
}

impl SledKvStore {
    /// Open or create a store at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        info!(path = ?path.as_ref(), "Opening Sled session store");

        let db = sled::open(path.as_ref())
            .map_err(|e| AssetLiftError::Storage(format!("Failed to open Sled: {}", e)))?;
        Self::with_tree(db, DEFAULT_TREE)
    }

    /// Open an in-memory store (for testing)
    pub fn open_temporary() -> Result<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(|e| AssetLiftError::Storage(format!("Failed to open Sled: {}", e)))?;
        Self::with_tree(db, DEFAULT_TREE)
    }

    /// Use a named tree inside an already open database
    pub fn with_tree(db: sled::Db, tree: &str) -> Result<Self> {
        let tree = db.open_tree(tree).map_err(storage_err)?;
        Ok(Self { db, tree })
    }
}

impl KeyValueStore for SledKvStore {
    fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        Ok(self
            .tree
            .get(key)
            .map_err(storage_err)?
            .map(|v| Bytes::copy_from_slice(&v)))
    }

    fn put(&self, key: &[u8], value: Bytes) -> Result<()> {
        self.tree.insert(key, value.as_ref()).map_err(storage_err)?;
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<bool> {
        Ok(self.tree.remove(key).map_err(storage_err)?.is_some())
    }

    fn keys_with_prefix(&self, prefix: &[u8]) -> Result<Vec<Bytes>> {
        self.tree
            .scan_prefix(prefix)
            .keys()
            .map(|k| k.map(|k| Bytes::copy_from_slice(&k)).map_err(storage_err))
            .collect()
    }

    fn flush(&self) -> Result<()> {
        let flushed = self.db.flush().map_err(storage_err)?;
        debug!(bytes = flushed, "Flushed Sled store");
        Ok(())
    }
}
