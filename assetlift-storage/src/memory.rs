//! In-memory key-value store
//!
//! Used for testing and development. Not persistent.

use crate::backend::KeyValueStore;
use assetlift_core::error::{AssetLiftError, Result};
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// In-memory key-value store
pub struct MemoryKvStore {
    /// Stored entries, ordered for prefix scans
    entries: RwLock<BTreeMap<Vec<u8>, Bytes>>,

    /// Simulates an unavailable storage medium
    unavailable: AtomicBool,

    /// Operation counters
    reads: AtomicU64,
    writes: AtomicU64,
    deletes: AtomicU64,
}

impl MemoryKvStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            unavailable: AtomicBool::new(false),
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            deletes: AtomicU64::new(0),
        }
    }

    /// Make every operation fail with a storage error (or recover)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// (reads, writes, deletes) performed so far
    pub fn op_counts(&self) -> (u64, u64, u64) {
        (
            self.reads.load(Ordering::Relaxed),
            self.writes.load(Ordering::Relaxed),
            self.deletes.load(Ordering::Relaxed),
        )
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AssetLiftError::Storage(
                "storage medium unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        self.check_available()?;
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &[u8], value: Bytes) -> Result<()> {
        self.check_available()?;
        self.entries.write().insert(key.to_vec(), value);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<bool> {
        self.check_available()?;
        let removed = self.entries.write().remove(key).is_some();
        if removed {
            self.deletes.fetch_add(1, Ordering::Relaxed);
        }
        Ok(removed)
    }

    fn keys_with_prefix(&self, prefix: &[u8]) -> Result<Vec<Bytes>> {
        self.check_available()?;
        let entries = self.entries.read();
        Ok(entries
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| Bytes::copy_from_slice(k))
            .collect())
    }

    fn flush(&self) -> Result<()> {
        // No-op for in-memory storage
        self.check_available()
    }
}
