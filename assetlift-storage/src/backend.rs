//! Key-value store trait
//!
//! The persistence primitive underneath the session store. Keys and values
//! are opaque bytes; a single-key write must be atomic.

use assetlift_core::error::Result;
use bytes::Bytes;

/// Byte-keyed persistent store
///
/// All implementations must be Send + Sync so one handle can be shared by
/// every upload worker.
pub trait KeyValueStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &[u8]) -> Result<Option<Bytes>>;

    /// Write a value, replacing any previous one
    fn put(&self, key: &[u8], value: Bytes) -> Result<()>;

    /// Remove a value; returns whether it existed
    fn delete(&self, key: &[u8]) -> Result<bool>;

    /// All keys starting with `prefix`, in byte order
    fn keys_with_prefix(&self, prefix: &[u8]) -> Result<Vec<Bytes>>;

    /// Flush pending writes to the storage medium
    fn flush(&self) -> Result<()>;
}
