//! Resumable upload session store
//!
//! Durable save/load/delete of [`UploadSession`] records on top of any
//! [`KeyValueStore`]. Every key is `<prefix><session_id>`, so stores with
//! different prefixes can share one backend without seeing each other.
//!
//! The store keeps no live sessions: each call serializes or deserializes a
//! full record and returns. A save replaces the previous record wholesale.
//!
//! Unreadable records (corrupted bytes, foreign namespace, unknown record
//! format) load as absent: the caller starts the upload fresh. Only a
//! failure of the backend itself is returned as an error.

use crate::backend::KeyValueStore;
use assetlift_core::error::{AssetLiftError, Result};
use assetlift_core::session::UploadSession;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Default key prefix
pub const DEFAULT_PREFIX: &str = "assetlift:upload-session:";

/// Current on-disk record layout
const RECORD_FORMAT_VERSION: u16 = 1;

/// Stored form of a session
#[derive(Serialize)]
struct SessionRecordRef<'a> {
    format_version: u16,
    namespace: &'a str,
    session: &'a UploadSession,
}

#[derive(Deserialize)]
struct SessionRecord {
    format_version: u16,
    namespace: String,
    session: UploadSession,
}

/// Completion signal of a background save
///
/// Resolves once the record has been written (and flushed, if the store
/// flushes on save). Dropping the handle does not cancel the write.
pub struct SaveHandle(JoinHandle<Result<()>>);

impl Future for SaveHandle {
    type Output = Result<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx).map(|joined| {
            joined.unwrap_or_else(|e| Err(AssetLiftError::Internal(format!("save task failed: {}", e))))
        })
    }
}

/// Namespaced persistence of upload sessions
#[derive(Clone)]
pub struct ResumableSessionStore {
    kv: Arc<dyn KeyValueStore>,
    prefix: String,
    flush_on_save: bool,
}

impl ResumableSessionStore {
    /// Create a store writing under `prefix` in `kv`
    pub fn new(kv: Arc<dyn KeyValueStore>, prefix: impl Into<String>) -> Self {
        Self {
            kv,
            prefix: prefix.into(),
            flush_on_save: true,
        }
    }

    /// Whether every save also flushes the backend
    pub fn with_flush_on_save(mut self, enabled: bool) -> Self {
        self.flush_on_save = enabled;
        self
    }

    /// The key prefix of this store
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn key(&self, session_id: &str) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.prefix.len() + session_id.len());
        key.extend_from_slice(self.prefix.as_bytes());
        key.extend_from_slice(session_id.as_bytes());
        key
    }

    fn encode(&self, session: &UploadSession) -> Result<Bytes> {
        let record = SessionRecordRef {
            format_version: RECORD_FORMAT_VERSION,
            namespace: &self.prefix,
            session,
        };
        Ok(Bytes::from(bincode::serialize(&record)?))
    }

    /// Decode a stored record, or `None` if it is not a valid record of this
    /// store for `session_id`
    fn decode(&self, session_id: &str, bytes: &[u8]) -> Option<UploadSession> {
        let record: SessionRecord = match bincode::deserialize(bytes) {
            Ok(record) => record,
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Dropping corrupted session record");
                return None;
            }
        };

        if record.format_version != RECORD_FORMAT_VERSION {
            warn!(
                session_id = %session_id,
                format_version = record.format_version,
                "Dropping session record with unknown format"
            );
            return None;
        }
        if record.namespace != self.prefix || record.session.session_id != session_id {
            debug!(session_id = %session_id, namespace = %record.namespace, "Session record belongs elsewhere");
            return None;
        }
        if let Err(e) = record.session.validate() {
            warn!(session_id = %session_id, error = %e, "Dropping inconsistent session record");
            return None;
        }

        Some(record.session)
    }

    /// Run a blocking backend call off the async worker threads
    async fn run_blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn KeyValueStore) -> Result<T> + Send + 'static,
    {
        let kv = Arc::clone(&self.kv);
        tokio::task::spawn_blocking(move || op(kv.as_ref()))
            .await
            .map_err(|e| AssetLiftError::Internal(format!("storage task failed: {}", e)))?
    }

    fn write_op(
        &self,
        session: &UploadSession,
    ) -> Result<impl FnOnce(&dyn KeyValueStore) -> Result<()> + Send + 'static> {
        let key = self.key(&session.session_id);
        let value = self.encode(session)?;
        let flush = self.flush_on_save;
        Ok(move |kv: &dyn KeyValueStore| {
            kv.put(&key, value)?;
            if flush {
                kv.flush()?;
            }
            Ok(())
        })
    }

    /// Persist the full session, replacing any earlier record with its id.
    ///
    /// Returns once the write has landed.
    pub async fn save(&self, session: &UploadSession) -> Result<()> {
        let op = self.write_op(session)?;
        self.run_blocking(op).await?;

        debug!(
            session_id = %session.session_id,
            completed = session.completed_count(),
            total = session.total_chunks(),
            "Saved upload session"
        );
        Ok(())
    }

    /// Start a save in the background.
    ///
    /// The session is snapshotted now; await the handle before relying on a
    /// later `load` to observe it. Must be called inside a tokio runtime.
    pub fn spawn_save(&self, session: &UploadSession) -> SaveHandle {
        let kv = Arc::clone(&self.kv);
        let session_id = session.session_id.clone();
        let op = self.write_op(session);

        SaveHandle(tokio::spawn(async move {
            let op = op?;
            tokio::task::spawn_blocking(move || op(kv.as_ref()))
                .await
                .map_err(|e| AssetLiftError::Internal(format!("storage task failed: {}", e)))??;
            debug!(session_id = %session_id, "Saved upload session in background");
            Ok::<(), AssetLiftError>(())
        }))
    }

    /// Load the session saved under `session_id`.
    ///
    /// `Ok(None)` when there is no usable record; `Err` only when the
    /// backend fails.
    pub async fn load(&self, session_id: &str) -> Result<Option<UploadSession>> {
        let key = self.key(session_id);
        let Some(bytes) = self.run_blocking(move |kv| kv.get(&key)).await? else {
            debug!(session_id = %session_id, "No saved upload session");
            return Ok(None);
        };

        Ok(self.decode(session_id, &bytes))
    }

    /// Remove the session record. Deleting an unknown id is not an error.
    pub async fn delete(&self, session_id: &str) -> Result<()> {
        let key = self.key(session_id);
        let removed = self.run_blocking(move |kv| kv.delete(&key)).await?;
        debug!(session_id = %session_id, removed, "Deleted upload session");
        Ok(())
    }

    /// Keys under this prefix whose records are not another namespace's
    async fn owned_keys(&self) -> Result<Vec<Bytes>> {
        let prefix = self.prefix.clone();
        self.run_blocking(move |kv| {
            let mut owned = Vec::new();
            for key in kv.keys_with_prefix(prefix.as_bytes())? {
                match kv.get(&key)? {
                    Some(value) if !is_foreign_record(&value, &prefix) => owned.push(key),
                    _ => {}
                }
            }
            Ok(owned)
        })
        .await
    }

    /// Ids of all sessions stored under this prefix
    pub async fn list(&self) -> Result<Vec<String>> {
        let keys = self.owned_keys().await?;

        let prefix_len = self.prefix.len();
        Ok(keys
            .iter()
            .filter_map(|k| std::str::from_utf8(&k[prefix_len..]).ok())
            .map(str::to_string)
            .collect())
    }

    /// Delete every session under this prefix; returns how many were removed
    pub async fn clear(&self) -> Result<usize> {
        let keys = self.owned_keys().await?;
        let removed = self
            .run_blocking(move |kv| {
                let mut removed = 0;
                for key in keys {
                    if kv.delete(&key)? {
                        removed += 1;
                    }
                }
                Ok(removed)
            })
            .await?;

        debug!(prefix = %self.prefix, removed, "Cleared upload sessions");
        Ok(removed)
    }
}

/// A readable record written by a store with a different prefix. Unreadable
/// values stay attributed to the prefix they were found under.
fn is_foreign_record(bytes: &[u8], prefix: &str) -> bool {
    matches!(
        bincode::deserialize::<SessionRecord>(bytes),
        Ok(record) if record.namespace != prefix
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryKvStore;

    fn store_with(kv: Arc<MemoryKvStore>, prefix: &str) -> ResumableSessionStore {
        ResumableSessionStore::new(kv, prefix)
    }

    fn sample_session() -> UploadSession {
        let mut session = UploadSession::new("chair.usdz", 10 * 1024 * 1024, 1024 * 1024).unwrap();
        for i in [0, 1, 4, 9] {
            session.mark_chunk_completed(i).unwrap();
        }
        session
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = store_with(Arc::new(MemoryKvStore::new()), "test:");
        let session = sample_session();

        store.save(&session).await.unwrap();
        let loaded = store.load(&session.session_id).await.unwrap().unwrap();

        assert_eq!(loaded.session_id, session.session_id);
        assert_eq!(loaded.file_name, session.file_name);
        assert_eq!(loaded.file_size, session.file_size);
        assert_eq!(loaded.chunk_size, session.chunk_size);
        assert_eq!(loaded.completed_chunks(), session.completed_chunks());
    }

    #[tokio::test]
    async fn test_load_unknown_is_absent() {
        let store = store_with(Arc::new(MemoryKvStore::new()), "test:");
        assert!(store.load("never-saved").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_then_load() {
        let store = store_with(Arc::new(MemoryKvStore::new()), "test:");
        let session = sample_session();

        store.save(&session).await.unwrap();
        store.delete(&session.session_id).await.unwrap();
        assert!(store.load(&session.session_id).await.unwrap().is_none());

        // idempotent
        store.delete(&session.session_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_overwrites_without_merge() {
        let store = store_with(Arc::new(MemoryKvStore::new()), "test:");
        let mut session = UploadSession::with_session_id("s1", "a.glb", 4096, 1024).unwrap();
        session.mark_chunk_completed(0).unwrap();
        session.mark_chunk_completed(1).unwrap();
        store.save(&session).await.unwrap();

        let mut replacement = UploadSession::with_session_id("s1", "a.glb", 4096, 1024).unwrap();
        replacement.mark_chunk_completed(3).unwrap();
        store.save(&replacement).await.unwrap();

        let loaded = store.load("s1").await.unwrap().unwrap();
        assert_eq!(loaded.completed_chunks().iter().copied().collect::<Vec<_>>(), vec![3]);
    }

    #[tokio::test]
    async fn test_prefixes_isolated() {
        let kv = Arc::new(MemoryKvStore::new());
        let a = store_with(kv.clone(), "uploads-a:");
        let b = store_with(kv.clone(), "uploads-b:");

        let session = sample_session();
        a.save(&session).await.unwrap();

        assert!(b.load(&session.session_id).await.unwrap().is_none());
        assert_eq!(a.list().await.unwrap(), vec![session.session_id.clone()]);
        assert!(b.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_overlapping_prefix_rejected_by_namespace() {
        // "ns:" + "x:y" and "ns:x:" + "y" share the key "ns:x:y"
        let kv = Arc::new(MemoryKvStore::new());
        let outer = store_with(kv.clone(), "ns:");
        let inner = store_with(kv.clone(), "ns:x:");

        let session = UploadSession::with_session_id("x:y", "a.glb", 10, 5).unwrap();
        outer.save(&session).await.unwrap();

        assert!(inner.load("y").await.unwrap().is_none());
        assert!(outer.load("x:y").await.unwrap().is_some());

        assert!(inner.list().await.unwrap().is_empty());
        assert_eq!(inner.clear().await.unwrap(), 0);
        assert_eq!(outer.list().await.unwrap(), vec!["x:y".to_string()]);
    }

    #[tokio::test]
    async fn test_corrupted_record_is_absent() {
        let kv = Arc::new(MemoryKvStore::new());
        let store = store_with(kv.clone(), "test:");
        kv.put(b"test:broken", Bytes::from_static(b"\x01\x02not a record"))
            .unwrap();

        assert!(store.load("broken").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let kv = Arc::new(MemoryKvStore::new());
        let store = store_with(kv.clone(), "test:");
        kv.set_unavailable(true);

        assert!(matches!(
            store.load("any").await,
            Err(AssetLiftError::Storage(_))
        ));
        assert!(store.save(&sample_session()).await.is_err());
    }

    #[tokio::test]
    async fn test_spawn_save_completion_signal() {
        let store = store_with(Arc::new(MemoryKvStore::new()), "test:");
        let session = sample_session();

        let handle = store.spawn_save(&session);
        handle.await.unwrap();

        let loaded = store.load(&session.session_id).await.unwrap().unwrap();
        assert_eq!(loaded, session);
    }

    #[tokio::test]
    async fn test_clear_only_own_prefix() {
        let kv = Arc::new(MemoryKvStore::new());
        let a = store_with(kv.clone(), "a:");
        let b = store_with(kv.clone(), "b:");
        for i in 0..3 {
            let s = UploadSession::with_session_id(format!("s{}", i), "f", 10, 5).unwrap();
            a.save(&s).await.unwrap();
        }
        b.save(&sample_session()).await.unwrap();

        assert_eq!(a.clear().await.unwrap(), 3);
        assert!(a.list().await.unwrap().is_empty());
        assert_eq!(b.list().await.unwrap().len(), 1);
    }
}
