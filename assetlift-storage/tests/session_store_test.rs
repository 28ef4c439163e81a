//! Session store tests against the Sled backend
//!
//! Run with: cargo test --package assetlift-storage --test session_store_test

use assetlift_core::session::UploadSession;
use assetlift_storage::{
    KeyValueStore, ResumableSessionStore, SledKvStore, StorageConfig, DEFAULT_PREFIX,
};
use std::sync::Arc;
use tempfile::TempDir;

fn session_with_chunks(id: &str, chunks: &[u64]) -> UploadSession {
    let mut session = UploadSession::with_session_id(id, "lamp.glb", 64 * 1024, 4 * 1024).unwrap();
    for &i in chunks {
        session.mark_chunk_completed(i).unwrap();
    }
    session
}

#[tokio::test]
async fn test_session_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let config = StorageConfig::new(temp_dir.path()).with_prefix("reopen:");
    let session = session_with_chunks("upload-1", &[0, 2, 15]);

    {
        let store = config.open_session_store().unwrap();
        store.save(&session).await.unwrap();
    }

    let store = config.open_session_store().unwrap();
    let loaded = store.load("upload-1").await.unwrap().unwrap();
    assert_eq!(loaded, session);
    assert_eq!(loaded.missing_chunks().count(), 13);
}

#[tokio::test]
async fn test_delete_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let config = StorageConfig::new(temp_dir.path());

    {
        let store = config.open_session_store().unwrap();
        store.save(&session_with_chunks("gone", &[1])).await.unwrap();
        store.delete("gone").await.unwrap();
    }

    let store = config.open_session_store().unwrap();
    assert_eq!(store.prefix(), DEFAULT_PREFIX);
    assert!(store.load("gone").await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_saves_on_distinct_ids() {
    let kv: Arc<dyn KeyValueStore> = Arc::new(SledKvStore::open_temporary().unwrap());
    let store = ResumableSessionStore::new(kv, "parallel:").with_flush_on_save(false);

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                let session = session_with_chunks(&format!("s{}", i), &[i % 16]);
                store.save(&session).await.unwrap();
            })
        })
        .collect();
    for task in futures::future::join_all(tasks).await {
        task.unwrap();
    }

    let mut ids = store.list().await.unwrap();
    ids.sort();
    assert_eq!(ids.len(), 32);

    for i in 0..32u64 {
        let loaded = store.load(&format!("s{}", i)).await.unwrap().unwrap();
        assert!(loaded.is_chunk_completed(i % 16));
        assert_eq!(loaded.completed_count(), 1);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_never_see_torn_record() {
    let kv: Arc<dyn KeyValueStore> = Arc::new(SledKvStore::open_temporary().unwrap());
    let store = ResumableSessionStore::new(kv, "torn:").with_flush_on_save(false);

    let small = session_with_chunks("same", &[0]);
    let large = session_with_chunks("same", &(0..16).collect::<Vec<_>>());
    store.save(&small).await.unwrap();

    let writer = {
        let store = store.clone();
        let (small, large) = (small.clone(), large.clone());
        tokio::spawn(async move {
            for round in 0..50 {
                let next = if round % 2 == 0 { &large } else { &small };
                store.save(next).await.unwrap();
            }
        })
    };

    for _ in 0..50 {
        let loaded = store.load("same").await.unwrap().unwrap();
        assert!(loaded == small || loaded == large);
    }
    writer.await.unwrap();
}

#[tokio::test]
async fn test_spawned_saves_awaited_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let store = StorageConfig::new(temp_dir.path())
        .open_session_store()
        .unwrap();

    let mut session = session_with_chunks("bg", &[]);
    for i in 0..4 {
        session.mark_chunk_completed(i).unwrap();
        store.spawn_save(&session).await.unwrap();
    }

    let loaded = store.load("bg").await.unwrap().unwrap();
    assert_eq!(loaded.completed_count(), 4);
}
