//! Session Commands
//!
//! Inspects and removes resumable upload sessions in the local database.

use crate::symbols;
use anyhow::{Context, Result};
use assetlift_core::UploadSession;
use assetlift_storage::ResumableSessionStore;
use console::style;

/// Show configuration
pub struct ShowConfig {
    pub session_id: String,
    pub json: bool,
}

/// List every session in the namespace
pub async fn list(store: &ResumableSessionStore) -> Result<()> {
    let ids = store.list().await.context("Failed to list sessions")?;

    if ids.is_empty() {
        println!(
            "{} No sessions under prefix '{}'",
            style("Info:").cyan(),
            store.prefix()
        );
        return Ok(());
    }

    println!(
        "{:<38} {:>8} {:>12} {}",
        style("SESSION").bold(),
        style("DONE").bold(),
        style("SIZE").bold(),
        style("FILE").bold()
    );
    println!("{}", "-".repeat(80));

    let mut unreadable = 0usize;
    for id in &ids {
        match store.load(id).await? {
            Some(session) => println!(
                "{:<38} {:>7.1}% {:>12} {}",
                session.session_id,
                session.progress() * 100.0,
                format_bytes(session.file_size),
                session.file_name
            ),
            None => unreadable += 1,
        }
    }

    println!("{}", "-".repeat(80));
    println!("{} sessions", style(ids.len() - unreadable).green());
    if unreadable > 0 {
        println!(
            "{} {} unreadable record(s) skipped",
            style(symbols::WARN).yellow(),
            unreadable
        );
    }
    Ok(())
}

/// Show one session in detail
pub async fn show(store: &ResumableSessionStore, config: ShowConfig) -> Result<()> {
    let Some(session) = store
        .load(&config.session_id)
        .await
        .context("Failed to load session")?
    else {
        anyhow::bail!("Session not found: {}", config.session_id);
    };

    if config.json {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }

    print_session(&session);
    Ok(())
}

/// Delete a session record
pub async fn delete(store: &ResumableSessionStore, session_id: &str) -> Result<()> {
    let existed = store
        .load(session_id)
        .await
        .context("Failed to look up session")?
        .is_some();

    store
        .delete(session_id)
        .await
        .context("Failed to delete session")?;

    if existed {
        println!("{} Deleted: {}", style(symbols::CHECK).green(), session_id);
    } else {
        println!(
            "{} No session '{}' (nothing to delete)",
            style("Info:").cyan(),
            session_id
        );
    }
    Ok(())
}

fn print_session(session: &UploadSession) {
    println!();
    println!("{}", style(&session.session_id).bold());
    println!("{}", symbols::HLINE);
    println!("  File:       {}", session.file_name);
    println!(
        "  Size:       {} ({} bytes)",
        format_bytes(session.file_size),
        session.file_size
    );
    println!("  Chunk size: {}", format_bytes(session.chunk_size));
    println!(
        "  Chunks:     {}/{} ({:.1}%)",
        session.completed_count(),
        session.total_chunks(),
        session.progress() * 100.0
    );
    println!("  Committed:  {}", format_bytes(session.bytes_committed()));
    println!("  Created:    {}", session.created_at.to_rfc3339());
    println!("  Updated:    {}", session.updated_at.to_rfc3339());

    if session.is_complete() {
        println!("  Status:     {}", style("complete").green());
    } else {
        let missing: Vec<String> = session
            .missing_chunks()
            .take(16)
            .map(|i| i.to_string())
            .collect();
        let remaining = session.total_chunks() - session.completed_count();
        let more = if remaining > missing.len() as u64 {
            ", ..."
        } else {
            ""
        };
        println!("  Status:     {}", style("in progress").yellow());
        println!("  Missing:    [{}{}]", missing.join(", "), more);
    }
    println!();
}

/// Format bytes as human-readable string
pub(crate) fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetlift_storage::MemoryKvStore;
    use std::sync::Arc;

    fn store() -> ResumableSessionStore {
        ResumableSessionStore::new(Arc::new(MemoryKvStore::new()), "cli-test:")
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(8 * 1024 * 1024), "8.00 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[tokio::test]
    async fn test_show_missing_session_errors() {
        let config = ShowConfig {
            session_id: "nope".to_string(),
            json: false,
        };
        assert!(show(&store(), config).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_removes_session() {
        let store = store();
        let session = UploadSession::new("scene.bundle", 1000, 100).unwrap();
        store.save(&session).await.unwrap();

        delete(&store, &session.session_id).await.unwrap();
        assert!(store.load(&session.session_id).await.unwrap().is_none());

        // Second delete is a no-op
        delete(&store, &session.session_id).await.unwrap();
    }
}
