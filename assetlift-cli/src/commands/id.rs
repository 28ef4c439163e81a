//! Identifier Commands
//!
//! Converts between ACIs and external identifiers, and fingerprints
//! finished bundle files.

use crate::symbols;
use anyhow::{Context, Result};
use assetlift_core::{Aci, ContentId, ContentIdentityCodec};
use console::style;
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Encode an ACI into its external identifier
pub fn encode(aci: &str) -> Result<()> {
    let id = ContentIdentityCodec::try_encode(aci)
        .with_context(|| format!("Cannot encode '{}'", aci))?;
    println!("{}", id);
    Ok(())
}

/// Decode an external identifier back into its ACI
pub fn decode(id: &str) -> Result<()> {
    let aci = ContentIdentityCodec::try_decode(id)
        .with_context(|| format!("Cannot decode '{}'", id))?;
    println!("{}", aci);
    Ok(())
}

/// Hash a file and print both identifier forms
pub async fn hash(path: &Path) -> Result<()> {
    let aci = hash_file(path).await?;
    let id = ContentId::from_aci(&aci);

    println!(
        "{} {}",
        style(symbols::CHECK).green(),
        style(path.display()).bold()
    );
    println!("  {}  {}", style("aci").dim(), aci);
    println!("  {}   {}", style("id").dim(), id);
    Ok(())
}

/// Stream a file through SHA-256
pub async fn hash_file(path: &Path) -> Result<Aci> {
    let mut file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    loop {
        let n = file
            .read(&mut buf)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(Aci::from_digest(hasher.finalize().into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_file_matches_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.bin");
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, &data).unwrap();

        let streamed = hash_file(&path).await.unwrap();
        assert_eq!(streamed, Aci::compute(&data));
    }

    #[tokio::test]
    async fn test_hash_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(hash_file(&dir.path().join("absent")).await.is_err());
    }

    #[test]
    fn test_encode_rejects_bad_aci() {
        assert!(encode("aci:2:sha256:00").is_err());
        assert!(decode("not-an-id").is_err());
    }
}
