//! JSON file implementation of the Store trait.
//!
//! The chain is written as a pretty-printed JSON array of blocks. Saves go to
//! a sibling temporary file that is fsynced and then renamed over the target,
//! so readers of the file only ever see a complete chain.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use docuchain_core::Block;
use tokio::io::AsyncWriteExt;

use crate::error::{Result, StoreError};
use crate::traits::Store;

/// JSON-file-backed store.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Use the file at `path`. Nothing is touched until the first load or save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the chain file.
    fn parent_dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "chain.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl Store for JsonFileStore {
    async fn load_chain(&self) -> Result<Option<Vec<Block>>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no chain file");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let blocks: Vec<Block> = serde_json::from_slice(&bytes)?;
        if blocks.is_empty() {
            return Err(StoreError::InvalidData(format!(
                "{} contains an empty block list",
                self.path.display()
            )));
        }

        tracing::debug!(path = %self.path.display(), blocks = blocks.len(), "loaded chain");
        Ok(Some(blocks))
    }

    async fn save_chain(&self, blocks: &[Block]) -> Result<()> {
        let json = serde_json::to_vec_pretty(blocks)?;

        tokio::fs::create_dir_all(self.parent_dir()).await?;

        let tmp = self.temp_path();
        let written = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(&json).await?;
            file.sync_all().await?;
            tokio::fs::rename(&tmp, &self.path).await?;
            sync_dir(self.parent_dir()).await
        }
        .await;

        if let Err(e) = written {
            // Best effort; the target file is untouched either way.
            let _ = tokio::fs::remove_file(&tmp).await;
            tracing::warn!(path = %self.path.display(), error = %e, "chain save failed");
            return Err(e.into());
        }

        tracing::debug!(path = %self.path.display(), blocks = blocks.len(), bytes = json.len(), "saved chain");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}

/// Flush directory metadata so a completed rename survives a crash.
#[cfg(unix)]
async fn sync_dir(dir: &Path) -> std::io::Result<()> {
    tokio::fs::File::open(dir).await?.sync_all().await
}

#[cfg(not(unix))]
async fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("chain.json"));
        assert!(store.load_chain().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_creates_parent_and_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/data/chain.json"));
        store.save_chain(&[Block::genesis()]).await.unwrap();

        assert_eq!(store.load_chain().await.unwrap(), Some(vec![Block::genesis()]));
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_parent_dir_of_bare_name_is_current() {
        assert_eq!(JsonFileStore::new("chain.json").parent_dir(), Path::new("."));
        assert_eq!(
            JsonFileStore::new("/var/lib/docuchain/chain.json").parent_dir(),
            Path::new("/var/lib/docuchain")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_sync_dir() {
        let dir = tempfile::tempdir().unwrap();
        sync_dir(dir.path()).await.unwrap();
        assert!(sync_dir(&dir.path().join("missing")).await.is_err());
    }

    #[tokio::test]
    async fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.load_chain().await,
            Err(StoreError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_list_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.json");
        std::fs::write(&path, b"[]").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.load_chain().await,
            Err(StoreError::InvalidData(_))
        ));
    }

    #[tokio::test]
    async fn test_persisted_field_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("chain.json"));
        store.save_chain(&[Block::genesis()]).await.unwrap();

        let text = std::fs::read_to_string(store.path()).unwrap();
        let index = text.find("\"index\"").unwrap();
        let nonce = text.find("\"nonce\"").unwrap();
        let hash = text.find("\"hash\"").unwrap();
        assert!(index < nonce && nonce < hash);
        assert!(text.contains(&"0".repeat(64)));
    }
}
