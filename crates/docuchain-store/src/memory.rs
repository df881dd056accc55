//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same whole-chain semantics as
//! the file-backed stores but keeps everything in memory. Saves can be made
//! to fail on demand to exercise rollback paths.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use docuchain_core::Block;

use crate::error::{Result, StoreError};
use crate::traits::Store;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blocks: RwLock<Option<Vec<Block>>>,
    fail_saves: AtomicBool,
    saves: AtomicU64,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `blocks`.
    pub fn with_blocks(blocks: Vec<Block>) -> Self {
        Self {
            blocks: RwLock::new(Some(blocks)),
            ..Self::default()
        }
    }

    /// Make every subsequent save fail (or succeed again).
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> u64 {
        self.saves.load(Ordering::SeqCst)
    }

    /// Copy of the stored blocks, if any.
    pub fn stored(&self) -> Option<Vec<Block>> {
        self.blocks.read().ok().and_then(|guard| guard.clone())
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Unavailable(format!("lock poisoned: {}", e))
}

#[async_trait]
impl Store for MemoryStore {
    async fn load_chain(&self) -> Result<Option<Vec<Block>>> {
        let guard = self.blocks.read().map_err(poisoned)?;
        match guard.as_ref() {
            Some(blocks) if blocks.is_empty() => {
                Err(StoreError::InvalidData("stored chain has no blocks".into()))
            }
            other => Ok(other.cloned()),
        }
    }

    async fn save_chain(&self, blocks: &[Block]) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("saves disabled".into()));
        }
        let mut guard = self.blocks.write().map_err(poisoned)?;
        *guard = Some(blocks.to_vec());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_store_loads_none() {
        let store = MemoryStore::new();
        assert!(store.load_chain().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = MemoryStore::new();
        store.save_chain(&[Block::genesis()]).await.unwrap();
        assert_eq!(store.load_chain().await.unwrap(), Some(vec![Block::genesis()]));
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_previous() {
        let store = MemoryStore::with_blocks(vec![Block::genesis()]);
        store.set_fail_saves(true);

        let mut other = Block::genesis();
        other.nonce = 1;
        assert!(matches!(
            store.save_chain(&[other]).await,
            Err(StoreError::Unavailable(_))
        ));
        assert_eq!(store.stored(), Some(vec![Block::genesis()]));
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_list_is_invalid() {
        let store = MemoryStore::with_blocks(Vec::new());
        assert!(matches!(
            store.load_chain().await,
            Err(StoreError::InvalidData(_))
        ));
    }
}
