//! Store trait: the abstract interface for chain persistence.
//!
//! This trait allows the ledger to be storage-agnostic. Implementations
//! include a JSON file, SQLite, and in-memory (for tests).

use async_trait::async_trait;
use docuchain_core::Block;

use crate::error::Result;

/// The Store trait: async interface for chain persistence.
///
/// All methods are async to support both blocking (SQLite, file) and async
/// backends. Blocking backends use `spawn_blocking` or `tokio::fs` internally.
///
/// # Design Notes
///
/// - **Whole chain**: `save_chain` receives the complete chain every time and
///   must replace the stored state atomically. Either the new chain is durable
///   when it returns `Ok`, or the previous chain is still what `load_chain`
///   returns.
/// - **Structure only**: `load_chain` rejects unreadable or empty data but
///   never checks hashes.
/// - **Owned**: stores are `'static` so a save can finish on its own task
///   after the caller has gone away.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Load the persisted chain.
    ///
    /// Returns `None` when nothing has been persisted yet.
    async fn load_chain(&self) -> Result<Option<Vec<Block>>>;

    /// Durably replace the persisted chain with `blocks`.
    async fn save_chain(&self, blocks: &[Block]) -> Result<()>;

    /// Short description of the backend for logs and health output.
    fn describe(&self) -> String;
}

#[async_trait]
impl<S: Store + ?Sized> Store for std::sync::Arc<S> {
    async fn load_chain(&self) -> Result<Option<Vec<Block>>> {
        (**self).load_chain().await
    }

    async fn save_chain(&self, blocks: &[Block]) -> Result<()> {
        (**self).save_chain(blocks).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
