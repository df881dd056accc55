//! The Ledger: owner of the chain, the writer lock, and the store.
//!
//! Appends are serialized by an async FIFO mutex and mined on the blocking
//! pool. Readers never wait for mining: they clone an `Arc<Chain>` snapshot
//! that is swapped only after the store has durably saved the new chain.
//!
//! Dropping an append future cancels mining. Once a block is mined, the save
//! and the swap run on a spawned task that holds the writer lock, so memory
//! and storage agree even when the caller goes away mid-save.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use docuchain_core::{
    Block, BlockHash, BlockTemplate, Chain, ChainStatus, Difficulty, DocumentRecord, Fingerprint,
    LocatedRecord, Mined, Miner, MiningError,
};
use docuchain_store::Store;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;

use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};

/// Append-only, proof-of-work-protected document ledger.
///
/// Construct once and share via `Arc`.
pub struct Ledger<S: Store> {
    /// The storage backend.
    store: Arc<S>,
    /// Configuration.
    config: LedgerConfig,
    miner: Miner,
    /// Current committed chain.
    chain: Arc<RwLock<Arc<Chain>>>,
    /// Serializes appends; tokio's mutex is fair, so blocks follow arrival order.
    writer: Arc<Mutex<()>>,
    /// Parent of every append's cancel token.
    shutdown: CancellationToken,
}

impl<S: Store> std::fmt::Debug for Ledger<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("store", &self.store.describe())
            .field("config", &self.config)
            .field("len", &self.len())
            .finish()
    }
}

impl<S: Store> Ledger<S> {
    /// Load the chain from `store`, or initialize and persist genesis.
    ///
    /// A chain that loads but fails validation is kept; the damage is reported
    /// by [`Ledger::validate`] rather than refusing to start.
    pub async fn open(store: S, config: LedgerConfig) -> Result<Self> {
        config.validate()?;

        let chain = match store.load_chain().await.map_err(LedgerError::Load)? {
            Some(blocks) => Chain::from_blocks(blocks)?,
            None => {
                let chain = Chain::new();
                store
                    .save_chain(chain.blocks())
                    .await
                    .map_err(LedgerError::Load)?;
                tracing::info!(store = %store.describe(), "initialized new ledger");
                chain
            }
        };

        match chain.validate(config.difficulty) {
            ChainStatus::Valid => tracing::info!(
                store = %store.describe(),
                blocks = chain.len(),
                difficulty = %config.difficulty,
                "ledger opened"
            ),
            ChainStatus::Tampered { index, reason } => tracing::warn!(
                store = %store.describe(),
                blocks = chain.len(),
                index,
                %reason,
                "ledger opened with an invalid chain"
            ),
        }

        Ok(Self {
            store: Arc::new(store),
            miner: Miner::new(config.difficulty),
            config,
            chain: Arc::new(RwLock::new(Arc::new(chain))),
            writer: Arc::new(Mutex::new(())),
            shutdown: CancellationToken::new(),
        })
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn difficulty(&self) -> Difficulty {
        self.config.difficulty
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Write Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Mine `records` into a new block, persist the extended chain, and
    /// return the block.
    ///
    /// Nothing becomes visible to readers unless the store saved the whole new
    /// chain. Dropping the returned future cancels mining; once the block is
    /// mined, the save and the swap complete even if the future is dropped.
    pub async fn append(&self, records: Vec<DocumentRecord>) -> Result<Block> {
        if records.is_empty() {
            return Err(LedgerError::EmptyBatch);
        }
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            record.validate()?;
            if !seen.insert(record.fingerprint) {
                return Err(LedgerError::DuplicateFingerprint {
                    fingerprint: record.fingerprint,
                    block_index: None,
                });
            }
        }

        let writer = Arc::clone(&self.writer).lock_owned().await;
        if self.shutdown.is_cancelled() {
            return Err(LedgerError::MiningFailed(MiningError::Cancelled { attempts: 0 }));
        }

        let chain = self.snapshot();
        for record in &records {
            if let Some(existing) = chain.find_by_fingerprint(&record.fingerprint) {
                return Err(LedgerError::DuplicateFingerprint {
                    fingerprint: record.fingerprint,
                    block_index: Some(existing.block_index),
                });
            }
        }

        let template = chain.next_template(records, now_millis());
        let token = self.shutdown.child_token();
        let guard = token.clone().drop_guard();
        let mined = self.mine(template, &token).await?;
        guard.disarm();

        let mut next = Chain::clone(&chain);
        next.push(mined.block.clone())?;

        let task = tokio::spawn(commit(
            Arc::clone(&self.store),
            Arc::clone(&self.chain),
            next,
            writer,
        ));
        task.await
            .map_err(|e| LedgerError::Internal(format!("commit task: {}", e)))??;

        tracing::info!(
            index = mined.block.index,
            hash = %mined.block.hash,
            records = mined.block.records.len(),
            attempts = mined.attempts,
            "block appended"
        );
        Ok(mined.block)
    }

    async fn mine(
        &self,
        template: BlockTemplate,
        token: &CancellationToken,
    ) -> Result<Mined> {
        let miner = self.miner;
        let worker_token = token.clone();
        let mut handle =
            tokio::task::spawn_blocking(move || miner.mine(template, &worker_token));

        let joined = match self.config.mining_timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    tracing::warn!(timeout_ms = limit.as_millis() as u64, "mining timed out");
                    token.cancel();
                    handle.await
                }
            },
            None => handle.await,
        };

        let mined = joined.map_err(|e| LedgerError::Internal(format!("mining worker: {}", e)))??;
        Ok(mined)
    }

    /// Cancel in-flight mining and refuse future appends.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        tracing::info!("ledger shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Read Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Immutable view of the current chain.
    pub fn snapshot(&self) -> Arc<Chain> {
        Arc::clone(&self.chain.read().unwrap_or_else(|e| e.into_inner()))
    }

    /// Number of blocks, genesis included.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Always false; the chain holds at least genesis.
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    pub fn tip_hash(&self) -> BlockHash {
        self.snapshot().tip_hash()
    }

    /// Newest record with this fingerprint.
    pub fn find_by_fingerprint(&self, fingerprint: &Fingerprint) -> Option<LocatedRecord> {
        self.snapshot().find_by_fingerprint(fingerprint)
    }

    /// Records issued to `recipient_id`, in chain order.
    pub fn find_by_recipient(&self, recipient_id: &str) -> Vec<LocatedRecord> {
        self.snapshot().find_by_recipient(recipient_id)
    }

    /// Re-validate the whole chain. Never cached.
    pub fn validate(&self) -> ChainStatus {
        self.snapshot().validate(self.config.difficulty)
    }
}

/// Persist `next`, then publish it. Holds the writer lock throughout.
async fn commit<S: Store>(
    store: Arc<S>,
    committed: Arc<RwLock<Arc<Chain>>>,
    next: Chain,
    _writer: OwnedMutexGuard<()>,
) -> Result<()> {
    if let Err(e) = store.save_chain(next.blocks()).await {
        tracing::error!(
            index = next.len() as u64 - 1,
            error = %e,
            "failed to persist block; chain unchanged"
        );
        return Err(LedgerError::PersistenceFailed(e));
    }
    *committed.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(next);
    Ok(())
}

/// Get current time in milliseconds.
pub(crate) fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
