//! Chain: the ordered block sequence and its queries.
//!
//! A `Chain` is a plain value. It guarantees structure (non-empty, genesis
//! first, appended blocks link to the tip) but not proof-of-work; that is
//! what [`Chain::validate`] is for. A chain loaded from storage may fail
//! validation and still be queried.

use serde::{Deserialize, Serialize};

use crate::block::{Block, BlockTemplate};
use crate::difficulty::Difficulty;
use crate::error::CoreError;
use crate::record::DocumentRecord;
use crate::types::{BlockHash, Fingerprint};
use crate::validation::{validate_chain, ChainStatus};

/// A record together with the block that sealed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatedRecord {
    pub block_index: u64,
    pub block_timestamp: i64,
    pub record: DocumentRecord,
}

/// Ordered, index-contiguous sequence of blocks starting at genesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

impl Chain {
    /// A chain holding only the genesis block.
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::genesis()],
        }
    }

    /// Wrap loaded blocks. Only emptiness is rejected here; integrity is
    /// reported by [`Chain::validate`].
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self, CoreError> {
        if blocks.is_empty() {
            return Err(CoreError::MalformedChain("chain has no blocks".into()));
        }
        Ok(Self { blocks })
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false; a chain holds at least genesis.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The newest block.
    pub fn tip(&self) -> &Block {
        // from_blocks and new guarantee at least one block.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn tip_hash(&self) -> BlockHash {
        self.tip().hash
    }

    /// Build the candidate for the next block.
    pub fn next_template(&self, records: Vec<DocumentRecord>, timestamp: i64) -> BlockTemplate {
        let tip = self.tip();
        BlockTemplate {
            index: tip.index + 1,
            timestamp,
            records,
            previous_hash: tip.hash,
        }
    }

    /// Append a sealed block that extends the tip.
    pub fn push(&mut self, block: Block) -> Result<(), CoreError> {
        let tip = self.tip();
        if block.index != tip.index + 1 {
            return Err(CoreError::DoesNotExtend {
                index: block.index,
                reason: "index is not tip + 1",
            });
        }
        if block.previous_hash != tip.hash {
            return Err(CoreError::DoesNotExtend {
                index: block.index,
                reason: "previous hash is not the tip hash",
            });
        }
        self.blocks.push(block);
        Ok(())
    }

    /// Find a record by fingerprint, scanning newest to oldest.
    pub fn find_by_fingerprint(&self, fingerprint: &Fingerprint) -> Option<LocatedRecord> {
        self.blocks.iter().rev().find_map(|block| {
            block
                .records
                .iter()
                .rev()
                .find(|r| r.fingerprint == *fingerprint)
                .map(|record| locate(block, record))
        })
    }

    pub fn contains_fingerprint(&self, fingerprint: &Fingerprint) -> bool {
        self.find_by_fingerprint(fingerprint).is_some()
    }

    /// All records issued to `recipient_id`, in chain order.
    pub fn find_by_recipient(&self, recipient_id: &str) -> Vec<LocatedRecord> {
        self.located()
            .filter(|located| located.record.recipient_id == recipient_id)
            .collect()
    }

    /// Every record, flattened in chain order.
    pub fn records(&self) -> Vec<LocatedRecord> {
        self.located().collect()
    }

    /// Total number of records across all blocks.
    pub fn record_count(&self) -> usize {
        self.blocks.iter().map(|b| b.records.len()).sum()
    }

    /// Validate the whole chain at `difficulty`.
    pub fn validate(&self, difficulty: Difficulty) -> ChainStatus {
        validate_chain(&self.blocks, difficulty)
    }

    fn located(&self) -> impl Iterator<Item = LocatedRecord> + '_ {
        self.blocks
            .iter()
            .flat_map(|block| block.records.iter().map(move |record| locate(block, record)))
    }
}

fn locate(block: &Block, record: &DocumentRecord) -> LocatedRecord {
    LocatedRecord {
        block_index: block.index,
        block_timestamp: block.timestamp,
        record: record.clone(),
    }
}
