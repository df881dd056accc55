//! Block: a sealed batch of document records.
//!
//! A block's hash covers its index, timestamp, records, previous hash, and
//! nonce through the canonical encoding in [`crate::canonical`]. The stored
//! `hash` is a claim; validation always recomputes it.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::canonical::{canonical_block_bytes, BlockPreimage};
use crate::record::DocumentRecord;
use crate::types::BlockHash;

/// Timestamp of the genesis block.
pub const GENESIS_TIMESTAMP: i64 = 0;

/// Nonce of the genesis block.
pub const GENESIS_NONCE: u64 = 0;

/// A sealed block.
///
/// Field order is also the persisted JSON field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Zero-based position in the chain.
    pub index: u64,

    /// Time the candidate was built (Unix milliseconds).
    pub timestamp: i64,

    /// Records sealed in this block. Empty only for genesis.
    pub records: Vec<DocumentRecord>,

    /// Hash of the prior block, or [`BlockHash::ZERO`] for genesis.
    pub previous_hash: BlockHash,

    /// Proof-of-work nonce.
    pub nonce: u64,

    /// Hash of the canonical encoding of the fields above.
    pub hash: BlockHash,
}

impl Block {
    /// The well-known genesis block.
    pub fn genesis() -> Self {
        static GENESIS_HASH: OnceLock<BlockHash> = OnceLock::new();
        let hash = *GENESIS_HASH.get_or_init(|| {
            BlockHash::digest(&canonical_block_bytes(
                0,
                GENESIS_TIMESTAMP,
                &[],
                &BlockHash::ZERO,
                GENESIS_NONCE,
            ))
        });

        Self {
            index: 0,
            timestamp: GENESIS_TIMESTAMP,
            records: Vec::new(),
            previous_hash: BlockHash::ZERO,
            nonce: GENESIS_NONCE,
            hash,
        }
    }

    /// Recompute the hash from the block's contents.
    pub fn compute_hash(&self) -> BlockHash {
        BlockHash::digest(&canonical_block_bytes(
            self.index,
            self.timestamp,
            &self.records,
            &self.previous_hash,
            self.nonce,
        ))
    }

    /// Whether the stored hash matches the contents.
    pub fn hash_matches(&self) -> bool {
        self.compute_hash() == self.hash
    }

    /// Whether this block is position 0.
    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }
}

/// An unsealed block candidate: everything but the nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTemplate {
    pub index: u64,
    pub timestamp: i64,
    pub records: Vec<DocumentRecord>,
    pub previous_hash: BlockHash,
}

impl BlockTemplate {
    /// Encode the nonce-independent part of the preimage.
    pub fn preimage(&self) -> BlockPreimage {
        BlockPreimage::new(
            self.index,
            self.timestamp,
            &self.records,
            &self.previous_hash,
        )
    }

    /// Seal the template with a found nonce and its hash.
    pub fn seal(self, nonce: u64, hash: BlockHash) -> Block {
        Block {
            index: self.index,
            timestamp: self.timestamp,
            records: self.records,
            previous_hash: self.previous_hash,
            nonce,
            hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DocumentRecordBuilder;
    use crate::types::Fingerprint;

    fn template() -> BlockTemplate {
        let record = DocumentRecordBuilder::new(Fingerprint::of(b"hello"))
            .issuer_org("Org")
            .doc_type("Diploma")
            .doc_title("Title")
            .recipient_name("Name")
            .recipient_id("R1")
            .issued_at(10)
            .build()
            .unwrap();
        BlockTemplate {
            index: 1,
            timestamp: 11,
            records: vec![record],
            previous_hash: Block::genesis().hash,
        }
    }

    #[test]
    fn test_genesis_is_fixed() {
        let a = Block::genesis();
        let b = Block::genesis();
        assert_eq!(a, b);
        assert!(a.is_genesis());
        assert!(a.records.is_empty());
        assert!(a.previous_hash.is_zero());
        assert!(a.hash_matches());
    }

    #[test]
    fn test_sealed_hash_matches_preimage() {
        let template = template();
        let mut scratch = Vec::new();
        let hash = template.preimage().hash_with_nonce(42, &mut scratch);
        let block = template.seal(42, hash);
        assert!(block.hash_matches());
        assert_eq!(block.nonce, 42);
    }

    #[test]
    fn test_any_field_change_breaks_hash() {
        let template = template();
        let hash = template.preimage().hash_with_nonce(0, &mut Vec::new());
        let block = template.seal(0, hash);

        let mut b = block.clone();
        b.nonce += 1;
        assert!(!b.hash_matches());

        let mut b = block.clone();
        b.timestamp += 1;
        assert!(!b.hash_matches());

        let mut b = block.clone();
        b.records[0].recipient_id = "R2".into();
        assert!(!b.hash_matches());

        let mut b = block;
        b.previous_hash = BlockHash::ZERO;
        assert!(!b.hash_matches());
    }

    #[test]
    fn test_json_field_order() {
        let json = serde_json::to_string(&Block::genesis()).unwrap();
        let keys = ["\"index\"", "\"timestamp\"", "\"records\"", "\"previous_hash\"", "\"nonce\"", "\"hash\""];
        let positions: Vec<usize> = keys.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}
