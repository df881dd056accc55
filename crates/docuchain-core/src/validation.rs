//! Chain integrity validation.
//!
//! Validation walks the chain from genesis forward and reports the first
//! block that breaks an invariant. Results are never cached.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::block::Block;
use crate::difficulty::Difficulty;

/// Why a block failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TamperKind {
    /// Block 0 is not the well-known genesis block.
    GenesisMismatch,
    /// `index` does not equal the block's position.
    IndexOutOfSequence,
    /// A non-genesis block carries no records.
    EmptyBlock,
    /// The stored hash does not match the recomputed hash.
    HashMismatch,
    /// `previous_hash` does not equal the prior block's hash.
    BrokenLink,
    /// The hash does not meet the difficulty target.
    InsufficientWork,
}

impl fmt::Display for TamperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            TamperKind::GenesisMismatch => "genesis block does not match",
            TamperKind::IndexOutOfSequence => "block index out of sequence",
            TamperKind::EmptyBlock => "block has no records",
            TamperKind::HashMismatch => "stored hash does not match contents",
            TamperKind::BrokenLink => "previous hash does not match prior block",
            TamperKind::InsufficientWork => "hash does not meet difficulty",
        };
        f.write_str(msg)
    }
}

/// Result of validating a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChainStatus {
    Valid,
    Tampered { index: u64, reason: TamperKind },
}

impl ChainStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, ChainStatus::Valid)
    }

    /// Index of the first invalid block, if any.
    pub fn first_invalid(&self) -> Option<u64> {
        match self {
            ChainStatus::Valid => None,
            ChainStatus::Tampered { index, .. } => Some(*index),
        }
    }
}

/// Validate `blocks` against the chain integrity invariant.
///
/// For each block the checks run in order: index, records, hash, link, work.
/// An empty slice is reported as a genesis mismatch at index 0.
pub fn validate_chain(blocks: &[Block], difficulty: Difficulty) -> ChainStatus {
    let genesis = Block::genesis();
    match blocks.first() {
        Some(first) if *first == genesis => {}
        _ => {
            return ChainStatus::Tampered {
                index: 0,
                reason: TamperKind::GenesisMismatch,
            }
        }
    }

    for (position, pair) in blocks.windows(2).enumerate() {
        let (prev, block) = (&pair[0], &pair[1]);
        let expected_index = position as u64 + 1;

        if let Err(reason) = check_block(block, prev, expected_index, difficulty) {
            return ChainStatus::Tampered {
                index: expected_index,
                reason,
            };
        }
    }

    ChainStatus::Valid
}

/// Check one non-genesis block against its predecessor.
pub fn check_block(
    block: &Block,
    prev: &Block,
    expected_index: u64,
    difficulty: Difficulty,
) -> Result<(), TamperKind> {
    if block.index != expected_index {
        return Err(TamperKind::IndexOutOfSequence);
    }
    if block.records.is_empty() {
        return Err(TamperKind::EmptyBlock);
    }
    if !block.hash_matches() {
        return Err(TamperKind::HashMismatch);
    }
    if block.previous_hash != prev.hash {
        return Err(TamperKind::BrokenLink);
    }
    if !difficulty.is_met_by(&block.hash) {
        return Err(TamperKind::InsufficientWork);
    }
    Ok(())
}
