//! Proof-of-work mining.
//!
//! The miner encodes the block template once, then appends each candidate
//! nonce and hashes until the difficulty predicate holds. The search is
//! deterministic: identical templates always yield the same nonce.

use tokio_util::sync::CancellationToken;

use crate::block::{Block, BlockTemplate};
use crate::difficulty::Difficulty;
use crate::error::MiningError;

/// Number of attempts between cancellation checks.
pub const CANCEL_CHECK_INTERVAL: u64 = 1024;

/// A sealed block and the work it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mined {
    pub block: Block,
    pub attempts: u64,
}

/// Proof-of-work search at a fixed difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Miner {
    difficulty: Difficulty,
}

impl Miner {
    pub fn new(difficulty: Difficulty) -> Self {
        Self { difficulty }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Search nonces from 0 upward until the block hash meets the difficulty.
    pub fn mine(
        &self,
        template: BlockTemplate,
        cancel: &CancellationToken,
    ) -> Result<Mined, MiningError> {
        let preimage = template.preimage();
        let mut scratch = Vec::with_capacity(preimage.prefix_len() + 9);
        let mut nonce: u64 = 0;

        loop {
            if nonce % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
                return Err(MiningError::Cancelled { attempts: nonce });
            }

            let hash = preimage.hash_with_nonce(nonce, &mut scratch);
            if self.difficulty.is_met_by(&hash) {
                return Ok(Mined {
                    block: template.seal(nonce, hash),
                    attempts: nonce + 1,
                });
            }

            nonce = nonce
                .checked_add(1)
                .ok_or(MiningError::NonceSpaceExhausted)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DocumentRecordBuilder;
    use crate::types::{BlockHash, Fingerprint};

    fn template(seed: &[u8]) -> BlockTemplate {
        let record = DocumentRecordBuilder::new(Fingerprint::of(seed))
            .issuer_org("Org")
            .doc_type("Certificate")
            .doc_title("Title")
            .recipient_name("Name")
            .recipient_id("R1")
            .issued_at(1)
            .build()
            .unwrap();
        BlockTemplate {
            index: 1,
            timestamp: 2,
            records: vec![record],
            previous_hash: Block::genesis().hash,
        }
    }

    fn miner(zeros: u8) -> Miner {
        Miner::new(Difficulty::new(zeros).unwrap())
    }

    #[test]
    fn test_mined_block_meets_difficulty() {
        let mined = miner(2).mine(template(b"a"), &CancellationToken::new()).unwrap();
        assert!(mined.block.hash.to_hex().starts_with("00"));
        assert!(mined.block.hash_matches());
        assert_eq!(mined.attempts, mined.block.nonce + 1);
    }

    #[test]
    fn test_mining_is_deterministic() {
        let a = miner(2).mine(template(b"a"), &CancellationToken::new()).unwrap();
        let b = miner(2).mine(template(b"a"), &CancellationToken::new()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_difficulty_takes_first_nonce() {
        let mined = miner(0).mine(template(b"a"), &CancellationToken::new()).unwrap();
        assert_eq!(mined.block.nonce, 0);
        assert_eq!(mined.attempts, 1);
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let result = miner(8).mine(template(b"a"), &token);
        assert_eq!(result, Err(MiningError::Cancelled { attempts: 0 }));
    }

    #[test]
    fn test_shutdown_parent_stops_child_search() {
        let shutdown = CancellationToken::new();
        let append = shutdown.child_token();
        shutdown.cancel();
        let result = miner(8).mine(template(b"a"), &append);
        assert_eq!(result, Err(MiningError::Cancelled { attempts: 0 }));
    }

    #[test]
    fn test_cancel_from_other_thread() {
        let token = CancellationToken::new();
        let remote = token.clone();
        let handle = std::thread::spawn(move || miner(8).mine(template(b"slow"), &remote));
        token.cancel();
        let result = handle.join().unwrap();
        assert!(matches!(result, Err(MiningError::Cancelled { .. })));
    }

    #[test]
    fn test_template_previous_hash_changes_result() {
        let mut t = template(b"a");
        let a = miner(1).mine(t.clone(), &CancellationToken::new()).unwrap();
        t.previous_hash = BlockHash::from_bytes([7; 32]);
        let b = miner(1).mine(t, &CancellationToken::new()).unwrap();
        assert_ne!(a.block.hash, b.block.hash);
    }
}
