//! # DocuChain Core
//!
//! Pure primitives for DocuChain: document records, blocks, proof-of-work,
//! and chain validation.
//!
//! This crate contains no I/O, no storage, no logging. It is pure computation
//! over hash-linked data structures.
//!
//! ## Key Types
//!
//! - [`DocumentRecord`] - Fingerprint and metadata of one issued document
//! - [`Block`] - A sealed, proof-of-work-protected batch of records
//! - [`Chain`] - Ordered block sequence starting at genesis
//! - [`Miner`] - Nonce search over a [`BlockTemplate`]
//! - [`ChainStatus`] - Result of [`validate_chain`]
//!
//! ## Canonicalization
//!
//! Block hashes cover a deterministic CBOR encoding. See [`canonical`] module.

pub mod block;
pub mod canonical;
pub mod chain;
pub mod difficulty;
pub mod error;
pub mod miner;
pub mod record;
pub mod types;
pub mod validation;

pub use block::{Block, BlockTemplate, GENESIS_NONCE, GENESIS_TIMESTAMP};
pub use canonical::{canonical_block_bytes, BlockPreimage};
pub use chain::{Chain, LocatedRecord};
pub use difficulty::{Difficulty, DEFAULT_DIFFICULTY, MAX_DIFFICULTY};
pub use error::{CoreError, MiningError};
pub use miner::{Mined, Miner, CANCEL_CHECK_INTERVAL};
pub use tokio_util::sync::CancellationToken;
pub use record::{DocumentRecord, DocumentRecordBuilder, MAX_FIELD_LEN};
pub use types::{sha256, BlockHash, Fingerprint};
pub use validation::{validate_chain, ChainStatus, TamperKind};
