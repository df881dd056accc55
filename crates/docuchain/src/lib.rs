//! # DocuChain
//!
//! Document issuance and verification over an append-only,
//! proof-of-work-protected ledger.
//!
//! ## Overview
//!
//! - **Ledger**: owns the chain, serializes appends, mines blocks on the
//!   blocking pool, and persists before acknowledging.
//! - **DocumentRegistry**: issue documents, verify them, list them, export the
//!   chain, and report health.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use docuchain::{DocumentRegistry, IssueRequest, Ledger, LedgerConfig};
//! use docuchain::store::JsonFileStore;
//!
//! async fn example() {
//!     let store = JsonFileStore::new("data/blockchain_data.json");
//!     let ledger = Ledger::open(store, LedgerConfig::default()).await.unwrap();
//!     let registry = DocumentRegistry::new(Arc::new(ledger));
//!
//!     let issued = registry
//!         .issue(IssueRequest {
//!             content: bytes::Bytes::from_static(b"%PDF-1.7 ..."),
//!             issuer_org: "State University".into(),
//!             doc_type: "Diploma".into(),
//!             doc_title: "BSc Computer Science".into(),
//!             recipient_name: "Ada Lovelace".into(),
//!             recipient_id: "ada@example.org".into(),
//!             file_name: Some("diploma.pdf".into()),
//!         })
//!         .await
//!         .unwrap();
//!     println!("sealed in block {}", issued.block_index);
//!
//!     let outcome = registry.verify(b"%PDF-1.7 ...");
//!     assert!(outcome.is_valid());
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `docuchain::core` - Core primitives (Block, Chain, Miner, ...)
//! - `docuchain::store` - Storage abstraction and backends

pub mod config;
pub mod error;
pub mod ledger;
pub mod registry;

pub use docuchain_core as core;
pub use docuchain_store as store;

pub use config::{LedgerConfig, DEFAULT_MAX_FILE_SIZE};
pub use error::{ErrorClass, LedgerError, Result};
pub use ledger::Ledger;
pub use registry::{
    ChainExport, DocumentRegistry, HealthReport, HealthStatus, IssueRequest, IssuedDocument,
    VerifyOutcome,
};

pub use docuchain_core::{
    Block, BlockHash, ChainStatus, Difficulty, DocumentRecord, Fingerprint, LocatedRecord,
    TamperKind,
};
