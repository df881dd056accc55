//! # DocuChain Store
//!
//! Persistence adapters for the DocuChain ledger. The ledger is always saved
//! and loaded whole, behind the [`Store`] trait.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for loading and saving the chain
//! - [`JsonFileStore`] - Human-readable JSON file, atomically replaced on save
//! - [`SqliteStore`] - SQLite database with versioned migrations
//! - [`MemoryStore`] - In-memory storage for tests, with failure injection
//!
//! ## Usage
//!
//! ```rust,no_run
//! use docuchain_store::{JsonFileStore, Store};
//!
//! async fn example() {
//!     let store = JsonFileStore::new("data/blockchain.json");
//!     match store.load_chain().await.unwrap() {
//!         Some(blocks) => println!("loaded {} blocks", blocks.len()),
//!         None => println!("no ledger yet"),
//!     }
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Whole-chain saves**: `save_chain` replaces the stored chain in one step;
//!   a failed save leaves the previous state intact.
//! - **No validation**: stores check structure only. Hash and proof-of-work
//!   checks belong to the ledger.

pub mod error;
pub mod json;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::Store;
