//! # DocuChain Node
//!
//! Command-line and HTTP front end for a DocuChain ledger.
//!
//! - `config`: flags and `DOCUCHAIN_*` environment variables
//! - `store`: runtime choice between the JSON file and SQLite backends
//! - `archive`: upload policy and the content-addressed document archive
//! - `server`: axum routes under `/api`
//! - `node`: the ledger opened from configuration, with one method per CLI
//!   subcommand

pub mod api;
pub mod archive;
pub mod config;
pub mod errors;
pub mod node;
pub mod server;
pub mod store;

pub use config::{Backend, NodeConfig};
pub use errors::ApiError;
pub use node::{IssueArgs, Node};
pub use server::{build_router, AppState};
pub use store::AnyStore;
