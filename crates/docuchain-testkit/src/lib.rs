//! # DocuChain Testkit
//!
//! Testing utilities for DocuChain.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known blocks with expected hashes, pinning the
//!   canonical encoding
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: A ready ledger and registry over an in-memory store
//!
//! ## Golden Vectors
//!
//! ```rust
//! use docuchain_testkit::vectors::{all_vectors, block_from_vector};
//!
//! for vector in all_vectors() {
//!     let block = block_from_vector(&vector);
//!     println!("{}: {}", vector.name, block.hash);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use docuchain_testkit::generators::{RecordParams, record_from_params};
//!
//! proptest! {
//!     #[test]
//!     fn record_builds(params: RecordParams) {
//!         prop_assert!(record_from_params(&params).validate().is_ok());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use docuchain_testkit::fixtures::{sample_request, TestFixture};
//!
//! async fn example() {
//!     let fixture = TestFixture::new().await;
//!     let issued = fixture.registry.issue(sample_request(1)).await.unwrap();
//!     assert_eq!(issued.block_index, 1);
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{mined_chain, sample_record, sample_request, TestFixture, TEST_DIFFICULTY};
pub use generators::{record_from_params, RecordParams};
pub use vectors::{all_vectors, block_from_vector, verify_all_vectors, GoldenVector};
