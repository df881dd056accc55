//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the canonical block encoding and hash. Any change to
//! field order, key numbering, or integer encoding breaks every persisted
//! ledger, and these tests.

use docuchain_core::{Block, BlockTemplate, DocumentRecordBuilder, Fingerprint};

/// Hash of the genesis block.
pub const GENESIS_HASH: &str = "d22291e707e690d4a4c41c4fb460b4f49dfb0427baf45942fc1a5ba92b4d1c2d";

/// A golden test vector: a one-record block built on genesis.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Document bytes.
    pub content: &'static [u8],
    pub issuer_org: &'static str,
    pub doc_type: &'static str,
    pub doc_title: &'static str,
    pub recipient_name: &'static str,
    pub recipient_id: &'static str,
    pub file_name: Option<&'static str>,
    pub issued_at: i64,
    /// Block timestamp.
    pub timestamp: i64,
    pub nonce: u64,
    /// Expected block hash (hex).
    pub expected_hash: &'static str,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "hello diploma at nonce 0",
            content: b"hello",
            issuer_org: "State University",
            doc_type: "Diploma",
            doc_title: "BSc Computer Science",
            recipient_name: "Ada Lovelace",
            recipient_id: "R1",
            file_name: Some("hello.pdf"),
            issued_at: 1736870400000, // 2025-01-14T16:00:00Z
            timestamp: 1736870400500,
            nonce: 0,
            expected_hash: "5ca7994c0c3b881950eec125a01c99eab3c46582814595298800ed950dc66248",
        },
        GoldenVector {
            name: "hello diploma mined at difficulty 2",
            content: b"hello",
            issuer_org: "State University",
            doc_type: "Diploma",
            doc_title: "BSc Computer Science",
            recipient_name: "Ada Lovelace",
            recipient_id: "R1",
            file_name: Some("hello.pdf"),
            issued_at: 1736870400000,
            timestamp: 1736870400500,
            nonce: 21,
            expected_hash: "008d7225b1501646bb72028308a0303e2b39e0215d3289b55b28ed99fc0adabc",
        },
        GoldenVector {
            name: "empty document without file name",
            content: b"",
            issuer_org: "Org",
            doc_type: "Certificate",
            doc_title: "Empty",
            recipient_name: "Nobody",
            recipient_id: "R0",
            file_name: None,
            issued_at: 0,
            timestamp: 0,
            nonce: 7,
            expected_hash: "32390bcb1531b40bf93cfae686814dbe52ae4cb60910ea4999d6dac5ff279efb",
        },
    ]
}

/// Build the block described by a vector, on top of genesis.
pub fn block_from_vector(vector: &GoldenVector) -> Block {
    let record = DocumentRecordBuilder::new(Fingerprint::of(vector.content))
        .issuer_org(vector.issuer_org)
        .doc_type(vector.doc_type)
        .doc_title(vector.doc_title)
        .recipient_name(vector.recipient_name)
        .recipient_id(vector.recipient_id)
        .file_name(vector.file_name.map(str::to_string))
        .issued_at(vector.issued_at)
        .build()
        .expect("vector fields are valid");

    let template = BlockTemplate {
        index: 1,
        timestamp: vector.timestamp,
        records: vec![record],
        previous_hash: Block::genesis().hash,
    };
    let hash = template.preimage().hash_with_nonce(vector.nonce, &mut Vec::new());
    template.seal(vector.nonce, hash)
}

/// Check every vector; returns `(name, matches, actual hash)`.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let hex = block_from_vector(v).hash.to_hex();
            (v.name.to_string(), hex == v.expected_hash, hex)
        })
        .collect()
}
