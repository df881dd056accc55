//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use bytes::Bytes;
use docuchain::{DocumentRegistry, IssueRequest, Ledger, LedgerConfig};
use docuchain_core::{
    Block, CancellationToken, Chain, Difficulty, DocumentRecord, DocumentRecordBuilder, Fingerprint,
    Miner,
};
use docuchain_store::{MemoryStore, Store};

/// Difficulty used by fixtures: one leading zero hex digit, about 16 attempts.
pub const TEST_DIFFICULTY: u8 = 1;

/// A ledger over an in-memory store, with a registry in front of it.
pub struct TestFixture {
    pub ledger: Arc<Ledger<MemoryStore>>,
    pub registry: DocumentRegistry<MemoryStore>,
}

impl TestFixture {
    /// Open a fresh ledger at [`TEST_DIFFICULTY`].
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: LedgerConfig) -> Self {
        let ledger = Ledger::open(MemoryStore::new(), config)
            .await
            .expect("in-memory ledger opens");
        let ledger = Arc::new(ledger);
        Self {
            registry: DocumentRegistry::new(Arc::clone(&ledger)),
            ledger,
        }
    }

    pub fn store(&self) -> &MemoryStore {
        self.ledger.store()
    }
}

/// Default config for tests.
pub fn test_config() -> LedgerConfig {
    LedgerConfig::with_difficulty(test_difficulty())
}

pub fn test_difficulty() -> Difficulty {
    Difficulty::new(TEST_DIFFICULTY).expect("test difficulty is in range")
}

/// Open a ledger at [`TEST_DIFFICULTY`] over any store.
pub async fn open_ledger<S: Store>(store: S) -> Ledger<S> {
    Ledger::open(store, test_config())
        .await
        .expect("ledger opens")
}

/// A distinct, valid issue request for seed `i`.
pub fn sample_request(i: u32) -> IssueRequest {
    IssueRequest {
        content: Bytes::from(format!("%PDF-1.7 document #{}", i).into_bytes()),
        issuer_org: "State University".into(),
        doc_type: "Diploma".into(),
        doc_title: format!("Document {}", i),
        recipient_name: format!("Recipient {}", i),
        recipient_id: format!("R{}", i % 4),
        file_name: Some(format!("doc-{}.pdf", i)),
    }
}

/// A valid record for `content`, issued to `recipient_id`.
pub fn sample_record(content: &[u8], recipient_id: &str) -> DocumentRecord {
    DocumentRecordBuilder::new(Fingerprint::of(content))
        .issuer_org("State University")
        .doc_type("Certificate")
        .doc_title("Sample")
        .recipient_name("Sample Recipient")
        .recipient_id(recipient_id)
        .issued_at(1_736_870_400_000)
        .build()
        .expect("sample record is valid")
}

/// Mine a valid chain of `len` blocks (genesis included) at [`TEST_DIFFICULTY`].
pub fn mined_chain(len: usize) -> Vec<Block> {
    let miner = Miner::new(test_difficulty());
    let mut chain = Chain::new();
    for i in 1..len {
        let content = format!("block {} content", i);
        let record = sample_record(content.as_bytes(), &format!("R{}", i % 3));
        let template = chain.next_template(vec![record], 1_736_870_400_000 + i as i64);
        let mined = miner
            .mine(template, &CancellationToken::new())
            .expect("mining at test difficulty succeeds");
        chain.push(mined.block).expect("mined block extends chain");
    }
    chain.into_blocks()
}
