//! Document issuance and verification over a [`Ledger`].

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use docuchain_core::{
    Block, BlockHash, ChainStatus, DocumentRecord, DocumentRecordBuilder, Fingerprint,
    LocatedRecord, TamperKind,
};
use docuchain_store::Store;

use crate::error::{LedgerError, Result};
use crate::ledger::{now_millis, Ledger};

/// A document to issue: its bytes and metadata.
#[derive(Debug, Clone, Default)]
pub struct IssueRequest {
    pub content: Bytes,
    pub issuer_org: String,
    pub doc_type: String,
    pub doc_title: String,
    pub recipient_name: String,
    pub recipient_id: String,
    pub file_name: Option<String>,
}

/// A successfully issued document and where it was sealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedDocument {
    pub record: DocumentRecord,
    pub block_index: u64,
    pub block_hash: BlockHash,
    pub block_timestamp: i64,
}

/// Outcome of verifying a document against the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum VerifyOutcome {
    /// The chain is intact and holds this document.
    Valid {
        block_index: u64,
        block_timestamp: i64,
        record: DocumentRecord,
    },
    /// The chain is intact and does not hold this document.
    NotFound,
    /// The chain fails validation; no match is trusted.
    ChainTampered { index: u64, reason: TamperKind },
}

impl VerifyOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, VerifyOutcome::Valid { .. })
    }
}

/// The full chain with its validity, as served to auditors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainExport {
    pub length: usize,
    pub is_valid: bool,
    pub blocks: Vec<Block>,
}

/// Overall health of the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Tampered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub chain_length: usize,
    pub last_block_hash: BlockHash,
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_invalid: Option<u64>,
}

/// Issuance and verification use cases.
pub struct DocumentRegistry<S: Store> {
    ledger: Arc<Ledger<S>>,
}

impl<S: Store> Clone for DocumentRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
        }
    }
}

impl<S: Store> DocumentRegistry<S> {
    pub fn new(ledger: Arc<Ledger<S>>) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &Arc<Ledger<S>> {
        &self.ledger
    }

    /// Fingerprint the document, seal its record into a new block, and
    /// persist the chain.
    pub async fn issue(&self, request: IssueRequest) -> Result<IssuedDocument> {
        if request.content.is_empty() {
            return Err(LedgerError::InvalidInput("document is empty".into()));
        }
        let max = self.ledger.config().max_file_size;
        if request.content.len() > max {
            return Err(LedgerError::InvalidInput(format!(
                "document is {} bytes; maximum is {} bytes",
                request.content.len(),
                max
            )));
        }

        let record = DocumentRecordBuilder::new(Fingerprint::of(&request.content))
            .issuer_org(request.issuer_org)
            .doc_type(request.doc_type)
            .doc_title(request.doc_title)
            .recipient_name(request.recipient_name)
            .recipient_id(request.recipient_id)
            .file_name(request.file_name)
            .issued_at(now_millis())
            .build()?;

        let block = self.ledger.append(vec![record.clone()]).await?;
        Ok(IssuedDocument {
            record,
            block_index: block.index,
            block_hash: block.hash,
            block_timestamp: block.timestamp,
        })
    }

    /// Verify document bytes.
    pub fn verify(&self, content: &[u8]) -> VerifyOutcome {
        self.verify_fingerprint(&Fingerprint::of(content))
    }

    /// Verify a precomputed fingerprint. The chain is re-validated first; a
    /// tampered chain reports tampering even when the document is present.
    pub fn verify_fingerprint(&self, fingerprint: &Fingerprint) -> VerifyOutcome {
        let chain = self.ledger.snapshot();
        if let ChainStatus::Tampered { index, reason } = chain.validate(self.ledger.difficulty()) {
            return VerifyOutcome::ChainTampered { index, reason };
        }
        match chain.find_by_fingerprint(fingerprint) {
            Some(found) => VerifyOutcome::Valid {
                block_index: found.block_index,
                block_timestamp: found.block_timestamp,
                record: found.record,
            },
            None => VerifyOutcome::NotFound,
        }
    }

    /// Documents issued to `recipient_id`, in chain order.
    pub fn documents_for(&self, recipient_id: &str) -> Vec<LocatedRecord> {
        self.ledger.find_by_recipient(recipient_id.trim())
    }

    /// Every issued document, in chain order.
    pub fn all_documents(&self) -> Vec<LocatedRecord> {
        self.ledger.snapshot().records()
    }

    pub fn export_chain(&self) -> ChainExport {
        let chain = self.ledger.snapshot();
        let is_valid = chain.validate(self.ledger.difficulty()).is_valid();
        ChainExport {
            length: chain.len(),
            is_valid,
            blocks: chain.blocks().to_vec(),
        }
    }

    pub fn health_check(&self) -> HealthReport {
        let chain = self.ledger.snapshot();
        let status = chain.validate(self.ledger.difficulty());
        HealthReport {
            status: if status.is_valid() {
                HealthStatus::Healthy
            } else {
                HealthStatus::Tampered
            },
            chain_length: chain.len(),
            last_block_hash: chain.tip_hash(),
            is_valid: status.is_valid(),
            first_invalid: status.first_invalid(),
        }
    }
}
