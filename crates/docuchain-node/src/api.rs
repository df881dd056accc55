//! Response bodies of the HTTP API.

use docuchain::{
    Block, BlockHash, ChainExport, DocumentRecord, Fingerprint, IssuedDocument, LocatedRecord,
    VerifyOutcome,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct IssueResponse {
    pub success: bool,
    pub message: String,
    pub document_hash: Fingerprint,
    pub block_number: u64,
    pub block_hash: BlockHash,
    pub timestamp: i64,
    pub record: DocumentRecord,
}

impl From<IssuedDocument> for IssueResponse {
    fn from(issued: IssuedDocument) -> Self {
        Self {
            success: true,
            message: "Document issued successfully".into(),
            document_hash: issued.record.fingerprint,
            block_number: issued.block_index,
            block_hash: issued.block_hash,
            timestamp: issued.block_timestamp,
            record: issued.record,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub message: String,
    pub document_hash: Fingerprint,
    #[serde(flatten)]
    pub outcome: VerifyOutcome,
}

impl VerifyResponse {
    pub fn new(document_hash: Fingerprint, outcome: VerifyOutcome) -> Self {
        let message = match &outcome {
            VerifyOutcome::Valid { block_index, .. } => {
                format!("Document is authentic and was issued in block {}", block_index)
            }
            VerifyOutcome::NotFound => "Document not found in the ledger".to_string(),
            VerifyOutcome::ChainTampered { index, reason } => {
                format!("Ledger failed validation at block {}: {}", index, reason)
            }
        };
        Self {
            valid: outcome.is_valid(),
            message,
            document_hash,
            outcome,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentsResponse {
    pub success: bool,
    pub count: usize,
    pub documents: Vec<LocatedRecord>,
}

impl From<Vec<LocatedRecord>> for DocumentsResponse {
    fn from(documents: Vec<LocatedRecord>) -> Self {
        Self {
            success: true,
            count: documents.len(),
            documents,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChainResponse {
    pub success: bool,
    pub length: usize,
    pub is_valid: bool,
    pub chain: Vec<Block>,
}

impl From<ChainExport> for ChainResponse {
    fn from(export: ChainExport) -> Self {
        Self {
            success: true,
            length: export.length,
            is_valid: export.is_valid,
            chain: export.blocks,
        }
    }
}
