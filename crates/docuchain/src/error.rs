//! Error types for the ledger.

use docuchain_core::{CoreError, Fingerprint, MiningError};
use docuchain_store::StoreError;
use thiserror::Error;

/// Broad category of a [`LedgerError`], used to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The caller sent something unacceptable.
    Input,
    /// The request conflicts with what the ledger already holds.
    Integrity,
    /// The ledger could not do its work (mining, storage, configuration).
    Resource,
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Missing, blank, oversized, or otherwise unacceptable input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Append called with no records.
    #[error("cannot append an empty batch")]
    EmptyBatch,

    /// The fingerprint is already recorded. `block_index` is `None` when the
    /// duplicate is inside the submitted batch itself.
    #[error("document {fingerprint} already issued {}", duplicate_location(.block_index))]
    DuplicateFingerprint {
        fingerprint: Fingerprint,
        block_index: Option<u64>,
    },

    /// Proof-of-work search failed or was cancelled.
    #[error("mining failed: {0}")]
    MiningFailed(#[from] MiningError),

    /// The mined block could not be persisted; the chain is unchanged.
    #[error("persistence failed: {0}")]
    PersistenceFailed(#[source] StoreError),

    /// The persisted chain could not be loaded.
    #[error("failed to load ledger: {0}")]
    Load(#[source] StoreError),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Unexpected internal failure (a panicked worker).
    #[error("internal error: {0}")]
    Internal(String),
}

fn duplicate_location(block_index: &Option<u64>) -> String {
    match block_index {
        Some(index) => format!("in block {}", index),
        None => "in this batch".to_string(),
    }
}

impl LedgerError {
    pub fn class(&self) -> ErrorClass {
        match self {
            LedgerError::InvalidInput(_) | LedgerError::EmptyBatch => ErrorClass::Input,
            LedgerError::DuplicateFingerprint { .. } => ErrorClass::Integrity,
            LedgerError::MiningFailed(_)
            | LedgerError::PersistenceFailed(_)
            | LedgerError::Load(_)
            | LedgerError::Config(_)
            | LedgerError::Internal(_) => ErrorClass::Resource,
        }
    }
}

impl From<CoreError> for LedgerError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::EmptyField(_) | CoreError::FieldTooLong { .. } => {
                LedgerError::InvalidInput(e.to_string())
            }
            CoreError::DifficultyTooHigh { .. } => LedgerError::Config(e.to_string()),
            CoreError::MalformedChain(_) => {
                LedgerError::Load(StoreError::InvalidData(e.to_string()))
            }
            CoreError::DoesNotExtend { .. } => LedgerError::Internal(e.to_string()),
        }
    }
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes() {
        assert_eq!(LedgerError::EmptyBatch.class(), ErrorClass::Input);
        assert_eq!(
            LedgerError::DuplicateFingerprint {
                fingerprint: Fingerprint::ZERO,
                block_index: Some(1)
            }
            .class(),
            ErrorClass::Integrity
        );
        assert_eq!(
            LedgerError::MiningFailed(MiningError::NonceSpaceExhausted).class(),
            ErrorClass::Resource
        );
    }

    #[test]
    fn test_core_error_mapping() {
        let e: LedgerError = CoreError::EmptyField("doc_type").into();
        assert!(matches!(e, LedgerError::InvalidInput(_)));
        assert!(e.to_string().contains("doc_type"));
    }

    #[test]
    fn test_duplicate_message() {
        let e = LedgerError::DuplicateFingerprint {
            fingerprint: Fingerprint::ZERO,
            block_index: Some(4),
        };
        assert!(e.to_string().ends_with("in block 4"));

        let e = LedgerError::DuplicateFingerprint {
            fingerprint: Fingerprint::ZERO,
            block_index: None,
        };
        assert!(e.to_string().ends_with("in this batch"));
    }
}
