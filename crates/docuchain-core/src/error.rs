//! Error types for DocuChain Core.

use thiserror::Error;

/// Errors raised while building records, configuring difficulty, or
/// assembling a chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),

    #[error("field `{field}` exceeds {max} bytes")]
    FieldTooLong { field: &'static str, max: usize },

    #[error("difficulty {got} exceeds maximum of {max}")]
    DifficultyTooHigh { got: u8, max: u8 },

    #[error("malformed chain: {0}")]
    MalformedChain(String),

    #[error("block {index} does not extend the chain tip: {reason}")]
    DoesNotExtend { index: u64, reason: &'static str },
}

/// Errors from the proof-of-work search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MiningError {
    #[error("mining cancelled after {attempts} attempts")]
    Cancelled { attempts: u64 },

    #[error("nonce space exhausted without meeting the difficulty target")]
    NonceSpaceExhausted,
}
