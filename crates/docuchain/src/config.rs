//! Ledger configuration.

use std::time::Duration;

use docuchain_core::Difficulty;

use crate::error::{LedgerError, Result};

/// Default upper bound on an issued document's size (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Configuration for the [`Ledger`](crate::Ledger).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Leading zero hex digits required of every non-genesis block hash.
    pub difficulty: Difficulty,
    /// Largest document, in bytes, the registry will fingerprint.
    pub max_file_size: usize,
    /// Cancel mining for a single append after this long.
    pub mining_timeout: Option<Duration>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            mining_timeout: None,
        }
    }
}

impl LedgerConfig {
    /// Config with the given difficulty and defaults elsewhere.
    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Parse a raw difficulty value, as read from flags or the environment.
    pub fn difficulty_from_u8(zeros: u8) -> Result<Difficulty> {
        Difficulty::new(zeros).map_err(|e| LedgerError::Config(e.to_string()))
    }

    /// Reject configurations the ledger cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_file_size == 0 {
            return Err(LedgerError::Config("max_file_size must be positive".into()));
        }
        if self.mining_timeout == Some(Duration::ZERO) {
            return Err(LedgerError::Config("mining_timeout must be positive".into()));
        }
        Ok(())
    }
}
