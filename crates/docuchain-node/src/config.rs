//! Node configuration from flags and environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, ValueEnum};
use docuchain::{LedgerConfig, DEFAULT_MAX_FILE_SIZE};

/// Persistence backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Pretty-printed JSON array of blocks.
    #[default]
    Json,
    /// SQLite database with versioned schema.
    Sqlite,
}

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct NodeConfig {
    /// Directory holding the ledger and archived documents.
    #[arg(long, global = true, env = "DOCUCHAIN_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Storage backend for the ledger.
    #[arg(long, global = true, env = "DOCUCHAIN_BACKEND", value_enum, default_value_t = Backend::Json)]
    pub backend: Backend,

    /// Leading zero hex digits required of each block hash (0-8).
    #[arg(long, global = true, env = "DOCUCHAIN_DIFFICULTY", default_value_t = docuchain_core::DEFAULT_DIFFICULTY)]
    pub difficulty: u8,

    /// Address the HTTP server listens on.
    #[arg(long, global = true, env = "DOCUCHAIN_BIND", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// Largest accepted document, in bytes.
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_FILE_SIZE)]
    pub max_file_size: usize,

    /// Give up mining a block after this many seconds.
    #[arg(long, global = true)]
    pub mining_timeout_secs: Option<u64>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            backend: Backend::Json,
            difficulty: docuchain_core::DEFAULT_DIFFICULTY,
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            mining_timeout_secs: None,
        }
    }
}

impl NodeConfig {
    /// Where the ledger lives for the configured backend.
    pub fn chain_path(&self) -> PathBuf {
        match self.backend {
            Backend::Json => self.data_dir.join("blockchain_data.json"),
            Backend::Sqlite => self.data_dir.join("blockchain.db"),
        }
    }

    /// Where issued documents are archived.
    pub fn documents_dir(&self) -> PathBuf {
        self.data_dir.join("documents")
    }

    pub fn ledger_config(&self) -> docuchain::Result<LedgerConfig> {
        let config = LedgerConfig {
            difficulty: LedgerConfig::difficulty_from_u8(self.difficulty)?,
            max_file_size: self.max_file_size,
            mining_timeout: self.mining_timeout_secs.map(Duration::from_secs),
        };
        config.validate()?;
        Ok(config)
    }
}
