//! Runtime choice of persistence backend.

use async_trait::async_trait;
use docuchain_core::Block;
use docuchain_store::{JsonFileStore, Result, SqliteStore, Store};

use crate::config::{Backend, NodeConfig};

/// The configured backend.
#[derive(Debug)]
pub enum AnyStore {
    Json(JsonFileStore),
    Sqlite(SqliteStore),
}

impl AnyStore {
    /// Open the backend named by `config`, creating the data directory.
    pub fn open(config: &NodeConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let path = config.chain_path();
        Ok(match config.backend {
            Backend::Json => AnyStore::Json(JsonFileStore::new(path)),
            Backend::Sqlite => AnyStore::Sqlite(SqliteStore::open(path)?),
        })
    }
}

#[async_trait]
impl Store for AnyStore {
    async fn load_chain(&self) -> Result<Option<Vec<Block>>> {
        match self {
            AnyStore::Json(store) => store.load_chain().await,
            AnyStore::Sqlite(store) => store.load_chain().await,
        }
    }

    async fn save_chain(&self, blocks: &[Block]) -> Result<()> {
        match self {
            AnyStore::Json(store) => store.save_chain(blocks).await,
            AnyStore::Sqlite(store) => store.save_chain(blocks).await,
        }
    }

    fn describe(&self) -> String {
        match self {
            AnyStore::Json(store) => store.describe(),
            AnyStore::Sqlite(store) => store.describe(),
        }
    }
}
