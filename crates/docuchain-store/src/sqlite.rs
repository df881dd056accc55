//! SQLite implementation of the Store trait.
//!
//! Blocks and records live in two tables. A save replaces both tables inside
//! one transaction, so a crash mid-save leaves the previous chain in place.
//! Uses rusqlite with bundled SQLite, wrapped in async via
//! `tokio::task::spawn_blocking`.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection};

use docuchain_core::{Block, BlockHash, DocumentRecord, Fingerprint};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::Store;

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations run on the blocking pool.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    label: String,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").field("label", &self.label).finish()
    }
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut conn = Connection::open(path)?;
        conn.pragma_update(None, "synchronous", "FULL")?;
        migration::migrate(&mut conn)?;
        tracing::debug!(path = %path.display(), "opened sqlite store");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            label: format!("sqlite:{}", path.display()),
        })
    }

    /// Open an in-memory SQLite database. Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            label: "sqlite::memory:".to_string(),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Unavailable(format!("mutex poisoned: {}", e)))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("spawn_blocking failed: {}", e)))?
    }
}

fn blob32(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<[u8; 32]> {
    let bytes: Vec<u8> = row.get(idx)?;
    bytes.try_into().map_err(|b: Vec<u8>| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Blob,
            format!("expected 32 bytes, got {}", b.len()).into(),
        )
    })
}

fn row_to_block(row: &rusqlite::Row<'_>) -> rusqlite::Result<Block> {
    Ok(Block {
        index: row.get::<_, i64>(0)? as u64,
        timestamp: row.get(1)?,
        records: Vec::new(),
        previous_hash: BlockHash::from_bytes(blob32(row, 2)?),
        nonce: row.get::<_, i64>(3)? as u64,
        hash: BlockHash::from_bytes(blob32(row, 4)?),
    })
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<(u64, DocumentRecord)> {
    let block_index = row.get::<_, i64>(0)? as u64;
    let record = DocumentRecord {
        fingerprint: Fingerprint::from_bytes(blob32(row, 1)?),
        issuer_org: row.get(2)?,
        doc_type: row.get(3)?,
        doc_title: row.get(4)?,
        recipient_name: row.get(5)?,
        recipient_id: row.get(6)?,
        file_name: row.get(7)?,
        issued_at: row.get(8)?,
    };
    Ok((block_index, record))
}

fn load_blocks(conn: &Connection) -> Result<Vec<Block>> {
    let mut blocks: Vec<Block> = conn
        .prepare(
            "SELECT block_index, timestamp, previous_hash, nonce, hash
             FROM blocks ORDER BY block_index",
        )?
        .query_map([], row_to_block)?
        .collect::<rusqlite::Result<_>>()?;

    let records: Vec<(u64, DocumentRecord)> = conn
        .prepare(
            "SELECT block_index, fingerprint, issuer_org, doc_type, doc_title,
                    recipient_name, recipient_id, file_name, issued_at
             FROM records ORDER BY block_index, position",
        )?
        .query_map([], row_to_record)?
        .collect::<rusqlite::Result<_>>()?;

    for (block_index, record) in records {
        let block = blocks
            .iter_mut()
            .find(|b| b.index == block_index)
            .ok_or_else(|| {
                StoreError::InvalidData(format!("record references missing block {}", block_index))
            })?;
        block.records.push(record);
    }

    Ok(blocks)
}

fn replace_blocks(conn: &mut Connection, blocks: &[Block]) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM records", [])?;
    tx.execute("DELETE FROM blocks", [])?;
    {
        let mut insert_block = tx.prepare(
            "INSERT INTO blocks (block_index, timestamp, previous_hash, nonce, hash)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        let mut insert_record = tx.prepare(
            "INSERT INTO records (
                block_index, position, fingerprint, issuer_org, doc_type, doc_title,
                recipient_name, recipient_id, file_name, issued_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;

        for block in blocks {
            insert_block.execute(params![
                block.index as i64,
                block.timestamp,
                block.previous_hash.as_bytes().as_slice(),
                block.nonce as i64,
                block.hash.as_bytes().as_slice(),
            ])?;

            for (position, record) in block.records.iter().enumerate() {
                insert_record.execute(params![
                    block.index as i64,
                    position as i64,
                    record.fingerprint.as_bytes().as_slice(),
                    record.issuer_org,
                    record.doc_type,
                    record.doc_title,
                    record.recipient_name,
                    record.recipient_id,
                    record.file_name,
                    record.issued_at,
                ])?;
            }
        }
    }
    tx.commit()?;
    Ok(())
}

#[async_trait]
impl Store for SqliteStore {
    async fn load_chain(&self) -> Result<Option<Vec<Block>>> {
        let blocks = self.with_conn(|conn| load_blocks(conn)).await?;
        if blocks.is_empty() {
            return Ok(None);
        }
        tracing::debug!(store = %self.label, blocks = blocks.len(), "loaded chain");
        Ok(Some(blocks))
    }

    async fn save_chain(&self, blocks: &[Block]) -> Result<()> {
        let owned = blocks.to_vec();
        let count = owned.len();
        self.with_conn(move |conn| replace_blocks(conn, &owned))
            .await
            .map_err(|e| {
                tracing::warn!(store = %self.label, error = %e, "chain save failed");
                e
            })?;
        tracing::debug!(store = %self.label, blocks = count, "saved chain");
        Ok(())
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
