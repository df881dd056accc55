//! Database schema migrations for SQLite.
//!
//! A simple versioned migration system. Each migration is a SQL batch that
//! transforms the schema from version N to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// Idempotent; safe to call on every open.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            current, CURRENT_VERSION
        )));
    }

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
            tracing::info!(version, "applied schema migration");
        }

        tx.commit()?;
    }

    Ok(())
}

fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: blocks and their records.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE blocks (
            block_index INTEGER PRIMARY KEY,  -- position in the chain
            timestamp INTEGER NOT NULL,       -- Unix ms
            previous_hash BLOB NOT NULL,      -- 32 bytes
            nonce INTEGER NOT NULL,           -- u64 stored bit-for-bit as i64
            hash BLOB NOT NULL                -- 32 bytes, as persisted (not recomputed)
        );

        CREATE TABLE records (
            block_index INTEGER NOT NULL REFERENCES blocks(block_index),
            position INTEGER NOT NULL,        -- order within the block
            fingerprint BLOB NOT NULL,        -- 32 bytes, SHA-256 of the document
            issuer_org TEXT NOT NULL,
            doc_type TEXT NOT NULL,
            doc_title TEXT NOT NULL,
            recipient_name TEXT NOT NULL,
            recipient_id TEXT NOT NULL,
            file_name TEXT,
            issued_at INTEGER NOT NULL,
            PRIMARY KEY (block_index, position)
        );

        CREATE INDEX idx_records_fingerprint ON records(fingerprint);
        CREATE INDEX idx_records_recipient ON records(recipient_id);
        "#,
    )?;

    Ok(())
}

fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
