//! Canonical CBOR encoding of block preimages.
//!
//! This module implements RFC 8949 Core Deterministic Encoding:
//! - Map keys sorted by encoded byte comparison
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - No floats (timestamps are i64 milliseconds)
//!
//! Mining and validation both hash these bytes. Any divergence between the two
//! would make every sealed block look tampered, so there is exactly one
//! encoder.

use ciborium::value::Value;

use crate::record::DocumentRecord;
use crate::types::{BlockHash, Fingerprint};

/// Block preimage keys.
///
/// The nonce has the highest key, so it is always the last entry of the
/// encoded map.
mod block_keys {
    pub const INDEX: u64 = 0;
    pub const TIMESTAMP: u64 = 1;
    pub const RECORDS: u64 = 2;
    pub const PREVIOUS_HASH: u64 = 3;
    pub const NONCE: u64 = 4;
}

/// Record keys.
mod record_keys {
    pub const FINGERPRINT: u64 = 0;
    pub const ISSUER_ORG: u64 = 1;
    pub const DOC_TYPE: u64 = 2;
    pub const DOC_TITLE: u64 = 3;
    pub const RECIPIENT_NAME: u64 = 4;
    pub const RECIPIENT_ID: u64 = 5;
    pub const ISSUED_AT: u64 = 6;
    pub const FILE_NAME: u64 = 7;
}

const MAJOR_UINT: u8 = 0;
const MAJOR_NEGINT: u8 = 1;
const MAJOR_BYTES: u8 = 2;
const MAJOR_TEXT: u8 = 3;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;

/// The nonce-independent part of a block's canonical encoding.
///
/// `prefix || cbor(nonce)` is byte-identical to [`canonical_block_bytes`] for
/// the same fields, which lets the miner encode the block once and only
/// append the nonce per attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockPreimage {
    prefix: Vec<u8>,
}

impl BlockPreimage {
    /// Encode everything except the nonce value.
    pub fn new(
        index: u64,
        timestamp: i64,
        records: &[DocumentRecord],
        previous_hash: &BlockHash,
    ) -> Self {
        let entries = header_entries(index, timestamp, records, previous_hash);

        let mut prefix = Vec::new();
        encode_uint(&mut prefix, MAJOR_MAP, (entries.len() + 1) as u64);
        // Keys 0..=3 are single-byte encodings, already in canonical order.
        for (key, value) in &entries {
            encode_value_to(&mut prefix, key);
            encode_value_to(&mut prefix, value);
        }
        encode_uint(&mut prefix, MAJOR_UINT, block_keys::NONCE);

        Self { prefix }
    }

    /// Length of the nonce-independent prefix.
    pub fn prefix_len(&self) -> usize {
        self.prefix.len()
    }

    /// Write the full preimage for `nonce` into `buf`, replacing its contents.
    pub fn write_with_nonce(&self, nonce: u64, buf: &mut Vec<u8>) {
        buf.clear();
        buf.extend_from_slice(&self.prefix);
        encode_uint(buf, MAJOR_UINT, nonce);
    }

    /// Hash the preimage for `nonce`, reusing `scratch` as the encode buffer.
    pub fn hash_with_nonce(&self, nonce: u64, scratch: &mut Vec<u8>) -> BlockHash {
        self.write_with_nonce(nonce, scratch);
        BlockHash::digest(scratch)
    }
}

/// Encode a block's hashed fields to canonical CBOR bytes.
pub fn canonical_block_bytes(
    index: u64,
    timestamp: i64,
    records: &[DocumentRecord],
    previous_hash: &BlockHash,
    nonce: u64,
) -> Vec<u8> {
    let mut entries = header_entries(index, timestamp, records, previous_hash);
    entries.push((
        Value::Integer(block_keys::NONCE.into()),
        Value::Integer(nonce.into()),
    ));
    encode_cbor_value_canonical(&Value::Map(entries))
}

/// Encode a single record to canonical CBOR bytes.
pub fn canonical_record_bytes(record: &DocumentRecord) -> Vec<u8> {
    encode_cbor_value_canonical(&record_to_cbor_value(record))
}

fn header_entries(
    index: u64,
    timestamp: i64,
    records: &[DocumentRecord],
    previous_hash: &BlockHash,
) -> Vec<(Value, Value)> {
    let records: Vec<Value> = records.iter().map(record_to_cbor_value).collect();
    vec![
        (
            Value::Integer(block_keys::INDEX.into()),
            Value::Integer(index.into()),
        ),
        (
            Value::Integer(block_keys::TIMESTAMP.into()),
            Value::Integer(timestamp.into()),
        ),
        (
            Value::Integer(block_keys::RECORDS.into()),
            Value::Array(records),
        ),
        (
            Value::Integer(block_keys::PREVIOUS_HASH.into()),
            Value::Bytes(previous_hash.0.to_vec()),
        ),
    ]
}

/// Convert a record to a CBOR map with integer keys.
fn record_to_cbor_value(record: &DocumentRecord) -> Value {
    let text = |key: u64, s: &str| (Value::Integer(key.into()), Value::Text(s.to_string()));

    let file_name = match &record.file_name {
        Some(name) => Value::Text(name.clone()),
        None => Value::Null,
    };

    Value::Map(vec![
        (
            Value::Integer(record_keys::FINGERPRINT.into()),
            fingerprint_value(&record.fingerprint),
        ),
        text(record_keys::ISSUER_ORG, &record.issuer_org),
        text(record_keys::DOC_TYPE, &record.doc_type),
        text(record_keys::DOC_TITLE, &record.doc_title),
        text(record_keys::RECIPIENT_NAME, &record.recipient_name),
        text(record_keys::RECIPIENT_ID, &record.recipient_id),
        (
            Value::Integer(record_keys::ISSUED_AT.into()),
            Value::Integer(record.issued_at.into()),
        ),
        (Value::Integer(record_keys::FILE_NAME.into()), file_name),
    ])
}

fn fingerprint_value(fp: &Fingerprint) -> Value {
    Value::Bytes(fp.0.to_vec())
}

fn encode_cbor_value_canonical(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, value);
    buf
}

/// Recursively encode a CBOR value.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Bytes(b) => encode_bytes(buf, b),
        Value::Text(s) => encode_text(buf, s),
        Value::Array(arr) => encode_array(buf, arr),
        Value::Map(entries) => encode_map_canonical(buf, entries),
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Null => buf.push(0xf6),
        // Preimages are built only by this module and never contain these.
        _ => unreachable!("unsupported CBOR value in canonical preimage"),
    }
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: ciborium::value::Integer) {
    let n: i128 = i.into();

    if n >= 0 {
        encode_uint(buf, MAJOR_UINT, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        let abs = (-1 - n) as u64;
        encode_uint(buf, MAJOR_NEGINT, abs);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, MAJOR_BYTES, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, MAJOR_TEXT, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

fn encode_array(buf: &mut Vec<u8>, arr: &[Value]) {
    encode_uint(buf, MAJOR_ARRAY, arr.len() as u64);
    for item in arr {
        encode_value_to(buf, item);
    }
}

/// Encode a map canonically: keys sorted by their encoded bytes.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Value, Value)]) {
    let mut key_value_pairs: Vec<(Vec<u8>, &Value)> = entries
        .iter()
        .map(|(k, v)| {
            let mut key_buf = Vec::new();
            encode_value_to(&mut key_buf, k);
            (key_buf, v)
        })
        .collect();

    key_value_pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, MAJOR_MAP, key_value_pairs.len() as u64);
    for (key_bytes, value) in key_value_pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value);
    }
}
