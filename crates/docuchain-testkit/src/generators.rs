//! Proptest generators for property-based testing.

use proptest::prelude::*;

use docuchain_core::{
    Block, BlockHash, BlockTemplate, DocumentRecord, DocumentRecordBuilder, Fingerprint,
};

/// Generate a random Fingerprint.
pub fn fingerprint() -> impl Strategy<Value = Fingerprint> {
    any::<[u8; 32]>().prop_map(Fingerprint::from_bytes)
}

/// Generate a random BlockHash.
pub fn block_hash() -> impl Strategy<Value = BlockHash> {
    any::<[u8; 32]>().prop_map(BlockHash::from_bytes)
}

/// Generate a non-blank metadata field, including non-ASCII text.
///
/// At most 64 chars of at most 2 bytes each, well under the field limit.
pub fn field_text() -> impl Strategy<Value = String> {
    "[A-Za-z0-9À-ÿ][A-Za-z0-9À-ÿ .,@-]{0,63}".prop_map(String::from)
}

/// Generate a reasonable timestamp (Unix ms).
pub fn timestamp() -> impl Strategy<Value = i64> {
    0i64..=4_102_444_800_000i64
}

/// Generate document bytes of up to `max_len` bytes.
pub fn content(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..=max_len)
}

/// Parameters for generating a record.
#[derive(Debug, Clone)]
pub struct RecordParams {
    pub content: Vec<u8>,
    pub issuer_org: String,
    pub doc_type: String,
    pub doc_title: String,
    pub recipient_name: String,
    pub recipient_id: String,
    pub file_name: Option<String>,
    pub issued_at: i64,
}

impl Arbitrary for RecordParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            content(256),
            field_text(),
            field_text(),
            field_text(),
            field_text(),
            field_text(),
            proptest::option::of("[a-z0-9_-]{1,32}\\.(pdf|png|jpg|jpeg)"),
            timestamp(),
        )
            .prop_map(
                |(content, issuer_org, doc_type, doc_title, recipient_name, recipient_id, file_name, issued_at)| {
                    RecordParams {
                        content,
                        issuer_org,
                        doc_type,
                        doc_title,
                        recipient_name,
                        recipient_id,
                        file_name,
                        issued_at,
                    }
                },
            )
            .boxed()
    }
}

/// Build a record from parameters.
pub fn record_from_params(params: &RecordParams) -> DocumentRecord {
    DocumentRecordBuilder::new(Fingerprint::of(&params.content))
        .issuer_org(params.issuer_org.clone())
        .doc_type(params.doc_type.clone())
        .doc_title(params.doc_title.clone())
        .recipient_name(params.recipient_name.clone())
        .recipient_id(params.recipient_id.clone())
        .file_name(params.file_name.clone())
        .issued_at(params.issued_at)
        .build()
        .expect("generated fields are within bounds")
}

/// Generate an unsealed block template with 1..=4 records.
pub fn block_template() -> impl Strategy<Value = BlockTemplate> {
    (
        1u64..1_000,
        timestamp(),
        prop::collection::vec(any::<RecordParams>(), 1..=4),
        block_hash(),
    )
        .prop_map(|(index, timestamp, params, previous_hash)| BlockTemplate {
            index,
            timestamp,
            records: params.iter().map(record_from_params).collect(),
            previous_hash,
        })
}

/// Generate a sealed block whose stored hash matches its contents.
pub fn sealed_block() -> impl Strategy<Value = Block> {
    (block_template(), any::<u64>()).prop_map(|(template, nonce)| {
        let hash = template.preimage().hash_with_nonce(nonce, &mut Vec::new());
        template.seal(nonce, hash)
    })
}
