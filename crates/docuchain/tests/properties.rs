//! Property tests over issued ledgers.

use bytes::Bytes;
use docuchain::{ChainStatus, VerifyOutcome};
use docuchain_testkit::generators::{content, field_text};
use docuchain_testkit::{sample_request, TestFixture};
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_issued_documents_verify(
        docs in prop::collection::btree_set(content(32), 1..5),
        recipient in field_text(),
    ) {
        runtime().block_on(async {
            let fixture = TestFixture::new().await;
            let docs: Vec<Vec<u8>> = docs.into_iter().collect();

            for (i, doc) in docs.iter().enumerate() {
                let mut request = sample_request(i as u32);
                request.content = Bytes::from(doc.clone());
                request.recipient_id = recipient.clone();
                let issued = fixture.registry.issue(request).await.unwrap();
                assert_eq!(issued.block_index, i as u64 + 1);
            }

            assert_eq!(fixture.ledger.validate(), ChainStatus::Valid);
            for (i, doc) in docs.iter().enumerate() {
                match fixture.registry.verify(doc) {
                    VerifyOutcome::Valid { block_index, .. } => {
                        assert_eq!(block_index, i as u64 + 1)
                    }
                    other => panic!("expected valid, got {:?}", other),
                }
            }
            assert_eq!(
                fixture.registry.documents_for(recipient.trim()).len(),
                docs.len()
            );
        });
    }

    #[test]
    fn prop_mutated_record_reports_its_block(
        len in 2usize..5,
        pick in any::<prop::sample::Index>(),
    ) {
        runtime().block_on(async {
            let fixture = TestFixture::new().await;
            for i in 0..len as u32 {
                fixture.registry.issue(sample_request(i)).await.unwrap();
            }

            let mut blocks = fixture.ledger.snapshot().blocks().to_vec();
            let target = 1 + pick.index(blocks.len() - 1);
            blocks[target].records[0].doc_title.push_str(" (amended)");

            let status = docuchain::core::validate_chain(&blocks, fixture.ledger.difficulty());
            assert_eq!(status.first_invalid(), Some(target as u64));

            // The untouched prefix still validates on its own.
            let prefix = docuchain::core::validate_chain(&blocks[..target], fixture.ledger.difficulty());
            assert!(prefix.is_valid());
        });
    }
}
