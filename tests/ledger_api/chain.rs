//! Hash-chain continuity and tamper detection
//!
//! Builds chains of 100+ events through the public API, then reaches under
//! the facade to corrupt stored rows and asserts verification reports the
//! exact offending ordinal.

use crate::*;
use chronicle_storage::{EventStore, MemoryEventStore};
use std::sync::Arc;

/// A ledger wired over a store handle the test keeps, so rows can be
/// corrupted after the fact
fn setup_with_store() -> (Chronicle, CampaignId, Arc<MemoryEventStore>) {
    let store = Arc::new(MemoryEventStore::new());
    let db = Chronicle::builder().open_with_store(store.clone());
    let campaign = db
        .create_campaign(CampaignSeed::from_bytes(TEST_SEED))
        .expect("campaign");
    (db, campaign, store)
}

fn extend_chain(db: &Chronicle, campaign: &CampaignId, events: u64) {
    for i in 0..events {
        db.append(
            campaign,
            AppendRequest::new("world.step", payload(json!({"step": i}))),
        )
        .expect("append should succeed");
    }
}

#[test]
fn test_long_chain_verifies_to_its_tip() {
    let (db, campaign) = quick_setup();
    extend_chain(&db, &campaign, 120);

    match db.verify(&campaign) {
        ChainStatus::Valid { tip } => {
            assert_eq!(tip.replay_ordinal, 121);
            let last = db.events(&campaign).pop().expect("last event");
            assert_eq!(tip.payload_hash, last.payload_hash);
        }
        other => panic!("expected valid chain, got {:?}", other),
    }
}

#[test]
fn test_every_link_references_predecessor() {
    let (db, campaign) = quick_setup();
    extend_chain(&db, &campaign, 50);

    let events = db.events(&campaign);
    for pair in events.windows(2) {
        assert_eq!(
            pair[1].prev_event_hash, pair[0].payload_hash,
            "event {} must link to event {}",
            pair[1].replay_ordinal, pair[0].replay_ordinal
        );
    }
}

#[test]
fn test_flipped_payload_hash_reported_at_its_ordinal() {
    let (db, campaign, store) = setup_with_store();
    extend_chain(&db, &campaign, 100);

    store.corrupt_event_for_test(&campaign, 42, |e| {
        e.payload_hash[3] ^= 0x01;
    });

    match db.verify(&campaign) {
        ChainStatus::PayloadMismatch { ordinal, stored, computed } => {
            assert_eq!(ordinal, 42);
            assert_ne!(stored, computed);
        }
        other => panic!("expected payload mismatch at 42, got {:?}", other),
    }
}

#[test]
fn test_flipped_tip_hash_still_detected() {
    // The tip has no successor, so only the payload recompute can catch it
    let (db, campaign, store) = setup_with_store();
    extend_chain(&db, &campaign, 30);
    let tip_ordinal = store.chain_tip(&campaign).expect("tip").replay_ordinal;

    store.corrupt_event_for_test(&campaign, tip_ordinal, |e| {
        e.payload_hash[0] ^= 0x80;
    });

    match db.verify(&campaign) {
        ChainStatus::PayloadMismatch { ordinal, .. } => assert_eq!(ordinal, tip_ordinal),
        other => panic!("expected payload mismatch at the tip, got {:?}", other),
    }
}

#[test]
fn test_flipped_prev_hash_reported_with_both_hashes() {
    let (db, campaign, store) = setup_with_store();
    extend_chain(&db, &campaign, 20);

    store.corrupt_event_for_test(&campaign, 10, |e| {
        e.prev_event_hash[31] ^= 0xff;
    });

    match db.verify(&campaign) {
        ChainStatus::Mismatch {
            ordinal,
            expected_prev_hash,
            actual_prev_hash,
        } => {
            assert_eq!(ordinal, 10);
            assert_ne!(expected_prev_hash, actual_prev_hash);
        }
        other => panic!("expected linkage mismatch at 10, got {:?}", other),
    }
}

#[test]
fn test_any_flipped_payload_hash_byte_is_detected() {
    use rand::Rng;

    let (db, campaign, store) = setup_with_store();
    extend_chain(&db, &campaign, 100);

    let mut rng = rand::thread_rng();
    let ordinal = rng.gen_range(1..=101);
    let byte = rng.gen_range(0..32);

    store.corrupt_event_for_test(&campaign, ordinal, |e| {
        e.payload_hash[byte] ^= 0x01;
    });

    match db.verify(&campaign) {
        ChainStatus::PayloadMismatch { ordinal: reported, .. } => {
            assert_eq!(reported, ordinal, "mismatch must name the tampered ordinal")
        }
        other => panic!("tampering ordinal {} went undetected: {:?}", ordinal, other),
    }
}

#[test]
fn test_tampered_payload_content_detected() {
    let (db, campaign, store) = setup_with_store();
    extend_chain(&db, &campaign, 10);

    store.corrupt_event_for_test(&campaign, 5, |e| {
        e.payload = Value::from_json(json!({"step": 999999}));
    });

    assert!(matches!(
        db.verify(&campaign),
        ChainStatus::PayloadMismatch { ordinal: 5, .. }
    ));
}

#[test]
fn test_verification_does_not_mutate() {
    let (db, campaign) = quick_setup();
    extend_chain(&db, &campaign, 10);

    let before = db.events(&campaign);
    for _ in 0..3 {
        assert!(db.verify(&campaign).is_ok());
    }
    assert_eq!(db.events(&campaign), before);
}

#[test]
fn test_store_rejects_ordinal_gap_directly() {
    // Bypassing the append path must not be able to leave gaps
    let (db, campaign, store) = setup_with_store();
    extend_chain(&db, &campaign, 3);

    let mut forged = db.events(&campaign).pop().expect("an event to clone");
    forged.replay_ordinal = 10;
    forged.idempotency_key = chronicledb::IdempotencyKey::from_bytes([0xee; 16]);
    let err = store.insert(forged).unwrap_err();
    assert!(matches!(
        err,
        chronicle_storage::StoreError::OrdinalGap { expected: 5, actual: 10, .. }
    ));
}
