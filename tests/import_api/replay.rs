//! Replay stability
//!
//! Importing the same package twice must append zero new events the second
//! time and reproduce the identical state digest. Two fresh campaigns fed
//! the same package must converge on the same digest.

use crate::*;
use chronicledb::ImportAction;

#[test]
fn test_first_import_seeds_the_campaign() {
    let (db, campaign) = quick_setup();
    let summary = db.import(&campaign, &starter_package()).expect("import");

    assert_eq!(summary.package_id, "starter-isles");
    assert_eq!(summary.created, 5);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.events_appended, 6, "five seeds plus the summary");
    assert!(db.verify(&campaign).is_ok());
}

#[test]
fn test_second_import_appends_nothing() {
    let (db, campaign) = quick_setup();
    let first = db.import(&campaign, &starter_package()).expect("first");
    let len_after_first = db.len(&campaign);

    let second = db.import(&campaign, &starter_package()).expect("second");

    assert_eq!(second.events_appended, 0);
    assert_eq!(second.created, 0);
    assert_eq!(second.skipped, 5);
    assert_eq!(db.len(&campaign), len_after_first);
    assert_eq!(second.state_digest, first.state_digest);
    assert_eq!(second.chain_tip, first.chain_tip);
}

#[test]
fn test_fresh_campaigns_converge_on_the_same_digest() {
    let (db1, c1) = quick_setup();
    let (db2, c2) = quick_setup();

    let s1 = db1.import(&c1, &starter_package()).expect("import 1");
    let s2 = db2.import(&c2, &starter_package()).expect("import 2");

    assert_eq!(s1.state_digest, s2.state_digest);
    assert_eq!(s1.manifest_hash, s2.manifest_hash);

    // The seeded event sequences are identical too
    let types1: Vec<String> = db1.events(&c1).into_iter().map(|e| e.event_type).collect();
    let types2: Vec<String> = db2.events(&c2).into_iter().map(|e| e.event_type).collect();
    assert_eq!(types1, types2);

    let hashes1: Vec<[u8; 32]> = db1.events(&c1).iter().map(|e| e.payload_hash).collect();
    let hashes2: Vec<[u8; 32]> = db2.events(&c2).iter().map(|e| e.payload_hash).collect();
    assert_eq!(hashes1, hashes2);
}

#[test]
fn test_import_log_proves_replay() {
    let (db, campaign) = quick_setup();
    let first = db.import(&campaign, &starter_package()).expect("first");
    let second = db.import(&campaign, &starter_package()).expect("second");

    assert_eq!(first.log.len(), second.log.len());
    for (a, b) in first.log.iter().zip(second.log.iter()) {
        assert_eq!(a.sequence_no, b.sequence_no);
        assert_eq!(a.phase, b.phase);
        assert_eq!(a.stable_id, b.stable_id);
        assert_eq!(a.file_hash, b.file_hash);
        assert_eq!(a.manifest_hash, b.manifest_hash);
    }
    assert!(first.log.iter().all(|e| e.action == ImportAction::Created));
    assert!(second
        .log
        .iter()
        .all(|e| e.action == ImportAction::Skipped));
}

#[test]
fn test_summary_event_carries_manifest_hash_and_digest() {
    let (db, campaign) = quick_setup();
    let summary = db.import(&campaign, &starter_package()).expect("import");

    let events = db.events(&campaign);
    let summary_event = events
        .iter()
        .find(|e| e.event_type == "seed.import_completed")
        .expect("summary event");
    let obj = summary_event.payload.as_object().expect("object");
    assert_eq!(
        obj.get("manifest_hash").and_then(Value::as_str),
        Some(summary.manifest_hash.as_str())
    );
    assert_eq!(
        obj.get("state_digest").and_then(Value::as_str),
        Some(summary.state_digest.as_str())
    );
    let counts = obj
        .get("item_counts")
        .and_then(Value::as_object)
        .expect("counts");
    assert_eq!(counts.get("entities"), Some(&Value::Int(2)));
    assert_eq!(counts.get("chunks"), Some(&Value::Int(1)));
}
