//! Collision detection
//!
//! A stable identifier may never be bound to two different content hashes.
//! The offending phase aborts and reports both hashes; events committed by
//! earlier phases remain valid.

use crate::*;
use chronicledb::ImportPhase;

#[test]
fn test_conflicting_entity_aborts_entities_phase() {
    let (db, campaign) = quick_setup();
    db.import(&campaign, &starter_package()).expect("first import");
    let len_before = db.len(&campaign);

    let altered = package_of(
        "starter-isles-v2",
        &[(
            "entities/core.json",
            br#"{"entities": [
                {"stable_id": "loc.harbor", "category": "place", "name": "Renamed Harbor"}
            ]}"#,
        )],
    );

    let err = db.import(&campaign, &altered).unwrap_err();
    match err {
        chronicledb::Error::Import(chronicledb::ImportError::Collision {
            phase,
            stable_id,
            existing,
            incoming,
        }) => {
            assert_eq!(phase, ImportPhase::Entities);
            assert_eq!(stable_id, "loc.harbor");
            assert_ne!(existing, incoming);
            assert_eq!(existing.len(), 64, "hashes are surfaced as hex digests");
            assert_eq!(incoming.len(), 64);
        }
        other => panic!("expected collision, got {:?}", other),
    }
    assert_eq!(db.len(&campaign), len_before, "no partial event");
}

#[test]
fn test_earlier_phases_survive_a_later_collision() {
    let (db, campaign) = quick_setup();
    db.import(&campaign, &starter_package()).expect("first import");

    // New entity is fine; the edge redefines an existing stable id
    let mixed = package_of(
        "expansion",
        &[(
            "content/expansion.json",
            br#"{
                "entities": [
                    {"stable_id": "loc.lighthouse", "category": "place", "name": "The Lighthouse"}
                ],
                "edges": [
                    {"stable_id": "edge.keeper-at-harbor", "src": "npc.keeper",
                     "dst": "loc.lighthouse", "relation": "resides_in"}
                ]
            }"#,
        )],
    );

    let err = db.import(&campaign, &mixed).unwrap_err();
    assert!(matches!(
        err,
        chronicledb::Error::Import(chronicledb::ImportError::Collision {
            phase: ImportPhase::Edges,
            ..
        })
    ));

    // The entity accepted before the edge collision is committed and valid
    let events = db.events(&campaign);
    assert!(events.iter().any(|e| {
        e.event_type == "seed.entity_created"
            && e.payload
                .as_object()
                .and_then(|o| o.get("stable_id"))
                .and_then(Value::as_str)
                == Some("loc.lighthouse")
    }));
    assert!(db.verify(&campaign).is_ok());
}

#[test]
fn test_collision_within_one_package() {
    let (db, campaign) = quick_setup();

    // The same stable id defined twice with different content, in two files
    let package = package_of(
        "self-conflicting",
        &[
            (
                "a.json",
                br#"{"entities": [
                    {"stable_id": "npc.twin", "category": "creature", "name": "First Twin"}
                ]}"#,
            ),
            (
                "b.json",
                br#"{"entities": [
                    {"stable_id": "npc.twin", "category": "creature", "name": "Second Twin"}
                ]}"#,
            ),
        ],
    );

    let err = db.import(&campaign, &package).unwrap_err();
    assert!(matches!(
        err,
        chronicledb::Error::Import(chronicledb::ImportError::Collision { .. })
    ));
}

#[test]
fn test_identical_duplicate_within_package_is_skipped() {
    let (db, campaign) = quick_setup();

    let def = br#"{"entities": [
        {"stable_id": "npc.twin", "category": "creature", "name": "The Twin"}
    ]}"#;
    let package = package_of("duplicated", &[("a.json", def), ("b.json", def)]);

    let summary = db.import(&campaign, &package).expect("import");
    assert_eq!(summary.created, 1);
    assert_eq!(summary.skipped, 1);
}

#[test]
fn test_reimport_after_collision_of_clean_package_still_works() {
    let (db, campaign) = quick_setup();
    db.import(&campaign, &starter_package()).expect("first");

    let altered = package_of(
        "starter-isles-v2",
        &[(
            "entities/core.json",
            br#"{"entities": [
                {"stable_id": "loc.harbor", "category": "place", "name": "Renamed Harbor"}
            ]}"#,
        )],
    );
    db.import(&campaign, &altered).unwrap_err();

    // The original package still replays cleanly
    let again = db.import(&campaign, &starter_package()).expect("replay");
    assert_eq!(again.events_appended, 0);
    assert!(db.verify(&campaign).is_ok());
}
