//! Read-only hash-chain verification
//!
//! Walks a campaign's events in ascending ordinal order and checks every
//! tamper-evidence property the chain carries:
//!
//! - the first event is a well-formed genesis (ordinal 1, zero prev-hash)
//! - ordinals are dense
//! - each stored `payload_hash` matches the payload it sits next to
//! - each `prev_event_hash` matches the predecessor's `payload_hash`
//!
//! The first failed check halts the walk and is reported verbatim. Running
//! verification mutates nothing and is safe to repeat.

use chronicle_core::{CampaignId, ChainStatus, ChainTip, ZERO_HASH};
use chronicle_storage::EventStore;
use tracing::{debug, error};

/// Verify a campaign's hash chain
///
/// Returns [`ChainStatus::Valid`] with the chain tip on success, or the
/// first corruption found. A mismatch report means data corruption or
/// tampering; it must be surfaced to an operator, never retried away.
pub fn verify_chain(store: &dyn EventStore, campaign_id: &CampaignId) -> ChainStatus {
    let events = store.scan(campaign_id);
    if events.is_empty() {
        return ChainStatus::Empty;
    }

    let mut prev_payload_hash = ZERO_HASH;
    let mut expected_ordinal = 1u64;

    for event in &events {
        if event.replay_ordinal != expected_ordinal {
            error!(
                campaign = %campaign_id,
                expected = expected_ordinal,
                actual = event.replay_ordinal,
                "ordinal density violated"
            );
            return ChainStatus::OrdinalGap {
                expected: expected_ordinal,
                actual: event.replay_ordinal,
            };
        }

        if event.replay_ordinal == 1 && event.prev_event_hash != ZERO_HASH {
            error!(campaign = %campaign_id, "genesis carries a nonzero prev hash");
            return ChainStatus::BrokenGenesis {
                ordinal: event.replay_ordinal,
                actual_prev_hash: event.prev_event_hash,
            };
        }

        match chronicle_canon::hash_value(&event.payload) {
            Ok(computed) if computed == event.payload_hash => {}
            Ok(computed) => {
                error!(
                    campaign = %campaign_id,
                    ordinal = event.replay_ordinal,
                    "stored payload hash does not match payload"
                );
                return ChainStatus::PayloadMismatch {
                    ordinal: event.replay_ordinal,
                    stored: event.payload_hash,
                    computed,
                };
            }
            Err(_) => {
                // A stored payload that no longer canonically encodes can
                // only mean the row was altered after the fact.
                error!(
                    campaign = %campaign_id,
                    ordinal = event.replay_ordinal,
                    "stored payload is no longer canonically encodable"
                );
                return ChainStatus::PayloadMismatch {
                    ordinal: event.replay_ordinal,
                    stored: event.payload_hash,
                    computed: ZERO_HASH,
                };
            }
        }

        if event.replay_ordinal > 1 && event.prev_event_hash != prev_payload_hash {
            error!(
                campaign = %campaign_id,
                ordinal = event.replay_ordinal,
                "chain linkage broken"
            );
            return ChainStatus::Mismatch {
                ordinal: event.replay_ordinal,
                expected_prev_hash: prev_payload_hash,
                actual_prev_hash: event.prev_event_hash,
            };
        }

        prev_payload_hash = event.payload_hash;
        expected_ordinal += 1;
    }

    let tip = ChainTip {
        replay_ordinal: expected_ordinal - 1,
        payload_hash: prev_payload_hash,
    };
    debug!(
        campaign = %campaign_id,
        tip_ordinal = tip.replay_ordinal,
        "chain verified"
    );
    ChainStatus::Valid { tip }
}
