//! Event types for the append-only campaign ledger
//!
//! Events are immutable records in an append-only, hash-chained log. Each
//! event links to its predecessor through `prev_event_hash`, giving the chain
//! tamper-evidence: altering any persisted payload or hash breaks every link
//! after it.

use crate::types::{hex, CampaignId, IdempotencyKey};
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// The all-zero hash used as `prev_event_hash` of a genesis event.
pub const ZERO_HASH: [u8; 32] = [0u8; 32];

/// Event type tag carried by every genesis event.
pub const GENESIS_EVENT_TYPE: &str = "campaign.genesis";

/// Published payload hash of the genesis event.
///
/// The genesis payload is the empty object, whose canonical encoding is the
/// two bytes `{}`. This constant is fixed across implementations; any drift
/// here means the canonical encoder has changed and must fail CI.
pub const GENESIS_PAYLOAD_HASH: [u8; 32] = [
    0x44, 0x13, 0x6f, 0xa3, 0x55, 0xb3, 0x67, 0x8a,
    0x11, 0x46, 0xad, 0x16, 0xf7, 0xe8, 0x64, 0x9e,
    0x94, 0xfb, 0x4f, 0xc2, 0x1f, 0xe7, 0x7e, 0x83,
    0x10, 0xc0, 0x60, 0xf6, 0x1c, 0xaa, 0xff, 0x8a,
];

/// An event in the campaign ledger
///
/// Created exactly once at append time, never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventRecord {
    /// Owning campaign
    pub campaign_id: CampaignId,
    /// Dense, gap-free, strictly increasing ordinal (genesis is 1)
    pub replay_ordinal: u64,
    /// Semantic kind of mutation (user-defined category)
    pub event_type: String,
    /// Payload schema version, for evolution without rewriting history
    pub schema_version: u16,
    /// Canonical structured payload
    pub payload: Value,
    /// Payload hash of the previous event (all-zero for genesis)
    pub prev_event_hash: [u8; 32],
    /// Hash of the canonical-encoded payload
    pub payload_hash: [u8; 32],
    /// Derived key collapsing retried writes
    pub idempotency_key: IdempotencyKey,
    /// Optional correlation: acting party (not hashed)
    pub actor_ref: Option<String>,
    /// Optional correlation: owning plan (not hashed)
    pub plan_ref: Option<String>,
    /// Optional correlation: execution attempt (not hashed)
    pub execution_ref: Option<String>,
    /// Wall-clock append time in milliseconds since epoch (not hashed)
    pub recorded_at_ms: i64,
}

impl EventRecord {
    /// Whether this record is a genesis event
    pub fn is_genesis(&self) -> bool {
        self.replay_ordinal == 1 && self.prev_event_hash == ZERO_HASH
    }
}

/// Position of the last event in a campaign's chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainTip {
    /// Ordinal of the last event
    pub replay_ordinal: u64,
    /// Payload hash of the last event
    pub payload_hash: [u8; 32],
}

/// Optimistic-concurrency rejection
///
/// Returned when a caller supplied `expected_last_ordinal` and the actual
/// chain tip had moved. This is normal control flow: the caller re-fetches
/// and decides whether to retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrdinalConflict {
    /// Ordinal the caller expected the chain tip to be at
    pub expected: u64,
    /// Ordinal the chain tip was actually at
    pub actual: u64,
    /// Payload hash of the actual chain tip
    pub chain_tip_hash: [u8; 32],
}

/// Outcome of an append call
///
/// All three cases are successes at the transport level; only `Written`
/// persisted a new row.
#[derive(Debug, Clone, PartialEq)]
pub enum AppendOutcome {
    /// A new event was persisted
    Written(EventRecord),
    /// A prior event with the same idempotency key was returned unchanged
    Idempotent(EventRecord),
    /// The optimistic-concurrency check failed; nothing was written
    Conflict(OrdinalConflict),
}

impl AppendOutcome {
    /// The persisted event, for the two success-with-row cases
    pub fn event(&self) -> Option<&EventRecord> {
        match self {
            AppendOutcome::Written(e) | AppendOutcome::Idempotent(e) => Some(e),
            AppendOutcome::Conflict(_) => None,
        }
    }

    /// Whether a new row was persisted by this call
    pub fn is_written(&self) -> bool {
        matches!(self, AppendOutcome::Written(_))
    }
}

/// Result of walking a campaign's hash chain
///
/// Corruption reports are values, not panics: a mismatch is surfaced to the
/// operator verbatim and must never be silently retried or auto-repaired.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainStatus {
    /// Every link checked out; the tip is the last event's position
    Valid {
        /// The verified chain tip
        tip: ChainTip,
    },
    /// The campaign has no events
    Empty,
    /// The first event is not a well-formed genesis
    BrokenGenesis {
        /// Ordinal of the first stored event
        ordinal: u64,
        /// Its stored `prev_event_hash`
        actual_prev_hash: [u8; 32],
    },
    /// An event's `prev_event_hash` does not match its predecessor
    Mismatch {
        /// Ordinal of the offending event
        ordinal: u64,
        /// The predecessor's payload hash
        expected_prev_hash: [u8; 32],
        /// The stored `prev_event_hash`
        actual_prev_hash: [u8; 32],
    },
    /// A stored `payload_hash` does not match the payload it sits next to
    PayloadMismatch {
        /// Ordinal of the offending event
        ordinal: u64,
        /// The stored hash
        stored: [u8; 32],
        /// The hash recomputed from the payload
        computed: [u8; 32],
    },
    /// Ordinals are not dense
    OrdinalGap {
        /// Ordinal that should have come next
        expected: u64,
        /// Ordinal actually found
        actual: u64,
    },
}

impl ChainStatus {
    /// Whether the chain verified clean (`Valid` or `Empty`)
    pub fn is_ok(&self) -> bool {
        matches!(self, ChainStatus::Valid { .. } | ChainStatus::Empty)
    }
}

impl std::fmt::Display for ChainStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainStatus::Valid { tip } => {
                write!(
                    f,
                    "valid chain, tip ordinal {} hash {}",
                    tip.replay_ordinal,
                    hex(&tip.payload_hash)
                )
            }
            ChainStatus::Empty => write!(f, "empty chain"),
            ChainStatus::BrokenGenesis {
                ordinal,
                actual_prev_hash,
            } => write!(
                f,
                "broken genesis at ordinal {}: prev hash {}",
                ordinal,
                hex(actual_prev_hash)
            ),
            ChainStatus::Mismatch {
                ordinal,
                expected_prev_hash,
                actual_prev_hash,
            } => write!(
                f,
                "chain mismatch at ordinal {}: expected prev {}, found {}",
                ordinal,
                hex(expected_prev_hash),
                hex(actual_prev_hash)
            ),
            ChainStatus::PayloadMismatch {
                ordinal,
                stored,
                computed,
            } => write!(
                f,
                "payload hash mismatch at ordinal {}: stored {}, computed {}",
                ordinal,
                hex(stored),
                hex(computed)
            ),
            ChainStatus::OrdinalGap { expected, actual } => {
                write!(f, "ordinal gap: expected {}, found {}", expected, actual)
            }
        }
    }
}
