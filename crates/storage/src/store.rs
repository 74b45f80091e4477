//! Durable store trait and its error taxonomy

use chronicle_core::{CampaignId, ChainTip, EventRecord, IdempotencyKey};
use thiserror::Error;

/// Errors raised at the storage boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// An event with this `(campaign_id, replay_ordinal)` already exists
    #[error("duplicate ordinal {ordinal} for campaign {campaign_id}")]
    DuplicateOrdinal {
        /// Campaign being written
        campaign_id: CampaignId,
        /// The colliding ordinal
        ordinal: u64,
    },

    /// The ordinal would leave a gap in the chain
    ///
    /// A gap means a writer bypassed the single-writer discipline. This is
    /// fatal for the writer; the stored chain stays untouched.
    #[error("ordinal gap for campaign {campaign_id}: expected {expected}, got {actual}")]
    OrdinalGap {
        /// Campaign being written
        campaign_id: CampaignId,
        /// Next dense ordinal the store would accept
        expected: u64,
        /// Ordinal the writer tried to insert
        actual: u64,
    },

    /// An event with this `(campaign_id, idempotency_key)` already exists
    #[error("duplicate idempotency key {key} for campaign {campaign_id}")]
    DuplicateIdempotencyKey {
        /// Campaign being written
        campaign_id: CampaignId,
        /// The colliding key
        key: IdempotencyKey,
    },
}

/// Durable append-only store for campaign events
///
/// Implementations must be safe for concurrent readers; each read method
/// observes a consistent snapshot per call. The insert must be atomic: a
/// failed or cancelled insert leaves no partial event.
pub trait EventStore: Send + Sync {
    /// Current chain tip for a campaign, `None` if no events exist
    fn chain_tip(&self, campaign_id: &CampaignId) -> Option<ChainTip>;

    /// Insert one event, enforcing density and uniqueness constraints
    fn insert(&self, event: EventRecord) -> Result<(), StoreError>;

    /// Look up a prior event by its idempotency key
    fn find_by_idempotency_key(
        &self,
        campaign_id: &CampaignId,
        key: &IdempotencyKey,
    ) -> Option<EventRecord>;

    /// All events for a campaign in ascending `replay_ordinal` order
    ///
    /// Returns a snapshot: events inserted after the call returns are not
    /// reflected in the returned vector.
    fn scan(&self, campaign_id: &CampaignId) -> Vec<EventRecord>;

    /// Number of events stored for a campaign
    fn len(&self, campaign_id: &CampaignId) -> u64;

    /// Whether a campaign has no events
    fn is_empty(&self, campaign_id: &CampaignId) -> bool {
        self.len(campaign_id) == 0
    }
}
