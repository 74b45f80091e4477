//! In-memory reference implementation of the event store

use crate::store::{EventStore, StoreError};
use chronicle_core::{CampaignId, ChainTip, EventRecord, IdempotencyKey};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// Per-campaign log segment
#[derive(Debug, Default)]
struct CampaignLog {
    /// Events in ordinal order; index i holds ordinal i + 1
    events: Vec<EventRecord>,
    /// Idempotency-key index into `events`
    by_key: HashMap<IdempotencyKey, usize>,
}

/// In-memory event store
///
/// Reference implementation of [`EventStore`] backed by an RwLock-guarded map
/// of per-campaign logs. Scans clone the campaign's events so every read sees
/// a consistent snapshot.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    campaigns: RwLock<HashMap<CampaignId, CampaignLog>>,
}

impl MemoryEventStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of campaigns holding at least one event
    pub fn campaign_count(&self) -> usize {
        self.campaigns.read().len()
    }

    /// Overwrite one stored event in place, bypassing every constraint.
    ///
    /// Exists so corruption tests can simulate tampering with persisted rows.
    #[doc(hidden)]
    pub fn corrupt_event_for_test(
        &self,
        campaign_id: &CampaignId,
        replay_ordinal: u64,
        mutate: impl FnOnce(&mut EventRecord),
    ) -> bool {
        let mut campaigns = self.campaigns.write();
        let Some(log) = campaigns.get_mut(campaign_id) else {
            return false;
        };
        let Some(index) = replay_ordinal.checked_sub(1) else {
            return false;
        };
        match log.events.get_mut(index as usize) {
            Some(event) => {
                mutate(event);
                true
            }
            None => false,
        }
    }
}

impl EventStore for MemoryEventStore {
    fn chain_tip(&self, campaign_id: &CampaignId) -> Option<ChainTip> {
        let campaigns = self.campaigns.read();
        let last = campaigns.get(campaign_id)?.events.last()?;
        Some(ChainTip {
            replay_ordinal: last.replay_ordinal,
            payload_hash: last.payload_hash,
        })
    }

    fn insert(&self, event: EventRecord) -> Result<(), StoreError> {
        let mut campaigns = self.campaigns.write();
        let log = campaigns.entry(event.campaign_id).or_default();

        let next = log.events.len() as u64 + 1;
        if event.replay_ordinal < next {
            return Err(StoreError::DuplicateOrdinal {
                campaign_id: event.campaign_id,
                ordinal: event.replay_ordinal,
            });
        }
        if event.replay_ordinal > next {
            return Err(StoreError::OrdinalGap {
                campaign_id: event.campaign_id,
                expected: next,
                actual: event.replay_ordinal,
            });
        }
        if log.by_key.contains_key(&event.idempotency_key) {
            return Err(StoreError::DuplicateIdempotencyKey {
                campaign_id: event.campaign_id,
                key: event.idempotency_key,
            });
        }

        debug!(
            campaign = %event.campaign_id,
            ordinal = event.replay_ordinal,
            event_type = %event.event_type,
            "event persisted"
        );
        log.by_key.insert(event.idempotency_key, log.events.len());
        log.events.push(event);
        Ok(())
    }

    fn find_by_idempotency_key(
        &self,
        campaign_id: &CampaignId,
        key: &IdempotencyKey,
    ) -> Option<EventRecord> {
        let campaigns = self.campaigns.read();
        let log = campaigns.get(campaign_id)?;
        log.by_key.get(key).map(|&i| log.events[i].clone())
    }

    fn scan(&self, campaign_id: &CampaignId) -> Vec<EventRecord> {
        let campaigns = self.campaigns.read();
        campaigns
            .get(campaign_id)
            .map(|log| log.events.clone())
            .unwrap_or_default()
    }

    fn len(&self, campaign_id: &CampaignId) -> u64 {
        let campaigns = self.campaigns.read();
        campaigns
            .get(campaign_id)
            .map(|log| log.events.len() as u64)
            .unwrap_or(0)
    }
}
