//! Main entry point for Chronicle.
//!
//! This module provides the [`Chronicle`] struct, the facade over campaign
//! lifecycle, the append path, chain verification, package import, and
//! reproducible rolls.

use crate::error::{Error, Result};
use chronicle_core::{
    AppendOutcome, CampaignId, CampaignSeed, ChainStatus, ChainTip, EventRecord,
};
use chronicle_import::{ImportSummary, PackageSource};
use chronicle_ledger::{verify_chain, AppendRequest, DerivedStream, Ledger, LedgerConfig};
use chronicle_storage::{EventStore, MemoryEventStore};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::Arc;

/// The Chronicle ledger.
///
/// This is the main entry point. Create one with [`Chronicle::in_memory`] or
/// [`Chronicle::builder`], then create campaigns and append events.
///
/// # Example
///
/// ```ignore
/// use chronicledb::prelude::*;
///
/// let db = Chronicle::in_memory();
/// let campaign = db.create_campaign(CampaignSeed::from_bytes([7u8; 16]))?;
/// db.append(&campaign, AppendRequest::new("hero.damaged", payload))?;
/// ```
pub struct Chronicle {
    ledger: Arc<Ledger>,
    campaigns: RwLock<HashMap<CampaignId, CampaignSeed>>,
}

impl Chronicle {
    /// Create an in-memory ledger with default configuration.
    ///
    /// All data is lost when the value is dropped. Use this for tests,
    /// tooling, and as the reference wiring for a durable store.
    pub fn in_memory() -> Self {
        Self::builder().open()
    }

    /// Create a builder for ledger configuration.
    pub fn builder() -> ChronicleBuilder {
        ChronicleBuilder::default()
    }

    fn from_parts(store: Arc<dyn EventStore>, config: LedgerConfig) -> Self {
        Self {
            ledger: Arc::new(Ledger::new(store, config)),
            campaigns: RwLock::new(HashMap::new()),
        }
    }

    // =========================================================================
    // Campaign lifecycle
    // =========================================================================

    /// Create a new campaign with a fresh random id.
    ///
    /// Registers the secret seed and appends the genesis event at ordinal 1.
    pub fn create_campaign(&self, seed: CampaignSeed) -> Result<CampaignId> {
        let campaign_id = CampaignId::new();
        self.create_campaign_with_id(campaign_id, seed)?;
        Ok(campaign_id)
    }

    /// Create a campaign with a caller-chosen id.
    pub fn create_campaign_with_id(
        &self,
        campaign_id: CampaignId,
        seed: CampaignSeed,
    ) -> Result<()> {
        {
            let mut campaigns = self.campaigns.write();
            if campaigns.contains_key(&campaign_id) {
                return Err(Error::CampaignExists(campaign_id));
            }
            campaigns.insert(campaign_id, seed);
        }
        self.ledger.append_genesis(campaign_id)?;
        Ok(())
    }

    /// Whether a campaign exists on this instance.
    pub fn campaign_exists(&self, campaign_id: &CampaignId) -> bool {
        self.campaigns.read().contains_key(campaign_id)
    }

    fn seed_for(&self, campaign_id: &CampaignId) -> Result<CampaignSeed> {
        self.campaigns
            .read()
            .get(campaign_id)
            .copied()
            .ok_or(Error::CampaignNotFound(*campaign_id))
    }

    // =========================================================================
    // Ledger operations
    // =========================================================================

    /// Append one event to a campaign's chain.
    ///
    /// See [`AppendOutcome`] for the three ways this can succeed.
    pub fn append(
        &self,
        campaign_id: &CampaignId,
        request: AppendRequest,
    ) -> Result<AppendOutcome> {
        self.seed_for(campaign_id)?;
        Ok(self.ledger.append(*campaign_id, request)?)
    }

    /// Verify a campaign's hash chain end to end.
    ///
    /// Read-only and safe to run repeatedly.
    pub fn verify(&self, campaign_id: &CampaignId) -> ChainStatus {
        verify_chain(self.ledger.store().as_ref(), campaign_id)
    }

    /// Import a content package, seeding the campaign's ledger.
    pub fn import(
        &self,
        campaign_id: &CampaignId,
        source: &dyn PackageSource,
    ) -> Result<ImportSummary> {
        self.seed_for(campaign_id)?;
        Ok(chronicle_import::import_package(
            &self.ledger,
            *campaign_id,
            source,
        )?)
    }

    // =========================================================================
    // Reproducible randomness
    // =========================================================================

    /// Derive the roll stream for one tool invocation at one chain position.
    pub fn stream(
        &self,
        campaign_id: &CampaignId,
        stream_name: &str,
        ruleset_version: &str,
        tool_version: &str,
        replay_ordinal: u64,
    ) -> Result<DerivedStream> {
        let seed = self.seed_for(campaign_id)?;
        Ok(DerivedStream::derive(
            &seed,
            stream_name,
            ruleset_version,
            tool_version,
            replay_ordinal,
        ))
    }

    /// One reproducible roll, reduced into `0..range`.
    #[allow(clippy::too_many_arguments)]
    pub fn roll(
        &self,
        campaign_id: &CampaignId,
        stream_name: &str,
        ruleset_version: &str,
        tool_version: &str,
        replay_ordinal: u64,
        index: u32,
        range: u64,
    ) -> Result<u64> {
        let range = NonZeroU64::new(range).ok_or(Error::InvalidRange)?;
        let stream = self.stream(
            campaign_id,
            stream_name,
            ruleset_version,
            tool_version,
            replay_ordinal,
        )?;
        Ok(stream.roll(index, range))
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// All events for a campaign in ascending ordinal order (snapshot).
    pub fn events(&self, campaign_id: &CampaignId) -> Vec<EventRecord> {
        self.ledger.store().scan(campaign_id)
    }

    /// Current chain tip, `None` for an eventless campaign.
    pub fn chain_tip(&self, campaign_id: &CampaignId) -> Option<ChainTip> {
        self.ledger.store().chain_tip(campaign_id)
    }

    /// Number of events in a campaign's chain.
    pub fn len(&self, campaign_id: &CampaignId) -> u64 {
        self.ledger.store().len(campaign_id)
    }

    /// Whether a campaign's chain is empty.
    pub fn is_empty(&self, campaign_id: &CampaignId) -> bool {
        self.len(campaign_id) == 0
    }
}

/// Builder for [`Chronicle`] configuration.
///
/// # Example
///
/// ```ignore
/// let db = Chronicle::builder()
///     .max_payload_bytes(64 * 1024)
///     .open();
/// ```
#[derive(Debug, Default)]
pub struct ChronicleBuilder {
    config: LedgerConfig,
}

impl ChronicleBuilder {
    /// Replace the whole ledger configuration.
    pub fn config(mut self, config: LedgerConfig) -> Self {
        self.config = config;
        self
    }

    /// Bound the canonical-encoded payload size.
    pub fn max_payload_bytes(mut self, bytes: usize) -> Self {
        self.config.max_payload_bytes = bytes;
        self
    }

    /// Bound payload nesting depth.
    pub fn max_nesting_depth(mut self, depth: usize) -> Self {
        self.config.max_nesting_depth = depth;
        self
    }

    /// Open an in-memory ledger with this configuration.
    pub fn open(self) -> Chronicle {
        Chronicle::from_parts(Arc::new(MemoryEventStore::new()), self.config)
    }

    /// Open a ledger over a caller-provided store.
    pub fn open_with_store(self, store: Arc<dyn EventStore>) -> Chronicle {
        Chronicle::from_parts(store, self.config)
    }
}
