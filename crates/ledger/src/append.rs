//! The append path: envelope construction and persistence
//!
//! `Ledger::append` is the only way events come into existence. The sequence
//! is fixed:
//!
//! 1. Validate the payload (schema dispatch, canonical policy, size bound)
//! 2. Hash the canonical encoding
//! 3. Derive the idempotency key and return any prior event that carries it
//! 4. Check the caller's `expected_last_ordinal` against the chain tip
//! 5. Assign the next dense ordinal and persist exactly one row
//!
//! Steps 3 to 5 run under the campaign's writer lock, so the lookup, tip read,
//! and insert are atomic with respect to other appends for that campaign.

use crate::config::LedgerConfig;
use crate::idempotency::{derive_key, KeyParts};
use crate::schema;
use chronicle_canon::CanonError;
use chronicle_core::{
    AppendOutcome, CampaignId, EventRecord, OrdinalConflict, Value, GENESIS_EVENT_TYPE, ZERO_HASH,
};
use chronicle_storage::{EventStore, StoreError};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from the append path
///
/// All variants are validation or storage failures raised before or during
/// the single insert; an optimistic-concurrency miss is NOT an error (it is
/// [`AppendOutcome::Conflict`]).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppendError {
    /// The payload failed schema validation
    #[error("invalid payload: {reason}")]
    InvalidPayload {
        /// What was wrong with it
        reason: String,
    },

    /// The declared schema version has no validator
    #[error("unknown schema version {schema_version} (supported: {supported:?})")]
    UnknownSchemaVersion {
        /// The declared version
        schema_version: u16,
        /// Versions the dispatch table knows
        supported: Vec<u16>,
    },

    /// The canonical encoding exceeds the configured size bound
    #[error("payload of {size} bytes exceeds limit of {max}")]
    PayloadTooLarge {
        /// Canonical-encoded size
        size: usize,
        /// Configured bound
        max: usize,
    },

    /// The payload violated the canonical encoding policy
    #[error(transparent)]
    Canon(#[from] CanonError),

    /// The storage boundary refused the insert
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One logical append
#[derive(Debug, Clone, PartialEq)]
pub struct AppendRequest {
    /// Semantic kind of mutation
    pub event_type: String,
    /// Payload schema version
    pub schema_version: u16,
    /// Structured payload
    pub payload: Value,
    /// Tool that produced the write (part of the logical identity)
    pub tool_name: String,
    /// Ruleset version the tool ran under (part of the logical identity)
    pub ruleset_version: String,
    /// Acting party, correlation only
    pub actor_ref: Option<String>,
    /// Owning plan, part of the logical identity when present
    pub plan_ref: Option<String>,
    /// Execution attempt, correlation only, never part of the identity
    pub execution_ref: Option<String>,
    /// Optimistic-concurrency guard
    pub expected_last_ordinal: Option<u64>,
}

impl AppendRequest {
    /// A request with conservative defaults: schema v1, no correlation refs
    pub fn new(event_type: impl Into<String>, payload: Value) -> Self {
        Self {
            event_type: event_type.into(),
            schema_version: 1,
            payload,
            tool_name: "manual".to_string(),
            ruleset_version: "v0".to_string(),
            actor_ref: None,
            plan_ref: None,
            execution_ref: None,
            expected_last_ordinal: None,
        }
    }

    /// Set the tool name
    pub fn with_tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = tool_name.into();
        self
    }

    /// Set the ruleset version
    pub fn with_ruleset_version(mut self, ruleset_version: impl Into<String>) -> Self {
        self.ruleset_version = ruleset_version.into();
        self
    }

    /// Set the acting party
    pub fn with_actor_ref(mut self, actor_ref: impl Into<String>) -> Self {
        self.actor_ref = Some(actor_ref.into());
        self
    }

    /// Set the owning plan
    pub fn with_plan_ref(mut self, plan_ref: impl Into<String>) -> Self {
        self.plan_ref = Some(plan_ref.into());
        self
    }

    /// Set the execution attempt
    pub fn with_execution_ref(mut self, execution_ref: impl Into<String>) -> Self {
        self.execution_ref = Some(execution_ref.into());
        self
    }

    /// Guard the append against concurrent writers
    pub fn with_expected_last_ordinal(mut self, ordinal: u64) -> Self {
        self.expected_last_ordinal = Some(ordinal);
        self
    }

    /// Set the payload schema version
    pub fn with_schema_version(mut self, schema_version: u16) -> Self {
        self.schema_version = schema_version;
        self
    }
}

/// The envelope builder and append path
///
/// Owns the per-campaign writer locks; reads and writes go through the
/// [`EventStore`] it was constructed with.
pub struct Ledger {
    store: Arc<dyn EventStore>,
    config: LedgerConfig,
    write_locks: DashMap<CampaignId, Arc<Mutex<()>>>,
}

impl Ledger {
    /// Create a ledger over a store with the given configuration
    pub fn new(store: Arc<dyn EventStore>, config: LedgerConfig) -> Self {
        Self {
            store,
            config,
            write_locks: DashMap::new(),
        }
    }

    /// The store this ledger writes through
    pub fn store(&self) -> &Arc<dyn EventStore> {
        &self.store
    }

    /// The configuration this ledger was built with
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Append one event to a campaign's chain
    ///
    /// Returns [`AppendOutcome::Idempotent`] when a stored event already
    /// carries the derived key (a success path, not an error), and
    /// [`AppendOutcome::Conflict`] when `expected_last_ordinal` does not
    /// match the chain tip. Exactly one durable row is written for a
    /// [`AppendOutcome::Written`] result; nothing is written otherwise.
    pub fn append(
        &self,
        campaign_id: CampaignId,
        request: AppendRequest,
    ) -> Result<AppendOutcome, AppendError> {
        // Fail closed before any hashing or locking.
        schema::validate(request.schema_version, &request.payload)?;
        let canonical = chronicle_canon::encode_with_depth(
            &request.payload,
            self.config.max_nesting_depth,
        )?;
        if canonical.len() > self.config.max_payload_bytes {
            return Err(AppendError::PayloadTooLarge {
                size: canonical.len(),
                max: self.config.max_payload_bytes,
            });
        }

        let payload_hash = chronicle_canon::hash_bytes(&canonical);
        let idempotency_key = derive_key(&KeyParts {
            plan_ref: request.plan_ref.as_deref(),
            campaign_id: &campaign_id,
            event_type: &request.event_type,
            tool_name: &request.tool_name,
            ruleset_version: &request.ruleset_version,
            canonical_args: &canonical,
        });

        let lock = self
            .write_locks
            .entry(campaign_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock();

        if let Some(existing) = self
            .store
            .find_by_idempotency_key(&campaign_id, &idempotency_key)
        {
            debug!(
                campaign = %campaign_id,
                ordinal = existing.replay_ordinal,
                "append collapsed onto existing event"
            );
            return Ok(AppendOutcome::Idempotent(existing));
        }

        let tip = self.store.chain_tip(&campaign_id);
        let tip_ordinal = tip.map(|t| t.replay_ordinal).unwrap_or(0);
        if let Some(expected) = request.expected_last_ordinal {
            if expected != tip_ordinal {
                warn!(
                    campaign = %campaign_id,
                    expected,
                    actual = tip_ordinal,
                    "optimistic concurrency check failed"
                );
                return Ok(AppendOutcome::Conflict(OrdinalConflict {
                    expected,
                    actual: tip_ordinal,
                    chain_tip_hash: tip.map(|t| t.payload_hash).unwrap_or(ZERO_HASH),
                }));
            }
        }

        let event = EventRecord {
            campaign_id,
            replay_ordinal: tip_ordinal + 1,
            event_type: request.event_type,
            schema_version: request.schema_version,
            payload: request.payload,
            prev_event_hash: tip.map(|t| t.payload_hash).unwrap_or(ZERO_HASH),
            payload_hash,
            idempotency_key,
            actor_ref: request.actor_ref,
            plan_ref: request.plan_ref,
            execution_ref: request.execution_ref,
            recorded_at_ms: chrono::Utc::now().timestamp_millis(),
        };

        self.store.insert(event.clone())?;
        debug!(
            campaign = %campaign_id,
            ordinal = event.replay_ordinal,
            event_type = %event.event_type,
            "event appended"
        );
        Ok(AppendOutcome::Written(event))
    }

    /// Append the genesis event for a campaign
    ///
    /// Genesis carries an empty payload and the all-zero previous hash, and
    /// lands at ordinal 1. Calling this twice for one campaign collapses
    /// idempotently onto the first genesis.
    pub fn append_genesis(&self, campaign_id: CampaignId) -> Result<AppendOutcome, AppendError> {
        let request = AppendRequest::new(GENESIS_EVENT_TYPE, Value::empty_object())
            .with_tool_name("genesis");
        self.append(campaign_id, request)
    }
}
