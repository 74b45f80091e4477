//! Core types for the Chronicle ledger
//!
//! This crate defines the fundamental types shared by every layer:
//! - [`Value`]: the structured payload model
//! - [`CampaignId`], [`CampaignSeed`], [`IdempotencyKey`]: identifiers
//! - [`EventRecord`]: the atomic, immutable unit of the ledger
//! - [`ChainTip`], [`ChainStatus`]: chain positions and verification reports

#![warn(missing_docs)]

pub mod event;
pub mod types;
pub mod value;

pub use event::{
    AppendOutcome, ChainStatus, ChainTip, EventRecord, OrdinalConflict, GENESIS_EVENT_TYPE,
    GENESIS_PAYLOAD_HASH, ZERO_HASH,
};
pub use types::{hex, CampaignId, CampaignSeed, IdempotencyKey};
pub use value::Value;
