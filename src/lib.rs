//! # Chronicle
//!
//! Deterministic, tamper-evident event ledger for campaign engines.
//!
//! Chronicle records every world mutation of a campaign as an immutable,
//! hash-chained event. Retried writes collapse onto one stored row, random
//! outcomes are reproducible from the campaign seed, and content packages
//! import deterministically: the same package always replays to the same
//! chain.
//!
//! ## Quick Start
//!
//! ```ignore
//! use chronicledb::prelude::*;
//!
//! let db = Chronicle::in_memory();
//! let campaign = db.create_campaign(CampaignSeed::from_bytes([7u8; 16]))?;
//!
//! // Append a mutation
//! let payload = Value::from_json(json!({"hp": 10}));
//! db.append(&campaign, AppendRequest::new("hero.damaged", payload))?;
//!
//! // Verify the chain end to end
//! assert!(db.verify(&campaign).is_ok());
//! ```
//!
//! ## Layers
//!
//! - [`Chronicle`] - the facade over campaign lifecycle, append, verify,
//!   import, and reproducible rolls
//! - [`chronicle_ledger`] - the append path, idempotency keys, RNG streams,
//!   and chain verification
//! - [`chronicle_import`] - the deterministic package importer
//! - [`chronicle_canon`] - the canonical encoder every hash is computed over
//! - [`chronicle_storage`] - the durable store boundary

#![warn(missing_docs)]

mod chronicle;
mod error;

pub mod prelude;

// Re-export main entry points
pub use chronicle::{Chronicle, ChronicleBuilder};
pub use error::{Error, Result};

// Re-export core types
pub use chronicle_core::{
    AppendOutcome, CampaignId, CampaignSeed, ChainStatus, ChainTip, EventRecord, IdempotencyKey,
    OrdinalConflict, Value, GENESIS_EVENT_TYPE, GENESIS_PAYLOAD_HASH, ZERO_HASH,
};

// Re-export the operational surface of the member crates
pub use chronicle_import::{
    ImportAction, ImportError, ImportLogEntry, ImportPhase, ImportSummary, Manifest,
    MemoryPackage, PackageSource, MANIFEST_SCHEMA_VERSION,
};
pub use chronicle_ledger::{
    AppendError, AppendRequest, DerivedStream, LedgerConfig, RollAudit,
};
