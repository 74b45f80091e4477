//! Convenient imports for Chronicle.
//!
//! This module re-exports the most commonly used types so you can get
//! started with a single import:
//!
//! ```ignore
//! use chronicledb::prelude::*;
//!
//! let db = Chronicle::in_memory();
//! let campaign = db.create_campaign(CampaignSeed::from_bytes([7u8; 16]))?;
//! ```

// Main entry point
pub use crate::chronicle::{Chronicle, ChronicleBuilder};

// Error handling
pub use crate::error::{Error, Result};

// Ledger operations
pub use chronicle_core::{AppendOutcome, ChainStatus, ChainTip, EventRecord, OrdinalConflict};
pub use chronicle_ledger::{AppendRequest, DerivedStream, LedgerConfig, RollAudit};

// Core types
pub use chronicle_core::{CampaignId, CampaignSeed, IdempotencyKey, Value};

// Import pipeline
pub use chronicle_import::{ImportSummary, Manifest, MemoryPackage, PackageSource};

// Re-export serde_json for convenience
pub use serde_json::json;
