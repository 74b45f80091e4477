//! Unified error types for Chronicle.
//!
//! This module provides a clean error type that wraps the member crates'
//! errors and presents a consistent interface to users.

use chronicle_canon::CanonError;
use chronicle_core::CampaignId;
use chronicle_import::ImportError;
use chronicle_ledger::AppendError;
use chronicle_storage::StoreError;
use thiserror::Error;

/// All Chronicle errors.
///
/// Optimistic-concurrency misses and idempotent reuse are NOT errors; they
/// are [`crate::AppendOutcome`] variants. Everything here is either caller
/// input to fix or corruption to escalate.
#[derive(Debug, Error)]
pub enum Error {
    /// The campaign has not been created on this instance
    #[error("campaign not found: {0}")]
    CampaignNotFound(CampaignId),

    /// A campaign with this id already exists
    #[error("campaign already exists: {0}")]
    CampaignExists(CampaignId),

    /// A roll was requested over an empty range
    #[error("roll range must be nonzero")]
    InvalidRange,

    /// The append path rejected the write
    #[error(transparent)]
    Append(#[from] AppendError),

    /// The importer rejected the package
    #[error(transparent)]
    Import(#[from] ImportError),

    /// The storage boundary rejected the operation
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The canonical encoder rejected the value
    #[error(transparent)]
    Canon(#[from] CanonError),
}

/// Result type for Chronicle operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::CampaignNotFound(_))
    }

    /// Check if this error is recoverable by fixing the input and retrying.
    ///
    /// Storage constraint violations are not: they indicate a bypass of the
    /// single-writer discipline or corruption, and must reach an operator.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::Store(_))
    }
}
