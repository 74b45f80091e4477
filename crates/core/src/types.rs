//! Identifier types for the Chronicle ledger
//!
//! - [`CampaignId`]: owning scope for one event chain
//! - [`CampaignSeed`]: the 128-bit secret established at campaign genesis
//! - [`IdempotencyKey`]: derived key collapsing retried writes

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a campaign
///
/// A campaign is the ownership scope of one event chain. It is used in:
/// - Chain-tip lookups and dense ordinal assignment
/// - Storage uniqueness constraints
/// - Idempotency-key derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct CampaignId(Uuid);

impl CampaignId {
    /// Create a new random CampaignId using UUID v4
    pub fn new() -> Self {
        CampaignId(Uuid::new_v4())
    }

    /// Create CampaignId from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        CampaignId(Uuid::from_bytes(bytes))
    }

    /// Get raw bytes representation
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for CampaignId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CampaignId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 128-bit secret seed established once per campaign at genesis
///
/// Every reproducible random draw in the campaign is derived from this seed.
/// The seed itself never appears in an event payload.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignSeed([u8; 16]);

impl CampaignSeed {
    /// Create a seed from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        CampaignSeed(bytes)
    }

    /// Get raw bytes representation
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

// Debug deliberately omits the seed material.
impl std::fmt::Debug for CampaignSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CampaignSeed(..)")
    }
}

/// Derived 16-byte key guaranteeing at-most-one persisted row per logical write
///
/// Two appends with the same logical identity derive the same key; the storage
/// boundary enforces `(campaign_id, idempotency_key)` uniqueness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdempotencyKey([u8; 16]);

impl IdempotencyKey {
    /// Create a key from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        IdempotencyKey(bytes)
    }

    /// Get raw bytes representation
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl std::fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex(&self.0))
    }
}

/// Render bytes as lowercase hex
pub fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
