//! Ledger configuration
//!
//! All behavior toggles live here, passed in at construction. Defaults are
//! the conservative settings; there is no ambient or dynamic configuration.

/// Configuration for the append path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Upper bound on the canonical-encoded payload size in bytes
    pub max_payload_bytes: usize,
    /// Upper bound on payload nesting depth
    pub max_nesting_depth: usize,
}

impl LedgerConfig {
    /// Conservative defaults: 256 KiB payloads, 64 levels of nesting
    pub fn new() -> Self {
        Self {
            max_payload_bytes: 256 * 1024,
            max_nesting_depth: chronicle_canon::DEFAULT_MAX_DEPTH,
        }
    }

    /// Override the payload size bound
    pub fn with_max_payload_bytes(mut self, bytes: usize) -> Self {
        self.max_payload_bytes = bytes;
        self
    }

    /// Override the nesting depth bound
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::new()
    }
}
