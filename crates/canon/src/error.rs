//! Canonical-encoding error types

use thiserror::Error;

/// Errors produced while canonically encoding a value
///
/// All of these are validation failures: they are raised before any hashing
/// happens and leave no side effects. The `path` fields use a JSONPath-like
/// notation rooted at `$`, e.g. `$.stats.rolls[2]`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanonError {
    /// A float, NaN, or infinity was found in the value tree
    #[error("numeric policy violation at {path}: only 64-bit signed integers are encodable")]
    NumericPolicyViolation {
        /// Path of the offending value
        path: String,
    },

    /// Two object keys normalize to the same NFC form
    #[error("duplicate key after NFC normalization at {path}: {key:?}")]
    DuplicateKey {
        /// Path of the object holding the colliding keys
        path: String,
        /// The normalized key both inputs collapse to
        key: String,
    },

    /// The value tree nests deeper than the configured limit
    #[error("nesting depth exceeds {max} at {path}")]
    DepthExceeded {
        /// Path at which the limit was crossed
        path: String,
        /// The configured maximum depth
        max: usize,
    },
}
