//! Canonical encoding for Chronicle payloads
//!
//! Every hash in the ledger is computed over the output of this crate, so the
//! encoding must be a pure function of the logical value: same value, same
//! bytes, on every platform, forever.
//!
//! ## Encoding rules
//!
//! - Object keys are NFC-normalized, then sorted by byte-wise lexicographic
//!   order, recursively
//! - Keys whose value is null are omitted from objects; arrays keep null
//!   elements positionally
//! - All strings (keys and values) are NFC-normalized before encoding
//! - Only signed 64-bit integers are admitted; any float, NaN, or infinity
//!   fails with a policy violation naming the offending path
//! - Booleans encode as the literals `true` / `false`
//! - Output is minimal JSON text: no whitespace, `,` and `:` separators
//!
//! Encoding has no side effects and consults no ambient state.

#![warn(missing_docs)]

pub mod encode;
pub mod error;
pub mod hash;

pub use encode::{encode, encode_with_depth, DEFAULT_MAX_DEPTH};
pub use error::CanonError;
pub use hash::{hash_bytes, hash_value};
