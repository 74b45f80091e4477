//! SHA-256 hashing over canonical encodings

use crate::encode::encode;
use crate::error::CanonError;
use chronicle_core::Value;
use sha2::{Digest, Sha256};

/// Hash raw bytes to a 32-byte digest
pub fn hash_bytes(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// Canonically encode a value and hash the result
///
/// Two values that are semantically equal (same logical content, any map
/// insertion order, any Unicode composition form) hash identically.
pub fn hash_value(value: &Value) -> Result<[u8; 32], CanonError> {
    Ok(hash_bytes(&encode(value)?))
}
