//! Idempotency-key derivation
//!
//! A key identifies one LOGICAL write. Retrying the same logical write
//! (same plan, campaign, event type, tool, ruleset, and canonical arguments)
//! derives the same key, and the storage uniqueness constraint collapses the
//! retries onto one stored event.
//!
//! Volatile fields are deliberately excluded: `replay_ordinal` changes when
//! the chain advances between retries and `execution_ref` changes per
//! attempt, so including either would defeat retry collapse.
//!
//! ## Framing
//!
//! Each component is framed as `label || u32-be length || bytes` so that no
//! concatenation of two inputs can be confused with another ("ab","c" vs
//! "a","bc"). An absent optional component is framed as `label || 0xFFFFFFFF`
//! with no value bytes: "absent" and "present but empty" never collide.

use byteorder::{BigEndian, WriteBytesExt};
use chronicle_core::{CampaignId, IdempotencyKey};
use sha2::{Digest, Sha256};

/// Domain-separation tag mixed into every key derivation
const KEY_DOMAIN_TAG: &[u8] = b"chronicle/idem/v1";

/// Length marker framing an absent optional component
const ABSENT: u32 = u32::MAX;

/// The logical identity of one write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyParts<'a> {
    /// Owning plan, when the write belongs to one
    pub plan_ref: Option<&'a str>,
    /// Owning campaign
    pub campaign_id: &'a CampaignId,
    /// Semantic kind of mutation
    pub event_type: &'a str,
    /// Tool that produced the write
    pub tool_name: &'a str,
    /// Ruleset version the tool ran under
    pub ruleset_version: &'a str,
    /// Canonical-encoded arguments of the write
    pub canonical_args: &'a [u8],
}

/// Derive the 16-byte idempotency key for a logical write
pub fn derive_key(parts: &KeyParts<'_>) -> IdempotencyKey {
    let mut buf = Vec::with_capacity(128 + parts.canonical_args.len());
    frame_opt(&mut buf, b"plan", parts.plan_ref.map(str::as_bytes));
    frame(&mut buf, b"campaign", parts.campaign_id.as_bytes());
    frame(&mut buf, b"etype", parts.event_type.as_bytes());
    frame(&mut buf, b"tool", parts.tool_name.as_bytes());
    frame(&mut buf, b"ruleset", parts.ruleset_version.as_bytes());
    frame(&mut buf, b"args", parts.canonical_args);

    let mut hasher = Sha256::new();
    hasher.update(KEY_DOMAIN_TAG);
    hasher.update(&buf);
    let digest = hasher.finalize();

    let mut key = [0u8; 16];
    key.copy_from_slice(&digest[..16]);
    IdempotencyKey::from_bytes(key)
}

fn frame(buf: &mut Vec<u8>, label: &[u8], value: &[u8]) {
    buf.extend_from_slice(label);
    buf.write_u32::<BigEndian>(value.len() as u32)
        .expect("writing to a Vec cannot fail");
    buf.extend_from_slice(value);
}

fn frame_opt(buf: &mut Vec<u8>, label: &[u8], value: Option<&[u8]>) {
    match value {
        Some(v) => frame(buf, label, v),
        None => {
            buf.extend_from_slice(label);
            buf.write_u32::<BigEndian>(ABSENT)
                .expect("writing to a Vec cannot fail");
        }
    }
}
