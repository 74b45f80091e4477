//! Reproducible pseudorandom streams
//!
//! Every random draw in a campaign is derived from the campaign's secret
//! 128-bit seed through an HKDF-SHA256 extract-and-expand, keyed by the
//! stream name, ruleset and tool versions, and the replay ordinal of the
//! event the draw belongs to. Identical inputs always reproduce the
//! identical roll sequence; no ambient randomness is consulted anywhere.
//!
//! Rolls and their inputs are meant to be recorded verbatim in the event
//! payload; [`RollAudit`] builds that payload fragment.

use byteorder::{BigEndian, WriteBytesExt};
use chronicle_core::{CampaignSeed, Value};
use hkdf::Hkdf;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::num::NonZeroU64;

/// Protocol tag fixed for the lifetime of the derivation scheme
pub const RNG_PROTOCOL_TAG: &[u8] = b"chronicle/rng/v1";

/// Derive the 32-byte base seed for one stream at one chain position
pub fn derive_base_seed(
    seed: &CampaignSeed,
    stream_name: &str,
    ruleset_version: &str,
    tool_version: &str,
    replay_ordinal: u64,
) -> [u8; 32] {
    let mut info = Vec::with_capacity(
        RNG_PROTOCOL_TAG.len()
            + ruleset_version.len()
            + tool_version.len()
            + stream_name.len()
            + 12,
    );
    info.extend_from_slice(RNG_PROTOCOL_TAG);
    info.push(0);
    info.extend_from_slice(ruleset_version.as_bytes());
    info.push(0);
    info.extend_from_slice(tool_version.as_bytes());
    info.push(0);
    info.extend_from_slice(stream_name.as_bytes());
    info.push(0);
    info.write_u64::<BigEndian>(replay_ordinal)
        .expect("writing to a Vec cannot fail");

    let hk = Hkdf::<Sha256>::new(None, seed.as_bytes());
    let mut okm = [0u8; 32];
    hk.expand(&info, &mut okm)
        .expect("32 bytes is a valid HKDF-SHA256 output length");
    okm
}

/// One derived stream, ready to produce rolls
///
/// A stream is a pure function of its derivation inputs; it holds no
/// position or other mutable state. Rolls are addressed by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedStream {
    base_seed: [u8; 32],
}

impl DerivedStream {
    /// Derive a stream from the campaign seed and its context labels
    pub fn derive(
        seed: &CampaignSeed,
        stream_name: &str,
        ruleset_version: &str,
        tool_version: &str,
        replay_ordinal: u64,
    ) -> Self {
        Self {
            base_seed: derive_base_seed(
                seed,
                stream_name,
                ruleset_version,
                tool_version,
                replay_ordinal,
            ),
        }
    }

    /// Build a stream directly from a base seed
    pub fn from_base_seed(base_seed: [u8; 32]) -> Self {
        Self { base_seed }
    }

    /// The stream's base seed
    pub fn base_seed(&self) -> &[u8; 32] {
        &self.base_seed
    }

    /// The roll at `index`, reduced into `0..range`
    pub fn roll(&self, index: u32, range: NonZeroU64) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update(self.base_seed);
        hasher.update(index.to_be_bytes());
        let digest = hasher.finalize();

        let mut wide = [0u8; 8];
        wide.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(wide) % range.get()
    }

    /// The roll at `index` mapped onto a die face, `1..=sides`
    pub fn roll_die(&self, index: u32, sides: NonZeroU64) -> u64 {
        self.roll(index, sides) + 1
    }
}

/// Verbatim record of one roll and the inputs that produced it
///
/// Embedded in event payloads so any reader can re-derive and audit the
/// draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollAudit {
    /// Stream name the roll came from
    pub stream_name: String,
    /// Ruleset version used in derivation
    pub ruleset_version: String,
    /// Tool version used in derivation
    pub tool_version: String,
    /// Replay ordinal the stream was derived at
    pub replay_ordinal: u64,
    /// Roll index within the stream
    pub index: u32,
    /// Range the roll was reduced into
    pub range: u64,
    /// The resulting value
    pub value: u64,
}

impl RollAudit {
    /// Render the audit record as a payload value
    pub fn to_value(&self) -> Value {
        let mut map = HashMap::new();
        map.insert(
            "stream".to_string(),
            Value::String(self.stream_name.clone()),
        );
        map.insert(
            "ruleset_version".to_string(),
            Value::String(self.ruleset_version.clone()),
        );
        map.insert(
            "tool_version".to_string(),
            Value::String(self.tool_version.clone()),
        );
        map.insert(
            "replay_ordinal".to_string(),
            Value::Int(self.replay_ordinal as i64),
        );
        map.insert("index".to_string(), Value::Int(self.index as i64));
        map.insert("range".to_string(), Value::Int(self.range as i64));
        map.insert("value".to_string(), Value::Int(self.value as i64));
        Value::Object(map)
    }
}
