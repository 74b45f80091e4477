//! Ledger engine for Chronicle
//!
//! This crate implements the mutation path of the campaign event ledger:
//! - [`Ledger`]: the append path (envelope construction, idempotent reuse,
//!   optimistic concurrency, dense ordinal assignment)
//! - [`idempotency`]: derived keys collapsing retried writes
//! - [`rng`]: reproducible pseudorandom streams keyed by the campaign seed
//! - [`verify`]: read-only hash-chain verification
//!
//! ## Single-writer discipline
//!
//! All appends for one campaign are serialized through a per-campaign lock,
//! so ordinal assignment and the idempotency lookup are atomic with the
//! insert. Readers never take that lock.

#![warn(missing_docs)]

pub mod append;
pub mod config;
pub mod idempotency;
pub mod rng;
pub mod schema;
pub mod verify;

pub use append::{AppendError, AppendRequest, Ledger};
pub use config::LedgerConfig;
pub use idempotency::{derive_key, KeyParts};
pub use rng::{derive_base_seed, DerivedStream, RollAudit, RNG_PROTOCOL_TAG};
pub use verify::verify_chain;
