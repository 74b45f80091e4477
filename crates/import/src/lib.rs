//! Deterministic package import for Chronicle campaigns
//!
//! A content package is an immutable, versioned bundle: a manifest with a
//! per-file hash index, plus JSON content files defining entities, edges,
//! ontology tags, and lore chunks. Importing a package seeds a campaign's
//! ledger with one event per accepted item, in an order that is a pure
//! function of the package contents, never of filesystem enumeration.
//!
//! Re-importing an unchanged package is a no-op: zero new events, identical
//! state digest.

#![warn(missing_docs)]

pub mod importer;
pub mod items;
pub mod package;

pub use importer::{
    import_package, ImportAction, ImportError, ImportLogEntry, ImportPhase, ImportSummary,
};
pub use items::{ChunkDef, ContentFile, EdgeDef, EntityDef, ItemKind, Provenance, TagDef};
pub use package::{Manifest, MemoryPackage, PackageError, PackageSource, MANIFEST_SCHEMA_VERSION};
