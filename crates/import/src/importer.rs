//! The deterministic import pipeline
//!
//! Phases run in a fixed order: manifest validation → entities → edges →
//! tags → chunks → finalization. Within a phase, items are visited in the
//! lexicographic order of `(kind, stable_id, source_path)`, so repeated runs
//! on any platform replay the identical event sequence.
//!
//! Collision rule: a stable identifier may never be imported twice with two
//! different content hashes. Identical re-import is a counted no-op.

use crate::items::{definition_value, ContentFile, ItemKind, Provenance};
use crate::package::{Manifest, PackageError, PackageSource, MANIFEST_SCHEMA_VERSION};
use chronicle_canon::{hash_bytes, hash_value};
use chronicle_core::{hex, AppendOutcome, CampaignId, ChainTip, Value};
use chronicle_ledger::{AppendError, AppendRequest, Ledger};
use chronicle_storage::EventStore;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Import phases, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    /// Manifest and file-hash validation
    Manifest,
    /// Entity ingestion
    Entities,
    /// Edge ingestion
    Edges,
    /// Ontology tag ingestion
    Tags,
    /// Lore chunk ingestion
    Chunks,
    /// Summary event and state digest
    Finalize,
}

impl ImportPhase {
    fn for_kind(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Entity => ImportPhase::Entities,
            ItemKind::Edge => ImportPhase::Edges,
            ItemKind::Tag => ImportPhase::Tags,
            ItemKind::Chunk => ImportPhase::Chunks,
        }
    }

    /// Stable lowercase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportPhase::Manifest => "manifest",
            ImportPhase::Entities => "entities",
            ImportPhase::Edges => "edges",
            ImportPhase::Tags => "tags",
            ImportPhase::Chunks => "chunks",
            ImportPhase::Finalize => "finalize",
        }
    }
}

impl std::fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the importer did with one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportAction {
    /// A seed event was appended
    Created,
    /// The item already existed with an identical content hash
    Skipped,
}

/// One audit record of one deterministic import action
///
/// Created during import, never mutated. The full log proves replay
/// stability: two imports of the same package produce identical logs up to
/// the created/skipped flip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportLogEntry {
    /// Position in this import run, starting at 1
    pub sequence_no: u64,
    /// Phase the action happened in
    pub phase: ImportPhase,
    /// Item kind, or `import` for the finalization record
    pub object_type: String,
    /// Stable identifier the action concerned
    pub stable_id: String,
    /// Hex SHA-256 of the originating file
    pub file_hash: String,
    /// What was done
    pub action: ImportAction,
    /// Hex SHA-256 of the manifest bytes
    pub manifest_hash: String,
}

/// Aggregate result of one import run
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSummary {
    /// Package that was imported
    pub package_id: String,
    /// Hex SHA-256 of the manifest bytes
    pub manifest_hash: String,
    /// Digest over the sorted set of `(stable_id, content_hash)` pairs
    pub state_digest: String,
    /// Items that produced a new seed event
    pub created: u64,
    /// Items skipped as idempotent no-ops
    pub skipped: u64,
    /// Events appended by this run, including the summary event
    pub events_appended: u64,
    /// The audit log, one entry per item plus the finalization record
    pub log: Vec<ImportLogEntry>,
    /// Chain tip after the run
    pub chain_tip: Option<ChainTip>,
}

/// Errors aborting an import
///
/// A collision aborts the phase it happened in; events committed by earlier
/// phases remain valid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImportError {
    /// The manifest failed validation
    #[error("manifest rejected: {reason}")]
    ManifestRejected {
        /// What was wrong with it
        reason: String,
    },

    /// A file listed in the manifest is missing from the package
    #[error("file listed in manifest is missing: {path}")]
    MissingFile {
        /// The missing path
        path: String,
    },

    /// The package contains a file the manifest does not list
    #[error("file not listed in manifest: {path}")]
    UnindexedFile {
        /// The unlisted path
        path: String,
    },

    /// A file's bytes do not hash to the manifest's entry
    #[error("file hash mismatch for {path}: manifest {expected}, actual {actual}")]
    FileHashMismatch {
        /// The offending path
        path: String,
        /// Hash recorded in the manifest
        expected: String,
        /// Hash of the bytes actually read
        actual: String,
    },

    /// A content file failed to parse
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// The offending path
        path: String,
        /// Parser diagnostic
        message: String,
    },

    /// A definition could not be canonically encoded
    #[error("invalid definition {stable_id} in {path}: {reason}")]
    InvalidDefinition {
        /// The offending item
        stable_id: String,
        /// The file it came from
        path: String,
        /// What was wrong with it
        reason: String,
    },

    /// Same stable identifier, different content hash
    #[error(
        "content collision in {phase} phase on {stable_id}: existing {existing}, incoming {incoming}"
    )]
    Collision {
        /// Phase that was aborted
        phase: ImportPhase,
        /// The conflicting identifier
        stable_id: String,
        /// Content hash already bound to the identifier
        existing: String,
        /// Content hash of the incoming definition
        incoming: String,
    },

    /// The package-reading boundary failed
    #[error(transparent)]
    Package(#[from] PackageError),

    /// The ledger refused a seed event
    #[error(transparent)]
    Append(#[from] AppendError),
}

/// One item staged for import, after parsing and hashing
struct StagedItem {
    kind: ItemKind,
    stable_id: String,
    source_path: String,
    file_hash: String,
    definition: Value,
    content_hash: String,
}

/// Import a content package into a campaign
///
/// Emits one seed event per newly-accepted item and one summary event, all
/// through the ledger's append path (so every seed event is itself
/// idempotent and chained). Re-running on an unchanged package appends
/// nothing and reproduces the identical state digest.
pub fn import_package(
    ledger: &Ledger,
    campaign_id: CampaignId,
    source: &dyn PackageSource,
) -> Result<ImportSummary, ImportError> {
    // Phase: manifest
    let manifest_bytes = source.manifest_bytes()?;
    let manifest = parse_manifest(&manifest_bytes)?;
    let manifest_hash = hex(&hash_bytes(&manifest_bytes));
    check_file_inventory(&manifest, source)?;
    info!(
        package = %manifest.package_id,
        files = manifest.content_index.len(),
        "manifest validated"
    );

    let staged = stage_items(&manifest, source)?;
    let total_by_kind = count_by_kind(&staged);

    // Registry of every stable id already bound in this campaign, from prior
    // seed events; updated as this run accepts items.
    let mut registry = fold_registry(ledger, &campaign_id);

    let plan_ref = format!("import/{}", manifest.package_id);
    let mut log: Vec<ImportLogEntry> = Vec::with_capacity(staged.len() + 1);
    let mut sequence_no = 0u64;
    let mut created = 0u64;
    let mut skipped = 0u64;
    let mut events_appended = 0u64;

    for kind in [ItemKind::Entity, ItemKind::Edge, ItemKind::Tag, ItemKind::Chunk] {
        let phase = ImportPhase::for_kind(kind);
        let mut phase_log: Vec<ImportLogEntry> = Vec::new();

        for item in staged.iter().filter(|i| i.kind == kind) {
            sequence_no += 1;

            if let Some(existing) = registry.get(&item.stable_id) {
                if *existing != item.content_hash {
                    warn!(
                        phase = %phase,
                        stable_id = %item.stable_id,
                        "content collision, aborting phase"
                    );
                    return Err(ImportError::Collision {
                        phase,
                        stable_id: item.stable_id.clone(),
                        existing: existing.clone(),
                        incoming: item.content_hash.clone(),
                    });
                }
                debug!(phase = %phase, stable_id = %item.stable_id, "identical item skipped");
                skipped += 1;
                phase_log.push(log_entry(sequence_no, phase, item, ImportAction::Skipped, &manifest_hash));
                continue;
            }

            let payload = seed_payload(&manifest, item);
            let request = AppendRequest::new(kind.event_type(), payload)
                .with_tool_name("package_import")
                .with_ruleset_version(manifest.ruleset_version.clone())
                .with_actor_ref("importer")
                .with_plan_ref(plan_ref.clone());
            let outcome = ledger.append(campaign_id, request)?;

            let action = match outcome {
                AppendOutcome::Written(_) => {
                    events_appended += 1;
                    created += 1;
                    ImportAction::Created
                }
                AppendOutcome::Idempotent(_) => {
                    skipped += 1;
                    ImportAction::Skipped
                }
                AppendOutcome::Conflict(_) => {
                    // Seed appends carry no expected ordinal, so the append
                    // path cannot report a conflict for them.
                    unreachable!("seed appends do not use optimistic concurrency")
                }
            };
            registry.insert(item.stable_id.clone(), item.content_hash.clone());
            phase_log.push(log_entry(sequence_no, phase, item, action, &manifest_hash));
        }

        // The phase completed; its log segment becomes visible as a whole.
        log.append(&mut phase_log);
        debug!(phase = %phase, "phase committed");
    }

    // Phase: finalize
    let state_digest = state_digest(&registry);
    let summary_payload = summary_payload(&manifest, &manifest_hash, &state_digest, &total_by_kind);
    let outcome = ledger.append(
        campaign_id,
        AppendRequest::new("seed.import_completed", summary_payload)
            .with_tool_name("package_import")
            .with_ruleset_version(manifest.ruleset_version.clone())
            .with_actor_ref("importer")
            .with_plan_ref(plan_ref),
    )?;
    sequence_no += 1;
    let summary_action = if outcome.is_written() {
        events_appended += 1;
        ImportAction::Created
    } else {
        ImportAction::Skipped
    };
    log.push(ImportLogEntry {
        sequence_no,
        phase: ImportPhase::Finalize,
        object_type: "import".to_string(),
        stable_id: manifest.package_id.clone(),
        file_hash: manifest_hash.clone(),
        action: summary_action,
        manifest_hash: manifest_hash.clone(),
    });

    info!(
        package = %manifest.package_id,
        created,
        skipped,
        events_appended,
        "import finished"
    );
    Ok(ImportSummary {
        package_id: manifest.package_id,
        manifest_hash,
        state_digest,
        created,
        skipped,
        events_appended,
        log,
        chain_tip: ledger.store().chain_tip(&campaign_id),
    })
}

fn parse_manifest(bytes: &[u8]) -> Result<Manifest, ImportError> {
    let manifest: Manifest =
        serde_json::from_slice(bytes).map_err(|e| ImportError::ManifestRejected {
            reason: e.to_string(),
        })?;
    if manifest.package_id.is_empty() {
        return Err(ImportError::ManifestRejected {
            reason: "package_id must not be empty".to_string(),
        });
    }
    if manifest.schema_version != MANIFEST_SCHEMA_VERSION {
        return Err(ImportError::ManifestRejected {
            reason: format!(
                "unsupported schema version {} (supported: {})",
                manifest.schema_version, MANIFEST_SCHEMA_VERSION
            ),
        });
    }
    Ok(manifest)
}

/// Every indexed file must exist, and every package file must be indexed
fn check_file_inventory(
    manifest: &Manifest,
    source: &dyn PackageSource,
) -> Result<(), ImportError> {
    let mut package_paths = source.paths();
    package_paths.sort();
    for path in &package_paths {
        if !manifest.content_index.contains_key(path) {
            return Err(ImportError::UnindexedFile { path: path.clone() });
        }
    }
    for path in manifest.content_index.keys() {
        if !package_paths.iter().any(|p| p == path) {
            return Err(ImportError::MissingFile { path: path.clone() });
        }
    }
    Ok(())
}

/// Read, hash-check, parse, and stage every item, sorted for replay
fn stage_items(
    manifest: &Manifest,
    source: &dyn PackageSource,
) -> Result<Vec<StagedItem>, ImportError> {
    let mut staged: Vec<StagedItem> = Vec::new();

    // BTreeMap iteration gives a deterministic file order; the final sort
    // below is what the replay guarantee actually rests on.
    for (path, expected_hex) in &manifest.content_index {
        let bytes = source.read(path)?;
        let actual_hex = hex(&hash_bytes(&bytes));
        if actual_hex != *expected_hex {
            return Err(ImportError::FileHashMismatch {
                path: path.clone(),
                expected: expected_hex.clone(),
                actual: actual_hex,
            });
        }

        let file: ContentFile =
            serde_json::from_slice(&bytes).map_err(|e| ImportError::Parse {
                path: path.clone(),
                message: e.to_string(),
            })?;

        stage_kind(&mut staged, ItemKind::Entity, path, &actual_hex, &file.entities)?;
        stage_kind(&mut staged, ItemKind::Edge, path, &actual_hex, &file.edges)?;
        stage_kind(&mut staged, ItemKind::Tag, path, &actual_hex, &file.tags)?;
        stage_kind(&mut staged, ItemKind::Chunk, path, &actual_hex, &file.chunks)?;
    }

    staged.sort_by(|a, b| {
        (a.kind, &a.stable_id, &a.source_path).cmp(&(b.kind, &b.stable_id, &b.source_path))
    });
    Ok(staged)
}

fn stage_kind<T: serde::Serialize + HasStableId>(
    staged: &mut Vec<StagedItem>,
    kind: ItemKind,
    path: &str,
    file_hash: &str,
    defs: &[T],
) -> Result<(), ImportError> {
    for def in defs {
        let definition =
            definition_value(def).map_err(|e| ImportError::InvalidDefinition {
                stable_id: def.stable_id().to_string(),
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        let content_hash =
            hash_value(&definition).map_err(|e| ImportError::InvalidDefinition {
                stable_id: def.stable_id().to_string(),
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        staged.push(StagedItem {
            kind,
            stable_id: def.stable_id().to_string(),
            source_path: path.to_string(),
            file_hash: file_hash.to_string(),
            definition,
            content_hash: hex(&content_hash),
        });
    }
    Ok(())
}

/// Fold prior seed events into a stable-id → content-hash registry
fn fold_registry(ledger: &Ledger, campaign_id: &CampaignId) -> BTreeMap<String, String> {
    let mut registry = BTreeMap::new();
    for event in ledger.store().scan(campaign_id) {
        if !event.event_type.starts_with("seed.") || event.event_type == "seed.import_completed" {
            continue;
        }
        let Some(obj) = event.payload.as_object() else {
            continue;
        };
        let (Some(stable_id), Some(content_hash)) = (
            obj.get("stable_id").and_then(Value::as_str),
            obj.get("content_hash").and_then(Value::as_str),
        ) else {
            continue;
        };
        registry.insert(stable_id.to_string(), content_hash.to_string());
    }
    registry
}

fn seed_payload(manifest: &Manifest, item: &StagedItem) -> Value {
    let provenance = Provenance {
        package_id: manifest.package_id.clone(),
        source_path: item.source_path.clone(),
        file_hash: item.file_hash.clone(),
    };
    let mut map = HashMap::new();
    map.insert(
        "stable_id".to_string(),
        Value::String(item.stable_id.clone()),
    );
    map.insert(
        "content_hash".to_string(),
        Value::String(item.content_hash.clone()),
    );
    map.insert("definition".to_string(), item.definition.clone());
    map.insert("provenance".to_string(), provenance.to_value());
    Value::Object(map)
}

/// The summary payload holds only run-stable fields, so a re-import derives
/// the same idempotency key and collapses onto the first summary event.
fn summary_payload(
    manifest: &Manifest,
    manifest_hash: &str,
    state_digest: &str,
    totals: &BTreeMap<ItemKind, u64>,
) -> Value {
    let mut counts = HashMap::new();
    for (kind, n) in totals {
        counts.insert(kind.plural().to_string(), Value::Int(*n as i64));
    }
    let mut map = HashMap::new();
    map.insert(
        "package_id".to_string(),
        Value::String(manifest.package_id.clone()),
    );
    map.insert(
        "manifest_hash".to_string(),
        Value::String(manifest_hash.to_string()),
    );
    map.insert(
        "state_digest".to_string(),
        Value::String(state_digest.to_string()),
    );
    map.insert("item_counts".to_string(), Value::Object(counts));
    Value::Object(map)
}

fn count_by_kind(staged: &[StagedItem]) -> BTreeMap<ItemKind, u64> {
    let mut totals = BTreeMap::new();
    for kind in [ItemKind::Entity, ItemKind::Edge, ItemKind::Tag, ItemKind::Chunk] {
        totals.insert(kind, staged.iter().filter(|i| i.kind == kind).count() as u64);
    }
    totals
}

/// Digest over the sorted set of derived identifiers and their content hashes
fn state_digest(registry: &BTreeMap<String, String>) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    for (stable_id, content_hash) in registry {
        hasher.update(stable_id.as_bytes());
        hasher.update([0u8]);
        hasher.update(content_hash.as_bytes());
        hasher.update([1u8]);
    }
    hex(&hasher.finalize())
}

fn log_entry(
    sequence_no: u64,
    phase: ImportPhase,
    item: &StagedItem,
    action: ImportAction,
    manifest_hash: &str,
) -> ImportLogEntry {
    ImportLogEntry {
        sequence_no,
        phase,
        object_type: item.kind.as_str().to_string(),
        stable_id: item.stable_id.clone(),
        file_hash: item.file_hash.clone(),
        action,
        manifest_hash: manifest_hash.to_string(),
    }
}

/// Access to the stable id shared by all definition types
trait HasStableId {
    fn stable_id(&self) -> &str;
}

impl HasStableId for crate::items::EntityDef {
    fn stable_id(&self) -> &str {
        &self.stable_id
    }
}

impl HasStableId for crate::items::EdgeDef {
    fn stable_id(&self) -> &str {
        &self.stable_id
    }
}

impl HasStableId for crate::items::TagDef {
    fn stable_id(&self) -> &str {
        &self.stable_id
    }
}

impl HasStableId for crate::items::ChunkDef {
    fn stable_id(&self) -> &str {
        &self.stable_id
    }
}
