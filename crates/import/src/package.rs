//! Package manifests and the package-reading boundary

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Manifest schema version this importer understands
pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

/// Package manifest
///
/// The `content_index` maps every content file path to the lowercase hex
/// SHA-256 of its bytes. A file not listed here is not part of the package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Stable identifier of the package
    pub package_id: String,
    /// Manifest schema version
    pub schema_version: u32,
    /// Ruleset version the package content targets
    pub ruleset_version: String,
    /// Per-file hash index, path → hex SHA-256
    pub content_index: BTreeMap<String, String>,
}

/// Errors from the package-reading boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackageError {
    /// A path listed in the manifest is not present in the package
    #[error("package file not found: {path}")]
    NotFound {
        /// The missing path
        path: String,
    },
}

/// Read access to one package's raw bytes
///
/// Implementations make no ordering promises; the importer imposes its own
/// deterministic order.
pub trait PackageSource: Send + Sync {
    /// Raw bytes of the manifest
    fn manifest_bytes(&self) -> Result<Vec<u8>, PackageError>;

    /// Paths of all content files, in no particular order
    fn paths(&self) -> Vec<String>;

    /// Raw bytes of one content file
    fn read(&self, path: &str) -> Result<Vec<u8>, PackageError>;
}

/// In-memory package, the reference [`PackageSource`]
#[derive(Debug, Clone, Default)]
pub struct MemoryPackage {
    manifest: Vec<u8>,
    files: HashMap<String, Vec<u8>>,
}

impl MemoryPackage {
    /// Create a package from manifest bytes
    pub fn new(manifest: impl Into<Vec<u8>>) -> Self {
        Self {
            manifest: manifest.into(),
            files: HashMap::new(),
        }
    }

    /// Add one content file
    pub fn with_file(mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), bytes.into());
        self
    }

    /// Replace one content file's bytes in place
    pub fn set_file(&mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), bytes.into());
    }
}

impl PackageSource for MemoryPackage {
    fn manifest_bytes(&self) -> Result<Vec<u8>, PackageError> {
        Ok(self.manifest.clone())
    }

    fn paths(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, PackageError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| PackageError::NotFound {
                path: path.to_string(),
            })
    }
}
