//! Typed content-item definitions
//!
//! Content files are JSON documents holding any mix of the four item kinds.
//! Definitions convert to payload values for canonical hashing; a definition
//! smuggling a float in its attributes is rejected by the numeric policy at
//! hash time, path and all.

use chronicle_core::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The four importable item kinds, in phase order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemKind {
    /// A world entity (place, creature, faction, item)
    Entity,
    /// A relation between two entities
    Edge,
    /// An ontology tag or affordance
    Tag,
    /// A lore/content chunk
    Chunk,
}

impl ItemKind {
    /// Stable lowercase name used in logs and ordering
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Entity => "entity",
            ItemKind::Edge => "edge",
            ItemKind::Tag => "tag",
            ItemKind::Chunk => "chunk",
        }
    }

    /// Plural form used in summary counts
    pub fn plural(&self) -> &'static str {
        match self {
            ItemKind::Entity => "entities",
            ItemKind::Edge => "edges",
            ItemKind::Tag => "tags",
            ItemKind::Chunk => "chunks",
        }
    }

    /// Event type emitted when an item of this kind is accepted
    pub fn event_type(&self) -> &'static str {
        match self {
            ItemKind::Entity => "seed.entity_created",
            ItemKind::Edge => "seed.edge_created",
            ItemKind::Tag => "seed.tag_registered",
            ItemKind::Chunk => "seed.content_chunk_ingested",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A world entity definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDef {
    /// Stable identifier, unique across the campaign
    pub stable_id: String,
    /// Entity category (place, creature, faction, ...)
    pub category: String,
    /// Display name
    pub name: String,
    /// Free-form attributes (canonical policy applies)
    #[serde(default)]
    pub attributes: serde_json::Value,
}

/// A relation between two entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDef {
    /// Stable identifier, unique across the campaign
    pub stable_id: String,
    /// Source entity stable id
    pub src: String,
    /// Destination entity stable id
    pub dst: String,
    /// Relation label
    pub relation: String,
    /// Free-form attributes (canonical policy applies)
    #[serde(default)]
    pub attributes: serde_json::Value,
}

/// An ontology tag with its affordances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagDef {
    /// Stable identifier, unique across the campaign
    pub stable_id: String,
    /// Human-readable label
    pub label: String,
    /// Affordances granted by the tag
    #[serde(default)]
    pub affordances: Vec<String>,
}

/// A lore/content chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkDef {
    /// Stable identifier, unique across the campaign
    pub stable_id: String,
    /// Chunk title
    pub title: String,
    /// Chunk body text
    pub body: String,
    /// Tags referencing the ontology
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One content file: any mix of the four kinds
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContentFile {
    /// Entities defined in this file
    #[serde(default)]
    pub entities: Vec<EntityDef>,
    /// Edges defined in this file
    #[serde(default)]
    pub edges: Vec<EdgeDef>,
    /// Tags defined in this file
    #[serde(default)]
    pub tags: Vec<TagDef>,
    /// Chunks defined in this file
    #[serde(default)]
    pub chunks: Vec<ChunkDef>,
}

impl ContentFile {
    /// Total item count across all kinds
    pub fn item_count(&self) -> usize {
        self.entities.len() + self.edges.len() + self.tags.len() + self.chunks.len()
    }
}

/// The provenance block binding an imported item to its origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Originating package
    pub package_id: String,
    /// Path of the file the item was defined in
    pub source_path: String,
    /// Hex SHA-256 of that file's bytes
    pub file_hash: String,
}

impl Provenance {
    /// Render the provenance block as a payload value
    pub fn to_value(&self) -> Value {
        let mut map = HashMap::new();
        map.insert(
            "package_id".to_string(),
            Value::String(self.package_id.clone()),
        );
        map.insert(
            "source_path".to_string(),
            Value::String(self.source_path.clone()),
        );
        map.insert(
            "file_hash".to_string(),
            Value::String(self.file_hash.clone()),
        );
        Value::Object(map)
    }
}

/// Convert a serializable definition into a payload value
pub(crate) fn definition_value<T: Serialize>(def: &T) -> Result<Value, serde_json::Error> {
    Ok(Value::from_json(serde_json::to_value(def)?))
}
