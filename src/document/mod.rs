//! Document model.
//!
//! # Data Flow
//! ```text
//! properties files ─┐
//!                   ├→ loader → Document (immutable) → Arc<Document> in a Snapshot
//! JSON document ────┘                         ↓
//!                                  path::resolve(doc, key)
//! ```
//!
//! # Design Decisions
//! - One type for both shapes; `DocumentKind` decides how keys resolve
//! - Tree values reuse `serde_json::Value` (ordered objects via `preserve_order`)
//! - Flat documents hold only string values
//! - Never mutated after construction; reload builds a new one

pub mod path;

use serde_json::{Map, Value};
use std::path::PathBuf;

pub use path::{resolve, KeyPath};

/// Shape of a parsed configuration source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Properties-style: one level, string values only.
    Flat,
    /// JSON-style: arbitrary nesting, heterogeneous leaves.
    Tree,
}

/// An immutable snapshot of one logical configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    kind: DocumentKind,
    root: Value,
    origin: Vec<PathBuf>,
}

impl Document {
    /// Build a flat document from already-merged entries.
    pub fn flat(entries: Map<String, Value>, origin: Vec<PathBuf>) -> Self {
        debug_assert!(entries.values().all(Value::is_string));
        Self {
            kind: DocumentKind::Flat,
            root: Value::Object(entries),
            origin,
        }
    }

    /// Wrap a parsed JSON tree.
    pub fn tree(root: Value, origin: Option<PathBuf>) -> Self {
        Self {
            kind: DocumentKind::Tree,
            root,
            origin: origin.into_iter().collect(),
        }
    }

    /// The empty object used when a JSON source is absent.
    pub fn empty_tree() -> Self {
        Self::tree(Value::Object(Map::new()), None)
    }

    /// An empty flat mapping.
    pub fn empty_flat() -> Self {
        Self::flat(Map::new(), Vec::new())
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Raw root of the document, for bulk inspection.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Files this document was built from, in merge order.
    pub fn origin(&self) -> &[PathBuf] {
        &self.origin
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        match &self.root {
            Value::Object(map) => map.len(),
            Value::Array(items) => items.len(),
            Value::Null => 0,
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Top-level entries in document order.
    ///
    /// For a flat document these are all properties; for a tree they are the
    /// members of the root object (empty when the root is not an object).
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.root
            .as_object()
            .into_iter()
            .flat_map(|map| map.iter().map(|(k, v)| (k.as_str(), v)))
    }
}
