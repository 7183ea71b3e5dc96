//! Dot-path resolution.
//!
//! # Design Decisions
//! - Missing segments resolve to `None`, never to an error
//! - Flat documents treat the whole key as one opaque name
//! - A literal `.` inside a tree key cannot be addressed (no escaping)
//! - Pure: no reload, no logging

use serde_json::Value;

use crate::document::{Document, DocumentKind};
use crate::error::{ConfigError, ConfigResult};

/// A validated, dot-separated key path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPath<'a> {
    raw: &'a str,
}

impl<'a> KeyPath<'a> {
    /// Validate a key. Empty or whitespace-only keys are rejected.
    pub fn parse(raw: &'a str) -> ConfigResult<Self> {
        if raw.trim().is_empty() {
            return Err(ConfigError::InvalidKey);
        }
        Ok(Self { raw })
    }

    pub fn as_str(&self) -> &'a str {
        self.raw
    }

    /// Segments in walk order.
    pub fn segments(&self) -> std::str::Split<'a, char> {
        self.raw.split('.')
    }
}

impl std::fmt::Display for KeyPath<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.raw)
    }
}

/// Resolve `path` against `doc`.
///
/// Returns `None` when any segment is missing, when a non-object is reached
/// before the last segment, or when the leaf is JSON `null`.
pub fn resolve<'d>(doc: &'d Document, path: KeyPath<'_>) -> Option<&'d Value> {
    let found = match doc.kind() {
        DocumentKind::Flat => doc.root().as_object()?.get(path.as_str()),
        DocumentKind::Tree => {
            let mut current = doc.root();
            for segment in path.segments() {
                current = current.as_object()?.get(segment)?;
            }
            Some(current)
        }
    };
    found.filter(|v| !v.is_null())
}
