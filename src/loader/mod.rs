//! Source loading and merging.
//!
//! # Data Flow
//! ```text
//! SourceSpec::Properties { names }
//!     → locator finds each name (absent names are skipped)
//!     → properties.rs parses each file
//!     → merged key-for-key, later-declared name wins
//!     → Document::flat
//!
//! SourceSpec::Json { name } | SourceSpec::External { path }
//!     → one file, tree.rs (or properties.rs for `.properties` paths)
//!     → absent file synthesizes an empty document
//! ```
//!
//! # Design Decisions
//! - A parse failure aborts the whole load; nothing half-merged escapes
//! - Exactly one JSON root per spec; JSON roots are never merged

pub mod properties;
pub mod tree;

use serde_json::Map;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::document::Document;
use crate::error::{ConfigError, ConfigResult};
use crate::source::SourceLocator;

/// What to load. Doubles as the identity of a configuration handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceSpec {
    /// Property files found through the locator, merged in declared order.
    Properties { names: Vec<String> },
    /// A single JSON document found through the locator.
    Json { name: String },
    /// A file bound by path. `.properties` files load flat, anything else as JSON.
    External { path: PathBuf },
}

impl SourceSpec {
    pub fn properties<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SourceSpec::Properties {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn json(name: impl Into<String>) -> Self {
        SourceSpec::Json { name: name.into() }
    }

    pub fn external(path: impl Into<PathBuf>) -> Self {
        SourceSpec::External { path: path.into() }
    }

    /// The bound file, for external specs.
    pub fn external_path(&self) -> Option<&Path> {
        match self {
            SourceSpec::External { path } => Some(path),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceSpec::Properties { names } => write!(f, "properties[{}]", names.join(", ")),
            SourceSpec::Json { name } => write!(f, "json[{}]", name),
            SourceSpec::External { path } => write!(f, "external[{}]", path.display()),
        }
    }
}

fn is_properties_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("properties"))
        .unwrap_or(false)
}

fn read(path: &Path) -> ConfigResult<Vec<u8>> {
    fs::read(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })
}

/// Turns sources into documents.
#[derive(Debug, Clone, Default)]
pub struct Loader {
    locator: SourceLocator,
}

impl Loader {
    pub fn new(locator: SourceLocator) -> Self {
        Self { locator }
    }

    pub fn locator(&self) -> &SourceLocator {
        &self.locator
    }

    /// Load whatever `spec` describes.
    pub fn load(&self, spec: &SourceSpec) -> ConfigResult<Document> {
        match spec {
            SourceSpec::Properties { names } => self.load_properties(names),
            SourceSpec::Json { name } => self.load_json(name),
            SourceSpec::External { path } => self.load_file(path),
        }
    }

    /// Merge the named property files; later names override earlier keys.
    pub fn load_properties(&self, names: &[String]) -> ConfigResult<Document> {
        let mut merged = Map::new();
        let mut origin = Vec::new();

        for name in names {
            let Some(location) = self.locator.locate(name) else {
                tracing::warn!(source_name = %name, "Properties file not found, skipping");
                continue;
            };
            let text = properties::decode(&read(&location.path)?);
            let entries = properties::parse(name, &text)?;
            tracing::debug!(
                source_name = %name,
                path = %location.path.display(),
                keys = entries.len(),
                "Loaded properties"
            );
            for (key, value) in entries {
                merged.insert(key, value);
            }
            origin.push(location.path);
        }

        Ok(Document::flat(merged, origin))
    }

    /// Load one located JSON document, or an empty one when absent.
    pub fn load_json(&self, name: &str) -> ConfigResult<Document> {
        match self.locator.locate(name) {
            Some(location) => {
                let root = tree::parse(name, &read(&location.path)?)?;
                tracing::debug!(source_name = name, path = %location.path.display(), "Loaded JSON configuration");
                Ok(Document::tree(root, Some(location.path)))
            }
            None => {
                tracing::warn!(source_name = name, "JSON config file not found, using empty configuration");
                Ok(Document::empty_tree())
            }
        }
    }

    /// Load a bound file directly. A missing file yields an empty document.
    pub fn load_file(&self, path: &Path) -> ConfigResult<Document> {
        let flat = is_properties_path(path);
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "External config file not found, using empty configuration");
                return Ok(if flat {
                    Document::empty_flat()
                } else {
                    Document::empty_tree()
                });
            }
            Err(source) => {
                return Err(ConfigError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let source_name = path.display().to_string();
        let doc = if flat {
            let entries = properties::parse(&source_name, &properties::decode(&bytes))?;
            Document::flat(entries, vec![path.to_path_buf()])
        } else {
            Document::tree(tree::parse(&source_name, &bytes)?, Some(path.to_path_buf()))
        };
        tracing::debug!(path = %path.display(), "Loaded external configuration");
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{resolve, DocumentKind, KeyPath};
    use crate::source::ResourceRoot;
    use serde_json::json;

    fn value<'d>(doc: &'d Document, key: &str) -> Option<&'d serde_json::Value> {
        resolve(doc, KeyPath::parse(key).unwrap())
    }

    #[test]
    fn test_later_declared_properties_win() {
        let tmp = tempfile::tempdir().unwrap();
        // B sits in the higher-priority root but is declared second
        let first_root = tmp.path().join("first");
        let second_root = tmp.path().join("second");
        fs::create_dir_all(&first_root).unwrap();
        fs::create_dir_all(&second_root).unwrap();
        fs::write(first_root.join("b.properties"), "app.name=Beta\nb.only=1\n").unwrap();
        fs::write(second_root.join("a.properties"), "app.name=Alpha\na.only=1\n").unwrap();

        let loader = Loader::new(SourceLocator::new(
            vec![ResourceRoot::new(&first_root), ResourceRoot::new(&second_root)],
            Vec::new(),
        ));
        let doc = loader
            .load(&SourceSpec::properties(["a.properties", "b.properties"]))
            .unwrap();

        assert_eq!(doc.kind(), DocumentKind::Flat);
        assert_eq!(value(&doc, "app.name"), Some(&json!("Beta")));
        assert_eq!(value(&doc, "a.only"), Some(&json!("1")));
        assert_eq!(value(&doc, "b.only"), Some(&json!("1")));
        assert_eq!(
            doc.origin(),
            &[second_root.join("a.properties"), first_root.join("b.properties")]
        );
    }

    #[test]
    fn test_missing_properties_are_empty_sources() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("app.properties"), "x=1").unwrap();
        let loader = Loader::new(SourceLocator::new(Vec::new(), vec![tmp.path().to_path_buf()]));

        let doc = loader
            .load(&SourceSpec::properties(["db.properties", "app.properties"]))
            .unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(value(&doc, "x"), Some(&json!("1")));
    }

    #[test]
    fn test_parse_failure_aborts_merge() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("good.properties"), "x=1").unwrap();
        fs::write(tmp.path().join("bad.properties"), "y=\\uZZZZ").unwrap();
        let loader = Loader::new(SourceLocator::new(Vec::new(), vec![tmp.path().to_path_buf()]));

        let err = loader
            .load(&SourceSpec::properties(["good.properties", "bad.properties"]))
            .unwrap_err();
        assert_eq!(err.source_name().as_deref(), Some("bad.properties"));
    }

    #[test]
    fn test_absent_json_is_empty_object() {
        let loader = Loader::default();
        let doc = loader.load(&SourceSpec::json("config.json")).unwrap();
        assert_eq!(doc, Document::empty_tree());
    }

    #[test]
    fn test_external_file_formats() {
        let tmp = tempfile::tempdir().unwrap();
        let json_path = tmp.path().join("settings.json");
        let props_path = tmp.path().join("settings.properties");
        fs::write(&json_path, r#"{"database":{"pool":{"maxSize":10}}}"#).unwrap();
        fs::write(&props_path, "database.pool.maxSize=12").unwrap();

        let loader = Loader::default();
        let tree = loader.load(&SourceSpec::external(&json_path)).unwrap();
        assert_eq!(value(&tree, "database.pool.maxSize"), Some(&json!(10)));

        let flat = loader.load(&SourceSpec::external(&props_path)).unwrap();
        assert_eq!(flat.kind(), DocumentKind::Flat);
        assert_eq!(value(&flat, "database.pool.maxSize"), Some(&json!("12")));

        let missing = loader
            .load(&SourceSpec::external(tmp.path().join("nope.json")))
            .unwrap();
        assert!(missing.is_empty());
    }
}
