//! Engine settings schema.
//!
//! Describes where configuration sources are searched and how the engine
//! itself logs. All types derive Serde traits for deserialization from TOML.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::loader::{Loader, SourceSpec};
use crate::observability::logging::LogFormat;
use crate::source::{ResourceRoot, SourceLocator};

/// Root settings for the resolution engine.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EngineSettings {
    /// Search roots and file names.
    pub sources: SourcesSettings,

    /// Logging settings for the CLI.
    pub logging: LoggingSettings,
}

/// Which flavour the standard-roots handle serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    #[default]
    Json,
    Properties,
}

/// Source discovery settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourcesSettings {
    /// Resource roots, most specific first.
    pub resource_roots: Vec<ResourceRootSettings>,

    /// Plain directories tried after every resource root.
    pub search_dirs: Vec<PathBuf>,

    /// Property files merged in this order (later wins).
    pub property_files: Vec<String>,

    /// The single JSON document name.
    pub json_file: String,

    pub mode: SourceMode,
}

impl Default for SourcesSettings {
    fn default() -> Self {
        Self {
            resource_roots: vec![ResourceRootSettings {
                dir: PathBuf::from("resources"),
                prefixes: vec![String::new(), "config/".to_string()],
            }],
            search_dirs: vec![PathBuf::from("."), PathBuf::from("config")],
            property_files: vec!["db.properties".to_string(), "app.properties".to_string()],
            json_file: "config.json".to_string(),
            mode: SourceMode::Json,
        }
    }
}

/// One resource root.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResourceRootSettings {
    pub dir: PathBuf,

    #[serde(default = "default_prefixes")]
    pub prefixes: Vec<String>,
}

fn default_prefixes() -> Vec<String> {
    vec![String::new()]
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub format: LogFormat,

    /// Filter used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::Compact,
            filter: "layered_config=info".to_string(),
        }
    }
}

impl EngineSettings {
    /// Build the locator these settings describe.
    pub fn locator(&self) -> SourceLocator {
        let roots = self
            .sources
            .resource_roots
            .iter()
            .map(|root| ResourceRoot::with_prefixes(&root.dir, root.prefixes.iter().cloned()))
            .collect();
        SourceLocator::new(roots, self.sources.search_dirs.clone())
    }

    pub fn loader(&self) -> Loader {
        Loader::new(self.locator())
    }

    /// Identity served for "standard roots, no argument".
    pub fn default_spec(&self) -> SourceSpec {
        match self.sources.mode {
            SourceMode::Json => SourceSpec::json(&self.sources.json_file),
            SourceMode::Properties => SourceSpec::properties(self.sources.property_files.iter().cloned()),
        }
    }
}
