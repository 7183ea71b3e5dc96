//! Error types for configuration resolution.
//!
//! Only two failures ever reach a caller of the lookup API: an invalid key
//! (usage error, any call) and a load failure while a handle is first built.
//! Everything else degrades to defaults with a log line.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while locating, loading, or reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Empty or whitespace-only key path.
    #[error("configuration key cannot be null or empty")]
    InvalidKey,

    /// A located source could not be read.
    #[error("cannot read configuration source {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed properties content.
    #[error("failed to parse {source_name} at line {line}: {message}")]
    Parse {
        source_name: String,
        line: usize,
        message: String,
    },

    /// Malformed JSON content.
    #[error("failed to parse JSON source {source_name}: {source}")]
    Json {
        source_name: String,
        #[source]
        source: serde_json::Error,
    },

    /// A present value did not convert to the requested type (strict mode only).
    #[error("invalid {target} value for key '{key}': {raw}")]
    Conversion {
        key: String,
        raw: String,
        target: &'static str,
    },

    /// Engine settings file problems.
    #[error("settings error: {0}")]
    Settings(#[from] crate::settings::SettingsError),

    /// Watching was requested for a configuration with no bound file.
    #[error("{0} is not bound to a file")]
    Unbound(String),

    /// File watcher could not be installed.
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),
}

impl ConfigError {
    /// Name of the source this error refers to, if any.
    pub fn source_name(&self) -> Option<String> {
        match self {
            ConfigError::Unreadable { path, .. } => Some(path.display().to_string()),
            ConfigError::Parse { source_name, .. } | ConfigError::Json { source_name, .. } => {
                Some(source_name.clone())
            }
            _ => None,
        }
    }
}
