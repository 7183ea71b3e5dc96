//! Configuration handles.
//!
//! # Data Flow
//! ```text
//! HandleRegistry::get_or_init(spec)     (init-once per identity)
//!     → ConfigHandle
//!         get_*(key, default)
//!             → KeyPath::parse (InvalidKey is the only error)
//!             → controller.refresh() (external files only)
//!             → resolve → convert → value or default
//! ```
//!
//! # Design Decisions
//! - Handles are explicit values; the process-wide registry is optional
//! - Lookup failures degrade to the default and a debug log line
//! - `get_strict` exists for callers that need exactness

pub mod registry;

use serde_json::Value;
use std::path::Path;
use std::sync::{mpsc, Arc};
use std::time::SystemTime;

use crate::accessors::{self, FromConfigValue};
use crate::document::{resolve, Document, KeyPath};
use crate::error::{ConfigError, ConfigResult};
use crate::loader::{Loader, SourceSpec};
use crate::observability::metrics;
use crate::reload::{ConfigWatcher, ReloadController, Snapshot};

pub use registry::HandleRegistry;

/// Typed lookup over the current snapshot of one configuration identity.
#[derive(Debug)]
pub struct ConfigHandle {
    controller: Arc<ReloadController>,
}

impl ConfigHandle {
    /// Load `spec` and build a handle. Load failures are returned as-is.
    pub fn open(spec: SourceSpec, loader: Loader) -> ConfigResult<Self> {
        let controller = ReloadController::initialize(spec, loader)?;
        Ok(Self {
            controller: Arc::new(controller),
        })
    }

    /// Current snapshot after a staleness check.
    fn current(&self) -> Arc<Snapshot> {
        self.controller.refresh();
        self.controller.snapshot()
    }

    /// Look up `key` and convert it, falling back to `default` when the key
    /// is absent, null, or does not convert.
    pub fn get<T: FromConfigValue>(&self, key: &str, default: T) -> ConfigResult<T> {
        let path = KeyPath::parse(key)?;
        let snapshot = self.current();
        let Some(value) = resolve(&snapshot.document, path) else {
            return Ok(default);
        };

        match accessors::convert::<T>(key, value) {
            Ok(converted) => Ok(converted),
            Err(e) => {
                tracing::debug!(key, error = %e, "Invalid configuration value, using default");
                metrics::record_conversion_failure(T::TARGET);
                Ok(default)
            }
        }
    }

    pub fn get_string(&self, key: &str, default: &str) -> ConfigResult<String> {
        self.get(key, default.to_string())
    }

    pub fn get_int(&self, key: &str, default: i32) -> ConfigResult<i32> {
        self.get(key, default)
    }

    pub fn get_long(&self, key: &str, default: i64) -> ConfigResult<i64> {
        self.get(key, default)
    }

    pub fn get_double(&self, key: &str, default: f64) -> ConfigResult<f64> {
        self.get(key, default)
    }

    /// `true`/`1` are true, anything else present is false.
    pub fn get_bool(&self, key: &str, default: bool) -> ConfigResult<bool> {
        self.get(key, default)
    }

    /// The string form of `key`, or `None` when absent.
    pub fn get_optional_string(&self, key: &str) -> ConfigResult<Option<String>> {
        match self.get_strict::<String>(key) {
            Err(e @ ConfigError::Conversion { .. }) => {
                tracing::debug!(key, error = %e, "Value has no string form");
                Ok(None)
            }
            other => other,
        }
    }

    /// Like [`get`](Self::get) but conversion failures are errors.
    pub fn get_strict<T: FromConfigValue>(&self, key: &str) -> ConfigResult<Option<T>> {
        let path = KeyPath::parse(key)?;
        let snapshot = self.current();
        resolve(&snapshot.document, path)
            .map(|value| accessors::convert::<T>(key, value))
            .transpose()
    }

    /// A copy of the subtree at `key`.
    pub fn node(&self, key: &str) -> ConfigResult<Option<Value>> {
        let path = KeyPath::parse(key)?;
        let snapshot = self.current();
        Ok(resolve(&snapshot.document, path).cloned())
    }

    /// True when `key` resolves to a non-null value.
    pub fn contains_key(&self, key: &str) -> ConfigResult<bool> {
        let path = KeyPath::parse(key)?;
        let snapshot = self.current();
        Ok(resolve(&snapshot.document, path).is_some())
    }

    /// Reload now, regardless of modification time.
    pub fn reload(&self) -> ConfigResult<()> {
        self.controller.reload()
    }

    /// The current document, for bulk inspection.
    pub fn document(&self) -> Arc<Document> {
        self.current().document.clone()
    }

    /// The current snapshot without a staleness check.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.controller.snapshot()
    }

    pub fn spec(&self) -> &SourceSpec {
        self.controller.spec()
    }

    /// The bound file, or `None` for located sources.
    pub fn config_file_path(&self) -> Option<&Path> {
        self.spec().external_path()
    }

    pub fn is_external(&self) -> bool {
        self.controller.is_watched()
    }

    /// Modification time the current snapshot was read at.
    pub fn last_modified(&self) -> Option<SystemTime> {
        self.controller.snapshot().modified
    }

    pub fn generation(&self) -> u64 {
        self.controller.snapshot().generation
    }

    /// Loader invocations since the handle was opened.
    pub fn load_count(&self) -> u64 {
        self.controller.load_count()
    }

    /// One-line summary of what this handle serves.
    pub fn describe(&self) -> String {
        let snapshot = self.controller.snapshot();
        let files: Vec<String> = snapshot
            .document
            .origin()
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        format!(
            "source={} files=[{}] keys={} generation={}",
            self.spec(),
            files.join(", "),
            snapshot.document.len(),
            snapshot.generation
        )
    }

    /// Start a push-mode watcher for the bound file.
    ///
    /// Keep the returned watcher alive for as long as updates are wanted.
    pub fn watch(&self) -> ConfigResult<(notify::RecommendedWatcher, mpsc::Receiver<Arc<Document>>)> {
        let (watcher, updates) = ConfigWatcher::new(self.controller.clone())?;
        Ok((watcher.run()?, updates))
    }
}
