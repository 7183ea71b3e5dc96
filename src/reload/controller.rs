//! Staleness detection and atomic snapshot publication.
//!
//! # States
//! - Loaded: a snapshot is published, readers use it lock-free
//! - Stale-check: compare the bound file's mtime to the snapshot baseline
//! - Reloaded: a fresh snapshot replaced the old one in a single store
//!
//! # State Transitions
//! ```text
//! (new)       → Loaded: initial load, baseline recorded
//! Loaded      → Stale-check: every read of an external configuration
//! Stale-check → Loaded: mtime unchanged, file missing, or reload failed
//! Stale-check → Reloaded → Loaded: mtime changed and load succeeded
//! Loaded      → Reloaded → Loaded: explicit reload()
//! ```
//!
//! # Design Decisions
//! - Document and baseline travel together in one `Snapshot`
//! - The stat happens without a lock; only the reload step is serialized
//! - A reader that finds a reload in progress serves the published snapshot
//! - A failed reload leaves the snapshot and baseline untouched

use arc_swap::ArcSwap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, TryLockError};
use std::time::SystemTime;

use crate::document::Document;
use crate::error::ConfigResult;
use crate::loader::{Loader, SourceSpec};
use crate::observability::metrics;

/// One published configuration state.
#[derive(Debug)]
pub struct Snapshot {
    pub document: Arc<Document>,
    /// Modification time of the bound file when it was read.
    pub modified: Option<SystemTime>,
    /// Starts at 1, incremented on every successful reload.
    pub generation: u64,
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

/// Owns the current snapshot of one configuration identity.
#[derive(Debug)]
pub struct ReloadController {
    spec: SourceSpec,
    loader: Loader,
    current: ArcSwap<Snapshot>,
    reload_lock: Mutex<()>,
    loads: AtomicU64,
}

impl ReloadController {
    /// Perform the initial load. Any load error is returned to the caller.
    pub fn initialize(spec: SourceSpec, loader: Loader) -> ConfigResult<Self> {
        let loads = AtomicU64::new(0);
        let snapshot = load_snapshot(&spec, &loader, &loads, 1)?;
        tracing::info!(
            source = %spec,
            keys = snapshot.document.len(),
            "Configuration loaded successfully"
        );
        Ok(Self {
            spec,
            loader,
            current: ArcSwap::from_pointee(snapshot),
            reload_lock: Mutex::new(()),
            loads,
        })
    }

    pub fn spec(&self) -> &SourceSpec {
        &self.spec
    }

    /// The published snapshot, without a staleness check.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Number of loader invocations so far, successful or not.
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }

    /// Whether reads trigger a staleness check.
    pub fn is_watched(&self) -> bool {
        self.spec.external_path().is_some()
    }

    fn is_stale(&self, path: &Path, snapshot: &Snapshot) -> bool {
        match modified_time(path) {
            Some(mtime) => snapshot.modified != Some(mtime),
            None => false,
        }
    }

    /// Reload if the bound file changed since the current snapshot.
    ///
    /// Returns true when a new snapshot was published by this call. If
    /// another thread is already reloading, returns false immediately and
    /// the caller keeps reading the current snapshot.
    pub fn refresh(&self) -> bool {
        let Some(path) = self.spec.external_path() else {
            return false;
        };
        if !self.is_stale(path, &self.current.load()) {
            return false;
        }

        let _guard = match self.reload_lock.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                tracing::trace!(path = %path.display(), "Reload in progress, serving current snapshot");
                return false;
            }
        };
        let current = self.current.load_full();
        // Another reader may have reloaded between the stat and the lock
        if !self.is_stale(path, &current) {
            return false;
        }

        match load_snapshot(&self.spec, &self.loader, &self.loads, current.generation + 1) {
            Ok(snapshot) => {
                tracing::info!(
                    path = %path.display(),
                    generation = snapshot.generation,
                    "Configuration automatically reloaded due to file modification"
                );
                metrics::record_reload("modified", "ok");
                self.current.store(Arc::new(snapshot));
                true
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to reload modified configuration file, keeping current configuration"
                );
                metrics::record_reload("modified", "error");
                false
            }
        }
    }

    /// Reload unconditionally. On failure the current snapshot stays.
    pub fn reload(&self) -> ConfigResult<()> {
        let _guard = self.reload_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let generation = self.current.load().generation + 1;

        match load_snapshot(&self.spec, &self.loader, &self.loads, generation) {
            Ok(snapshot) => {
                tracing::info!(source = %self.spec, generation, "Configuration reloaded successfully");
                metrics::record_reload("explicit", "ok");
                self.current.store(Arc::new(snapshot));
                Ok(())
            }
            Err(e) => {
                tracing::error!(source = %self.spec, error = %e, "Failed to reload configuration");
                metrics::record_reload("explicit", "error");
                Err(e)
            }
        }
    }
}

fn load_snapshot(
    spec: &SourceSpec,
    loader: &Loader,
    loads: &AtomicU64,
    generation: u64,
) -> ConfigResult<Snapshot> {
    // Stat before reading so a write racing the read is seen as stale next time
    let modified = spec.external_path().and_then(modified_time);
    loads.fetch_add(1, Ordering::Relaxed);

    let document = match loader.load(spec) {
        Ok(document) => document,
        Err(e) => {
            metrics::record_load("error");
            return Err(e);
        }
    };
    metrics::record_load("ok");
    metrics::record_document_keys(document.len());

    Ok(Snapshot {
        document: Arc::new(document),
        modified,
        generation,
    })
}
