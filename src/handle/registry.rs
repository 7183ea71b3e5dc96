//! One handle per configuration identity.

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::ConfigResult;
use crate::handle::ConfigHandle;
use crate::loader::{Loader, SourceSpec};
use crate::settings::{load_settings, EngineSettings};

static GLOBAL: OnceCell<HandleRegistry> = OnceCell::new();

/// Lazily builds and caches handles keyed by [`SourceSpec`].
///
/// Each identity gets its own init-once cell: concurrent first callers block
/// on the cell while one of them loads; a failed load leaves the cell empty
/// so the next caller retries.
#[derive(Debug)]
pub struct HandleRegistry {
    loader: Loader,
    default_spec: SourceSpec,
    handles: DashMap<SourceSpec, Arc<OnceCell<Arc<ConfigHandle>>>>,
}

impl HandleRegistry {
    /// `default_spec` is what [`classpath`](Self::classpath) serves.
    pub fn new(loader: Loader, default_spec: SourceSpec) -> Self {
        Self {
            loader,
            default_spec,
            handles: DashMap::new(),
        }
    }

    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self::new(settings.loader(), settings.default_spec())
    }

    /// Build from a TOML settings file.
    pub fn from_settings_file(path: &Path) -> ConfigResult<Self> {
        Ok(Self::from_settings(&load_settings(path)?))
    }

    /// Make `registry` the process-wide instance.
    ///
    /// Fails (returning the registry back) if the global was already set,
    /// either explicitly or by an earlier call to [`global`](Self::global).
    pub fn install_global(registry: HandleRegistry) -> Result<&'static HandleRegistry, HandleRegistry> {
        GLOBAL.try_insert(registry).map_err(|(_, rejected)| rejected)
    }

    /// The process-wide registry, built from default settings on first use.
    pub fn global() -> &'static HandleRegistry {
        GLOBAL.get_or_init(|| HandleRegistry::from_settings(&EngineSettings::default()))
    }

    /// The handle for `spec`, loading it on first access.
    pub fn get_or_init(&self, spec: SourceSpec) -> ConfigResult<Arc<ConfigHandle>> {
        if let Some(handle) = self.handles.get(&spec).and_then(|cell| cell.get().cloned()) {
            return Ok(handle);
        }

        // Clone the cell out so the map shard is not locked during the load
        let cell = self.handles.entry(spec.clone()).or_default().clone();
        cell.get_or_try_init(|| ConfigHandle::open(spec, self.loader.clone()).map(Arc::new))
            .cloned()
    }

    /// Handle for the standard search roots.
    pub fn classpath(&self) -> ConfigResult<Arc<ConfigHandle>> {
        self.get_or_init(self.default_spec.clone())
    }

    /// Handle bound to an external file.
    ///
    /// Paths naming the same file through its directory (relative, absolute,
    /// or with `..` components) share one handle.
    pub fn external(&self, path: impl Into<PathBuf>) -> ConfigResult<Arc<ConfigHandle>> {
        self.get_or_init(SourceSpec::external(identity_path(&path.into())))
    }

    /// Number of identities that have a live handle.
    pub fn len(&self) -> usize {
        self.handles.iter().filter(|cell| cell.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Canonical directory plus the file name as given.
///
/// The file itself is not canonicalized: a symlinked file stays bound to the
/// link so a retargeted link is picked up on reload.
fn identity_path(path: &Path) -> PathBuf {
    let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
        return std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    };
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    match fs::canonicalize(parent) {
        Ok(dir) => dir.join(name),
        Err(_) => std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use std::thread;

    #[test]
    fn test_same_identity_same_handle() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{"a":1}"#).unwrap();
        let registry = HandleRegistry::new(Loader::default(), SourceSpec::json("config.json"));

        let first = registry.external(&path).unwrap();
        let second = registry.external(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let classpath = registry.classpath().unwrap();
        assert!(!Arc::ptr_eq(&first, &classpath));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_equivalent_paths_share_a_handle() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("cfg")).unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{"a":1}"#).unwrap();
        let registry = HandleRegistry::new(Loader::default(), SourceSpec::json("config.json"));

        let direct = registry.external(&path).unwrap();
        let dotted = registry.external(tmp.path().join("cfg/../config.json")).unwrap();
        let current = registry.external(tmp.path().join("./config.json")).unwrap();
        assert!(Arc::ptr_eq(&direct, &dotted));
        assert!(Arc::ptr_eq(&direct, &current));
        assert_eq!(registry.len(), 1);
        assert_eq!(direct.load_count(), 1);
    }

    #[test]
    fn test_identity_path_keeps_missing_file_name() {
        let tmp = tempfile::tempdir().unwrap();
        let canonical = fs::canonicalize(tmp.path()).unwrap();
        assert_eq!(
            identity_path(&tmp.path().join("not-yet.json")),
            canonical.join("not-yet.json")
        );
        assert!(identity_path(Path::new("relative.json")).is_absolute());
    }

    #[test]
    fn test_concurrent_first_access_loads_once() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{"a":1}"#).unwrap();
        let registry = Arc::new(HandleRegistry::new(Loader::default(), SourceSpec::json("config.json")));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                let path = path.clone();
                thread::spawn(move || registry.external(path).unwrap())
            })
            .collect();
        let opened: Vec<Arc<ConfigHandle>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(opened.iter().all(|h| Arc::ptr_eq(h, &opened[0])));
        assert_eq!(opened[0].load_count(), 1);
    }

    #[test]
    fn test_failed_init_is_retried() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let registry = HandleRegistry::new(Loader::default(), SourceSpec::json("config.json"));

        assert!(matches!(registry.external(&path), Err(ConfigError::Json { .. })));
        assert!(registry.is_empty());

        fs::write(&path, r#"{"a":2}"#).unwrap();
        let handle = registry.external(&path).unwrap();
        assert_eq!(handle.get_int("a", 0).unwrap(), 2);
    }

    #[test]
    fn test_from_settings_file() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = tmp.path().join("engine.toml");
        fs::write(&settings, "[sources]\nmode = \"properties\"\n").unwrap();
        let registry = HandleRegistry::from_settings_file(&settings).unwrap();
        assert!(matches!(registry.default_spec, SourceSpec::Properties { .. }));

        fs::write(&settings, "[sources]\njson_file = \"\"\n").unwrap();
        assert!(matches!(
            HandleRegistry::from_settings_file(&settings),
            Err(ConfigError::Settings(_))
        ));
    }
}
