//! Push-mode reload for bound files.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use crate::document::Document;
use crate::error::{ConfigError, ConfigResult};
use crate::reload::ReloadController;

/// Runs the staleness check whenever the bound file changes on disk.
pub struct ConfigWatcher {
    path: PathBuf,
    controller: Arc<ReloadController>,
    update_tx: mpsc::Sender<Arc<Document>>,
}

impl ConfigWatcher {
    /// Create a watcher for a controller bound to an external file.
    ///
    /// Returns the watcher and a receiver for every newly published document.
    pub fn new(controller: Arc<ReloadController>) -> ConfigResult<(Self, mpsc::Receiver<Arc<Document>>)> {
        let path = controller
            .spec()
            .external_path()
            .map(Path::to_path_buf)
            .ok_or_else(|| ConfigError::Unbound(controller.spec().to_string()))?;
        let (update_tx, update_rx) = mpsc::channel();

        Ok((
            Self {
                path,
                controller,
                update_tx,
            },
            update_rx,
        ))
    }

    /// Start watching. Dropping the returned watcher stops it.
    ///
    /// The parent directory is watched so editors that replace the file by
    /// rename are still noticed.
    pub fn run(self) -> ConfigResult<RecommendedWatcher> {
        let watch_dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let file_name = self.path.file_name().map(|n| n.to_os_string());
        let mut publisher = UpdatePublisher::new(self.controller, self.update_tx);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let ours = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if ours && (event.kind.is_modify() || event.kind.is_create()) {
                        tracing::debug!(kind = ?event.kind, "Config file change detected");
                        publisher.on_change();
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )
        .map_err(ConfigError::Watch)?;

        watcher
            .watch(&watch_dir, RecursiveMode::NonRecursive)
            .map_err(ConfigError::Watch)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// Sends each published generation once, whichever call published it.
struct UpdatePublisher {
    controller: Arc<ReloadController>,
    update_tx: mpsc::Sender<Arc<Document>>,
    last_sent: u64,
}

impl UpdatePublisher {
    fn new(controller: Arc<ReloadController>, update_tx: mpsc::Sender<Arc<Document>>) -> Self {
        let last_sent = controller.snapshot().generation;
        Self {
            controller,
            update_tx,
            last_sent,
        }
    }

    /// Returns true when a document was sent.
    fn on_change(&mut self) -> bool {
        self.controller.refresh();
        // An accessor may already have pulled this change in
        let snapshot = self.controller.snapshot();
        if snapshot.generation <= self.last_sent {
            return false;
        }
        self.last_sent = snapshot.generation;
        self.update_tx.send(snapshot.document.clone()).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{Loader, SourceSpec};
    use std::fs::File;
    use std::time::SystemTime;

    #[test]
    fn test_requires_bound_file() {
        let controller = Arc::new(
            ReloadController::initialize(SourceSpec::json("config.json"), Loader::default()).unwrap(),
        );
        assert!(ConfigWatcher::new(controller).is_err());
    }

    #[test]
    fn test_starts_on_existing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, "{}").unwrap();
        let controller = Arc::new(
            ReloadController::initialize(SourceSpec::external(&path), Loader::default()).unwrap(),
        );

        let (watcher, updates) = ConfigWatcher::new(controller).unwrap();
        let running = watcher.run().unwrap();
        assert!(updates.try_recv().is_err());
        drop(running);
    }

    #[test]
    fn test_change_pulled_by_reader_is_still_pushed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        let base = SystemTime::now() - Duration::from_secs(60);
        std::fs::write(&path, r#"{"limit":1}"#).unwrap();
        File::options().write(true).open(&path).unwrap().set_modified(base).unwrap();
        let controller = Arc::new(
            ReloadController::initialize(SourceSpec::external(&path), Loader::default()).unwrap(),
        );
        let (tx, updates) = mpsc::channel();
        let mut publisher = UpdatePublisher::new(controller.clone(), tx);

        std::fs::write(&path, r#"{"limit":2}"#).unwrap();
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(base + Duration::from_secs(5))
            .unwrap();
        // A reader reloads before the file event is handled
        assert!(controller.refresh());

        assert!(publisher.on_change());
        let document = updates.try_recv().unwrap();
        assert_eq!(document.root()["limit"], 2);

        // Duplicate events for the same generation send nothing
        assert!(!publisher.on_change());
        assert!(updates.try_recv().is_err());
    }
}
