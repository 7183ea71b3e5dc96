//! Shared utilities for integration tests.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// A modification time safely in the past, so tests can step it forward.
pub fn base_time() -> SystemTime {
    SystemTime::now() - Duration::from_secs(3600)
}

/// Write `body` to `path` and pin its modification time.
pub fn write_at(path: &Path, body: &str, mtime: SystemTime) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, body).unwrap();
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(mtime)
        .unwrap();
}

/// Replace `path` atomically: write a sibling, pin its mtime, rename over.
#[allow(dead_code)]
pub fn replace_at(path: &Path, body: &str, mtime: SystemTime) {
    let staging: PathBuf = path.with_extension("staging");
    write_at(&staging, body, mtime);
    fs::rename(&staging, path).unwrap();
}
