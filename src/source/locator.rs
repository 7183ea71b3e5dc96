//! Candidate search across resource roots and plain directories.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// A resource root: a base directory plus the prefixes searched under it.
///
/// Roots play the role of nested resource loaders; they are listed most
/// specific first and every prefix of a root is tried before the next root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRoot {
    pub dir: PathBuf,
    pub prefixes: Vec<String>,
}

impl ResourceRoot {
    /// A root searched only at its top level.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefixes: vec![String::new()],
        }
    }

    pub fn with_prefixes<I, S>(dir: impl Into<PathBuf>, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dir: dir.into(),
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    fn candidate(&self, prefix: &str, name: &str) -> PathBuf {
        let prefix = prefix.trim_matches('/');
        if prefix.is_empty() {
            self.dir.join(name)
        } else {
            self.dir.join(prefix).join(name)
        }
    }
}

/// Where a source was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Found under a resource root (index into the declared roots).
    Resource { root: usize, prefix: String },
    /// Found in a plain search directory.
    Directory,
}

/// A readable source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: PathBuf,
    pub origin: Origin,
}

enum Probe {
    Found,
    Missing,
    Unreadable(io::Error),
}

fn probe(candidate: &Path) -> Probe {
    match File::open(candidate).and_then(|f| f.metadata()) {
        Ok(meta) if meta.is_file() => Probe::Found,
        Ok(_) => Probe::Missing,
        Err(e) if e.kind() == io::ErrorKind::NotFound => Probe::Missing,
        Err(e) => Probe::Unreadable(e),
    }
}

/// Ordered search over resource roots, then directories.
#[derive(Debug, Clone, Default)]
pub struct SourceLocator {
    roots: Vec<ResourceRoot>,
    dirs: Vec<PathBuf>,
}

impl SourceLocator {
    pub fn new(roots: Vec<ResourceRoot>, dirs: Vec<PathBuf>) -> Self {
        Self { roots, dirs }
    }

    pub fn roots(&self) -> &[ResourceRoot] {
        &self.roots
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Find the first readable location for `name`, or `None`.
    ///
    /// Unreadable candidates are logged and skipped.
    pub fn locate(&self, name: &str) -> Option<Location> {
        let resource_candidates = self.roots.iter().enumerate().flat_map(|(idx, root)| {
            root.prefixes.iter().map(move |prefix| {
                (
                    root.candidate(prefix, name),
                    Origin::Resource {
                        root: idx,
                        prefix: prefix.clone(),
                    },
                )
            })
        });
        let dir_candidates = self
            .dirs
            .iter()
            .map(|dir| (dir.join(name), Origin::Directory));

        for (path, origin) in resource_candidates.chain(dir_candidates) {
            match probe(&path) {
                Probe::Found => {
                    tracing::debug!(source_name = name, path = %path.display(), "Configuration source found");
                    return Some(Location { path, origin });
                }
                Probe::Missing => {
                    tracing::trace!(source_name = name, path = %path.display(), "Candidate does not exist");
                }
                Probe::Unreadable(e) => {
                    tracing::warn!(
                        source_name = name,
                        path = %path.display(),
                        error = %e,
                        "Configuration source exists but is unreadable, continuing search"
                    );
                }
            }
        }

        tracing::debug!(source_name = name, "Configuration source not found in any root");
        None
    }
}
