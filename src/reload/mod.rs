//! Reload subsystem.
//!
//! # Data Flow
//! ```text
//! accessor call (pull)            notify event (push)
//!         ↓                               ↓
//!     controller.refresh(): stat bound file, compare with snapshot baseline
//!         ↓ changed
//!     lock → re-check → loader.load(spec) → store new Arc<Snapshot>
//!         ↓ failed
//!     log, keep old snapshot and baseline
//! ```
//!
//! # Design Decisions
//! - `ArcSwap` publication: readers never block on a reload
//! - Located (non-external) sources only change through `reload()`

pub mod controller;
pub mod watcher;

pub use controller::{ReloadController, Snapshot};
pub use watcher::ConfigWatcher;
