//! Source discovery.
//!
//! # Data Flow
//! ```text
//! source name
//!     → every (resource root, prefix) pair, in declared order
//!     → every search directory, in declared order
//!     → first readable file, or None ("empty source")
//! ```
//!
//! # Design Decisions
//! - Not found is not an error at this layer
//! - Unreadable files are logged distinctly and the search continues
//! - Order is fixed by declaration, never by filesystem discovery

pub mod locator;

pub use locator::{Location, Origin, ResourceRoot, SourceLocator};
