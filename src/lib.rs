//! Layered configuration resolution.
//!
//! Typed lookups over property files and JSON documents found across ordered
//! search roots, with live reload of externally bound files.
//!
//! ```no_run
//! use layered_config::HandleRegistry;
//!
//! # fn main() -> Result<(), layered_config::ConfigError> {
//! let config = HandleRegistry::global().external("/etc/myapp/config.json")?;
//! let pool_size = config.get_int("database.pool.maxSize", 10)?;
//! let debug = config.get_bool("app.debug", false)?;
//! # Ok(())
//! # }
//! ```

pub mod accessors;
pub mod document;
pub mod error;
pub mod handle;
pub mod loader;
pub mod observability;
pub mod reload;
pub mod settings;
pub mod source;

pub use document::{Document, DocumentKind, KeyPath};
pub use error::{ConfigError, ConfigResult};
pub use handle::{ConfigHandle, HandleRegistry};
pub use loader::{Loader, SourceSpec};
pub use settings::EngineSettings;
pub use source::{ResourceRoot, SourceLocator};
