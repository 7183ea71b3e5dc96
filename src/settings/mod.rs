//! Engine settings.
//!
//! # Data Flow
//! ```text
//! settings file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → EngineSettings (validated, immutable)
//!     → locator() / default_spec() feed the HandleRegistry
//! ```
//!
//! # Design Decisions
//! - Every field has a default so an absent settings file is fine
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_settings, parse_settings, SettingsError};
pub use schema::{EngineSettings, SourceMode};
