//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! locator, loader, controller, accessors produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters and gauges through the metrics facade)
//! ```
//!
//! # Design Decisions
//! - Structured fields (`key`, `path`, `source_name`) instead of formatted text
//! - Metrics are cheap (facade no-ops until a recorder is installed)

pub mod logging;
pub mod metrics;
