//! Metrics collection.
//!
//! # Metrics
//! - `layered_config_loads_total` (counter): loader invocations by outcome
//! - `layered_config_reloads_total` (counter): reloads by trigger, outcome
//! - `layered_config_conversion_failures_total` (counter): by target type
//! - `layered_config_document_keys` (gauge): top-level keys of the last load
//!
//! # Design Decisions
//! - Emits through the `metrics` facade only; the embedding process decides
//!   whether an exporter is installed
//! - No per-key labels (unbounded cardinality)

pub fn record_load(outcome: &'static str) {
    metrics::counter!("layered_config_loads_total", "outcome" => outcome).increment(1);
}

pub fn record_reload(trigger: &'static str, outcome: &'static str) {
    metrics::counter!(
        "layered_config_reloads_total",
        "trigger" => trigger,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_conversion_failure(target: &'static str) {
    metrics::counter!("layered_config_conversion_failures_total", "target" => target).increment(1);
}

pub fn record_document_keys(count: usize) {
    metrics::gauge!("layered_config_document_keys").set(count as f64);
}
