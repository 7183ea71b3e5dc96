//! Settings validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject file names that would escape their search root
//! - Reject empty source lists for the selected mode
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Pure function: EngineSettings → Result<(), Vec<ValidationError>>

use std::path::{Component, Path};

use crate::settings::schema::{EngineSettings, SourceMode};

/// A single semantic problem in the settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A name or prefix must stay relative to its root.
fn is_contained(raw: &str) -> bool {
    Path::new(raw)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn check_file_name(errors: &mut Vec<ValidationError>, field: &str, name: &str) {
    if name.trim().is_empty() {
        errors.push(ValidationError::new(field, "file name cannot be empty"));
    } else if !is_contained(name) {
        errors.push(ValidationError::new(field, format!("'{}' must be a relative name", name)));
    }
}

pub fn validate_settings(settings: &EngineSettings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let sources = &settings.sources;

    for (i, root) in sources.resource_roots.iter().enumerate() {
        if root.prefixes.is_empty() {
            errors.push(ValidationError::new(
                format!("sources.resource_roots[{}].prefixes", i),
                "at least one prefix is required (use \"\" for the root itself)",
            ));
        }
        for prefix in &root.prefixes {
            if !prefix.is_empty() && !is_contained(prefix.trim_end_matches('/')) {
                errors.push(ValidationError::new(
                    format!("sources.resource_roots[{}].prefixes", i),
                    format!("'{}' must be a relative prefix", prefix),
                ));
            }
        }
    }

    for (i, name) in sources.property_files.iter().enumerate() {
        check_file_name(&mut errors, &format!("sources.property_files[{}]", i), name);
    }
    if sources.mode == SourceMode::Properties && sources.property_files.is_empty() {
        errors.push(ValidationError::new(
            "sources.property_files",
            "properties mode needs at least one file",
        ));
    }
    check_file_name(&mut errors, "sources.json_file", &sources.json_file);

    if settings.logging.filter.trim().is_empty() {
        errors.push(ValidationError::new("logging.filter", "filter cannot be empty"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(validate_settings(&EngineSettings::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut settings = EngineSettings::default();
        settings.sources.json_file = "../config.json".into();
        settings.sources.property_files = vec!["".into(), "/etc/app.properties".into()];
        settings.sources.resource_roots[0].prefixes = vec!["../up/".into()];
        settings.logging.filter = " ".into();

        let errors = validate_settings(&settings).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "sources.resource_roots[0].prefixes",
                "sources.property_files[0]",
                "sources.property_files[1]",
                "sources.json_file",
                "logging.filter",
            ]
        );
    }
}
