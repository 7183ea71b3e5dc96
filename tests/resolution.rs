//! End-to-end resolution through settings, registry, and handles.

use layered_config::settings::{parse_settings, SourceMode};
use layered_config::{ConfigError, HandleRegistry, SourceSpec};
use serde_json::json;
use std::path::Path;

mod common;

fn settings_for(res: &Path, dir: &Path, mode: &str) -> layered_config::EngineSettings {
    parse_settings(&format!(
        r#"
        [sources]
        mode = "{mode}"
        property_files = ["a.properties", "b.properties"]
        search_dirs = ["{dir}"]

        [[sources.resource_roots]]
        dir = "{res}"
        prefixes = ["", "conf/"]
        "#,
        mode = mode,
        dir = dir.display(),
        res = res.display(),
    ))
    .unwrap()
}

#[test]
fn test_later_declared_property_file_wins() {
    let tmp = tempfile::tempdir().unwrap();
    let res = tmp.path().join("res");
    let dir = tmp.path().join("etc");
    // b.properties is discovered first (resource root), a.properties last (directory)
    common::write_at(&res.join("conf/b.properties"), "app.name=Beta\n", common::base_time());
    common::write_at(&dir.join("a.properties"), "app.name=Alpha\napp.port=8080\n", common::base_time());

    let settings = settings_for(&res, &dir, "properties");
    assert_eq!(settings.sources.mode, SourceMode::Properties);
    let registry = HandleRegistry::from_settings(&settings);
    let config = registry.classpath().unwrap();

    assert_eq!(config.get_string("app.name", "?").unwrap(), "Beta");
    assert_eq!(config.get_int("app.port", 0).unwrap(), 8080);
    assert_eq!(config.document().origin().len(), 2);
    assert!(!config.is_external());
}

#[test]
fn test_every_accessor_returns_default_for_absent_keys() {
    let tmp = tempfile::tempdir().unwrap();
    let settings = settings_for(&tmp.path().join("res"), tmp.path(), "json");
    let config = HandleRegistry::from_settings(&settings).classpath().unwrap();

    for key in ["missing", "deeply.nested.missing", "a.b"] {
        assert_eq!(config.get_string(key, "d").unwrap(), "d");
        assert_eq!(config.get_int(key, -1).unwrap(), -1);
        assert_eq!(config.get_long(key, 7).unwrap(), 7);
        assert_eq!(config.get_double(key, 2.5).unwrap(), 2.5);
        assert!(config.get_bool(key, true).unwrap());
        assert!(!config.get_bool(key, false).unwrap());
        assert!(!config.contains_key(key).unwrap());
    }
}

#[test]
fn test_json_document_through_search_roots() {
    let tmp = tempfile::tempdir().unwrap();
    let res = tmp.path().join("res");
    let source = json!({
        "application": {"name": "Hybrid", "version": "2.5"},
        "database": {"connection": {"pool": {"minSize": 5, "timeout": 30000}}},
        "cache": {"enabled": "true"},
        "features": {"maintenanceMode": false},
        "email": {"smtp": {"host": "mail.local", "port": 25, "tls": [1, 2]}}
    });
    common::write_at(&res.join("config.json"), &source.to_string(), common::base_time());

    let settings = settings_for(&res, tmp.path(), "json");
    let config = HandleRegistry::from_settings(&settings).classpath().unwrap();

    assert_eq!(config.get_string("application.name", "").unwrap(), "Hybrid");
    assert_eq!(config.get_double("application.version", 0.0).unwrap(), 2.5);
    assert_eq!(config.get_int("database.connection.pool.minSize", 0).unwrap(), 5);
    assert_eq!(config.get_long("database.connection.pool.timeout", 0).unwrap(), 30_000);
    assert!(config.get_bool("cache.enabled", false).unwrap());
    assert!(!config.get_bool("features.maintenanceMode", true).unwrap());

    // Subtrees come back structurally equal to the source fragment
    assert_eq!(config.node("email.smtp").unwrap(), Some(source["email"]["smtp"].clone()));
    assert_eq!(config.node("database").unwrap(), Some(source["database"].clone()));
}

#[test]
fn test_malformed_source_fails_first_access_only() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.json");
    common::write_at(&path, "{\"a\": [1, 2", common::base_time());
    let registry = HandleRegistry::new(Default::default(), SourceSpec::json("config.json"));

    let err = registry.external(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Json { .. }));
    assert!(err.source_name().is_some_and(|name| name.ends_with("config.json")));
}

#[test]
fn test_reload_twice_without_change_is_stable() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.json");
    common::write_at(&path, r#"{"database":{"pool":{"maxSize":10}},"name":"svc"}"#, common::base_time());
    let config = HandleRegistry::new(Default::default(), SourceSpec::json("config.json"))
        .external(&path)
        .unwrap();

    let before = (
        config.get_int("database.pool.maxSize", 0).unwrap(),
        config.get_string("name", "").unwrap(),
        config.contains_key("database.pool").unwrap(),
    );
    config.reload().unwrap();
    config.reload().unwrap();
    let after = (
        config.get_int("database.pool.maxSize", 0).unwrap(),
        config.get_string("name", "").unwrap(),
        config.contains_key("database.pool").unwrap(),
    );

    assert_eq!(before, after);
    assert_eq!(config.generation(), 3);
    assert_eq!(config.load_count(), 3);
}
