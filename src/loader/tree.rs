//! JSON document parsing.

use serde_json::{Map, Value};

use crate::error::{ConfigError, ConfigResult};

/// Parse a JSON source into a tree root.
///
/// Whitespace-only content yields an empty object. A non-object root is
/// accepted but nothing beneath it is addressable by key path.
pub fn parse(source_name: &str, bytes: &[u8]) -> ConfigResult<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        tracing::debug!(source_name, "JSON source is empty, using empty object");
        return Ok(Value::Object(Map::new()));
    }

    let root: Value = serde_json::from_slice(bytes).map_err(|source| ConfigError::Json {
        source_name: source_name.to_string(),
        source,
    })?;

    if !root.is_object() {
        tracing::warn!(source_name, "JSON configuration root is not an object");
    }
    Ok(root)
}
