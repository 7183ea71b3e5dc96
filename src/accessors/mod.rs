//! Typed accessors.
//!
//! # Data Flow
//! ```text
//! resolved leaf (serde_json::Value)
//!     → text_of: strings as-is, numbers/bools via their JSON text
//!     → FromConfigValue::from_text (trimmed parse)
//!     → value, or conversion failure
//! ```
//!
//! # Design Decisions
//! - Lenient accessors turn every failure into the caller's default
//! - Strict callers get `ConfigError::Conversion` instead
//! - Objects and arrays have no scalar text form

use serde_json::Value;
use std::borrow::Cow;

use crate::error::ConfigError;

/// Scalar text of a leaf; `None` for null, objects and arrays.
pub fn text_of(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// A type a configuration leaf can be converted into.
pub trait FromConfigValue: Sized {
    /// Type name used in diagnostics.
    const TARGET: &'static str;

    /// Parse the leaf's text form.
    fn from_text(text: &str) -> Option<Self>;
}

impl FromConfigValue for String {
    const TARGET: &'static str = "string";

    fn from_text(text: &str) -> Option<Self> {
        Some(text.to_string())
    }
}

/// `true` (any case) or `1` is true; any other text is false.
impl FromConfigValue for bool {
    const TARGET: &'static str = "boolean";

    fn from_text(text: &str) -> Option<Self> {
        let text = text.trim();
        Some(text.eq_ignore_ascii_case("true") || text == "1")
    }
}

macro_rules! parse_trimmed {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl FromConfigValue for $ty {
                const TARGET: &'static str = $name;

                fn from_text(text: &str) -> Option<Self> {
                    text.trim().parse().ok()
                }
            }
        )*
    };
}

parse_trimmed! {
    i32 => "integer",
    i64 => "long",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    usize => "usize",
    f64 => "double",
}

/// Convert a resolved leaf, reporting the raw text on failure.
pub fn convert<T: FromConfigValue>(key: &str, value: &Value) -> Result<T, ConfigError> {
    let conversion_error = |raw: String| ConfigError::Conversion {
        key: key.to_string(),
        raw,
        target: T::TARGET,
    };
    let text = text_of(value).ok_or_else(|| conversion_error(value.to_string()))?;
    T::from_text(&text).ok_or_else(|| conversion_error(text.into_owned()))
}
