//! `key=value` properties parsing.
//!
//! Follows the classic properties grammar: `#`/`!` comments, `=`, `:` or
//! whitespace separators, backslash line continuations and `\uXXXX` escapes.
//! Later duplicates within one file replace earlier ones.

use serde_json::{Map, Value};

use crate::error::{ConfigError, ConfigResult};

fn is_ws(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// Decode file bytes: UTF-8 when valid, otherwise ISO-8859-1.
pub fn decode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Parse properties text into an ordered flat mapping of string values.
pub fn parse(source_name: &str, content: &str) -> ConfigResult<Map<String, Value>> {
    let mut entries = Map::new();
    let mut lines = content.lines().enumerate();

    while let Some((idx, line)) = lines.next() {
        let trimmed = line.trim_start_matches(is_ws);
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let line_no = idx + 1;
        let mut logical = trimmed.to_string();
        while continues(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start_matches(is_ws)),
                None => break,
            }
        }

        let (raw_key, raw_value) = split_entry(&logical);
        let parse_err = |message: String| ConfigError::Parse {
            source_name: source_name.to_string(),
            line: line_no,
            message,
        };
        let key = unescape(raw_key).map_err(parse_err)?;
        let value = unescape(raw_value).map_err(parse_err)?;
        entries.insert(key, Value::String(value));
    }

    Ok(entries)
}

/// An odd number of trailing backslashes continues the line.
fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> (&str, &str) {
    let mut chars = line.char_indices();
    let mut split = None;
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '=' | ':' => {
                split = Some((i, c));
                break;
            }
            c if is_ws(c) => {
                split = Some((i, c));
                break;
            }
            _ => {}
        }
    }

    let Some((end, sep)) = split else {
        return (line, "");
    };
    let mut rest = line[end + sep.len_utf8()..].trim_start_matches(is_ws);
    if is_ws(sep) {
        if let Some(stripped) = rest.strip_prefix(&['=', ':'][..]) {
            rest = stripped.trim_start_matches(is_ws);
        }
    }
    (&line[..end], rest)
}

fn unescape(raw: &str) -> Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    let mut high_surrogate: Option<u16> = None;

    while let Some(c) = chars.next() {
        if c != '\\' {
            flush_surrogate(&mut out, &mut high_surrogate);
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            break;
        };
        if escaped != 'u' {
            flush_surrogate(&mut out, &mut high_surrogate);
            out.push(match escaped {
                't' => '\t',
                'n' => '\n',
                'r' => '\r',
                'f' => '\x0c',
                other => other,
            });
            continue;
        }

        let hex: String = chars.by_ref().take(4).collect();
        if hex.len() != 4 || !hex.chars().all(|h| h.is_ascii_hexdigit()) {
            return Err(format!("malformed \\uxxxx encoding near '\\u{}'", hex));
        }
        let unit = u16::from_str_radix(&hex, 16).map_err(|e| e.to_string())?;
        match (high_surrogate.take(), unit) {
            (Some(high), 0xDC00..=0xDFFF) => {
                let pair = char::decode_utf16([high, unit])
                    .next()
                    .and_then(Result::ok)
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                out.push(pair);
            }
            (pending, 0xD800..=0xDBFF) => {
                if pending.is_some() {
                    out.push(char::REPLACEMENT_CHARACTER);
                }
                high_surrogate = Some(unit);
            }
            (pending, _) => {
                if pending.is_some() {
                    out.push(char::REPLACEMENT_CHARACTER);
                }
                out.push(char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
        }
    }
    flush_surrogate(&mut out, &mut high_surrogate);
    Ok(out)
}

fn flush_surrogate(out: &mut String, pending: &mut Option<u16>) {
    if pending.take().is_some() {
        out.push(char::REPLACEMENT_CHARACTER);
    }
}
