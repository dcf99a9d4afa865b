// ============================================================================
// Status Data Key Escaping
// ============================================================================
//
// The document store reserves '.' and '$' in field names. Status data keys
// are rewritten to their fullwidth forms before storage and restored on read.
//
// ============================================================================

use super::value::{StatusData, Value};

pub const FULLWIDTH_DOT: char = '\u{ff0e}';
pub const FULLWIDTH_DOLLAR: char = '\u{ff04}';

fn escape_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            '.' => FULLWIDTH_DOT,
            '$' => FULLWIDTH_DOLLAR,
            c => c,
        })
        .collect()
}

fn unescape_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            FULLWIDTH_DOT => '.',
            FULLWIDTH_DOLLAR => '$',
            c => c,
        })
        .collect()
}

/// Returns a copy of `input` with every key of every nested map transformed
/// by `f`. Values other than maps are copied as they are, including lists
/// that happen to contain maps.
fn map_keys(f: fn(&str) -> String, input: &StatusData) -> StatusData {
    input
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::Map(submap) => Value::Map(map_keys(f, submap)),
                other => other.clone(),
            };
            (f(key), value)
        })
        .collect()
}

/// Escapes reserved characters in status data keys. Data written without
/// escaping is unreadable by the store.
pub fn escape_keys(input: &StatusData) -> StatusData {
    map_keys(escape_key, input)
}

/// Restores keys escaped by [`escape_keys`].
pub fn unescape_keys(input: &StatusData) -> StatusData {
    map_keys(unescape_key, input)
}

/// Whether any key in `data`, at any map depth, contains a reserved character.
pub fn has_reserved_keys(data: &StatusData) -> bool {
    data.iter().any(|(key, value)| {
        key.contains(['.', '$'])
            || matches!(value, Value::Map(submap) if has_reserved_keys(submap))
    })
}
