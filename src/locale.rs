use crate::types::NamePair;
use serde_json::Value;

/// Reads the `names` collection of a detail record into name pairs.
///
/// Expected entry shape: `{ "language": { "name": "<locale>" }, "name": "<value>" }`.
/// Anything else degrades to missing fields instead of failing: a record with
/// no `names` array yields no pairs, and an entry without a language yields a
/// pair that never matches.
pub fn names_from_detail(detail: &Value) -> Vec<NamePair> {
    detail
        .get("names")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().map(name_pair_from_entry).collect())
        .unwrap_or_default()
}

fn name_pair_from_entry(entry: &Value) -> NamePair {
    NamePair {
        locale: entry
            .get("language")
            .and_then(|lang| lang.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string),
        value: entry.get("name").and_then(Value::as_str).map(str::to_string),
    }
}

/// Value of the first pair whose locale equals `target_locale` exactly.
///
/// The first match wins even when its value is missing.
pub fn extract(names: &[NamePair], target_locale: &str) -> Option<String> {
    names
        .iter()
        .find(|pair| pair.locale.as_deref() == Some(target_locale))
        .and_then(|pair| pair.value.clone())
}
