//! Text encoding for the variable-shape product fields.
//!
//! The gallery and the attribute map are stored in plain text columns. This
//! module is the only place that knows the on-disk format (JSON). Decoding is
//! lenient: a missing, empty or corrupt value yields an empty container so a
//! damaged auxiliary column never makes a product unreadable.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;

/// Encode an ordered list of strings (e.g. gallery URLs).
pub fn encode_list(items: &[String]) -> String {
    // Serializing a slice of strings cannot fail.
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// Decode a list previously produced by [`encode_list`].
pub fn decode_list(raw: Option<&str>) -> Vec<String> {
    decode_or_default(raw, "gallery")
}

/// Encode a string-to-string attribute map.
pub fn encode_map(map: &BTreeMap<String, String>) -> String {
    serde_json::to_string(map).unwrap_or_else(|_| "{}".to_string())
}

/// Decode a map previously produced by [`encode_map`].
pub fn decode_map(raw: Option<&str>) -> BTreeMap<String, String> {
    decode_or_default(raw, "attributes")
}

fn decode_or_default<T>(raw: Option<&str>, field: &'static str) -> T
where
    T: DeserializeOwned + Default,
{
    let Some(text) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
        return T::default();
    };

    // JSON `null` deserializes into `Option::None` and is treated as absent.
    match serde_json::from_str::<Option<T>>(text) {
        Ok(value) => value.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(field, error = %e, "Discarding malformed encoded field");
            T::default()
        }
    }
}
