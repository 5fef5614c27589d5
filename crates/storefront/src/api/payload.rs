//! List payload normalization.
//!
//! List endpoints answer either with a bare JSON array or with a paginated
//! envelope `{"count": .., "results": [...]}`. Both collapse to a plain
//! `Vec`; any other shape is treated as an empty list.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Extract the list items from a list response body.
#[must_use]
pub fn normalize_list(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        Value::Object(mut envelope) => match envelope.remove("results") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Normalize a list response and decode every item.
///
/// Items that do not decode as `T` are skipped and logged.
#[must_use]
pub fn decode_list<T: DeserializeOwned>(payload: Value) -> Vec<T> {
    normalize_list(payload)
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping malformed list item");
                None
            }
        })
        .collect()
}
