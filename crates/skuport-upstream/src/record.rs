//! Helpers for working with untyped upstream records.

use serde_json::Value;

/// Unwraps an upstream collection into its record sequence.
///
/// Depending on endpoint and API revision a collection arrives either as a
/// bare JSON array or as a `{"data": [...]}` envelope. Any other shape
/// degrades to an empty sequence with a warning; a single malformed source
/// must not abort an export.
#[must_use]
pub fn collection_records(value: Value, source: &str) -> Vec<Value> {
    let records = match value {
        Value::Array(records) => Some(records),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(records)) => Some(records),
            _ => None,
        },
        _ => None,
    };

    records.unwrap_or_else(|| {
        tracing::warn!(
            source,
            "upstream collection is not an array or data envelope, treating as empty"
        );
        Vec::new()
    })
}

/// Reads an optional string field off a record, defaulting to `""`.
pub(crate) fn str_field(record: &Value, field: &str) -> String {
    record
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}
