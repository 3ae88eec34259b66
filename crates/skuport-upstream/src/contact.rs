//! Best-effort extraction of shipping contact fields from variable payloads.
//!
//! Upstream payload shape has drifted across API revisions: the same logical
//! field has appeared flat, nested under a shipping object, or under a buyer
//! object. Each derived field probes an ordered candidate-path list and the
//! first present, non-null value wins; exhausting every candidate yields an
//! empty string, never an error.

use serde_json::Value;

/// Candidate paths for the shipping contact name, highest precedence first.
const CONTACT_PATHS: &[&[&str]] = &[
    &["shipping_contact"],
    &["shipping", "contact"],
    &["shipping", "name"],
    &["recipient_name"],
    &["buyer", "name"],
    &["customer_name"],
    &["shipping_name"],
];

/// Candidate paths for the shipping city, highest precedence first.
const CITY_PATHS: &[&[&str]] = &[&["shipping_city"], &["shipping", "city"]];

/// Resolves the shipping contact name for a record, `""` if absent.
#[must_use]
pub fn shipping_contact(record: &Value) -> String {
    probe(record, CONTACT_PATHS)
}

/// Resolves the shipping city for a record, `""` if absent.
#[must_use]
pub fn shipping_city(record: &Value) -> String {
    probe(record, CITY_PATHS)
}

/// Returns the first non-null value found under any candidate path.
///
/// Non-string scalars are rendered to their JSON text; the upstream has
/// drifted on types as well as field names.
fn probe(record: &Value, paths: &[&[&str]]) -> String {
    for path in paths {
        let mut current = record;
        let mut present = true;
        for segment in *path {
            match current.get(segment) {
                Some(next) => current = next,
                None => {
                    present = false;
                    break;
                }
            }
        }
        if !present {
            continue;
        }
        match current {
            Value::Null => {}
            Value::String(s) => return s.clone(),
            other => return other.to_string(),
        }
    }
    String::new()
}
