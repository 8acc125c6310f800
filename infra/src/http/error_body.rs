//! Normalization of backend failure bodies.
//!
//! The accounts API reports failures in three shapes:
//!
//! - a global reason: `{ "error": "Invalid credentials" }` (or DRF's
//!   `{ "detail": "..." }`),
//! - a field-keyed map: `{ "phone_number": ["already exists"] }`,
//! - a plain string body.
//!
//! Every response interpretation goes through [`normalize_error_body`] so
//! no caller ever re-implements the shape sniffing.

use reqwest::StatusCode;
use serde_json::Value;

use mm_core::errors::{FieldErrorMap, RemoteRejection};

/// Keys that carry a global reason rather than a field attribution.
const REASON_KEYS: [&str; 2] = ["error", "detail"];

/// Translate a non-2xx response body into a [`RemoteRejection`].
///
/// Never fails: an unparseable or empty body degrades to a generic reason
/// that still names the HTTP status.
pub fn normalize_error_body(status: StatusCode, body: &[u8]) -> RemoteRejection {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();

    match serde_json::from_str::<Value>(text) {
        Ok(Value::String(reason)) if !reason.is_empty() => RemoteRejection::with_reason(reason),
        Ok(Value::Object(map)) => {
            let reason = REASON_KEYS
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))
                .map(str::to_string);

            let fields = field_map_from(&map);

            match (reason, fields) {
                (Some(reason), Some(fields)) => RemoteRejection {
                    reason,
                    field_errors: Some(fields),
                },
                (Some(reason), None) => RemoteRejection::with_reason(reason),
                (None, Some(fields)) => RemoteRejection::with_fields(fields),
                (None, None) => fallback_rejection(status),
            }
        }
        // Non-JSON plain text still carries the reason verbatim.
        _ if !text.is_empty() => RemoteRejection::with_reason(text.to_string()),
        _ => fallback_rejection(status),
    }
}

/// Extract field-scoped reasons from a JSON object, skipping global-reason
/// keys. Values may be arrays of strings or a single string.
fn field_map_from(map: &serde_json::Map<String, Value>) -> Option<FieldErrorMap> {
    let mut fields = FieldErrorMap::new();
    for (key, value) in map {
        if REASON_KEYS.contains(&key.as_str()) {
            continue;
        }
        let reasons: Vec<String> = match value {
            Value::String(reason) => vec![reason.clone()],
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };
        if !reasons.is_empty() {
            fields.insert(key.clone(), reasons);
        }
    }
    if fields.is_empty() {
        None
    } else {
        Some(fields)
    }
}

fn fallback_rejection(status: StatusCode) -> RemoteRejection {
    RemoteRejection::with_reason(format!(
        "Request failed ({})",
        status.canonical_reason().unwrap_or("unknown status")
    ))
}
