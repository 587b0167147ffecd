//! Normalization of the legacy scalar/array option duality
//!
//! The persisted schema grew from "one option per attribute" (a scalar
//! id column) to "many options" (a JSON array column) without a
//! migration, so real rows carry either representation, and the array
//! column of some rows holds a doubly-encoded JSON string. This module
//! folds all of it into one canonical id list at the persistence
//! boundary; the in-memory model only ever sees the list form.

use serde_json::Value;
use tracing::warn;

/// Reconcile a scalar id column and a JSON array column into one list.
///
/// The array wins whenever it decodes to a non-empty list; otherwise a
/// present scalar yields a one-element list; otherwise the result is
/// empty. Total: malformed payloads degrade to the scalar fallback and
/// are logged, never surfaced as errors.
pub fn normalize(scalar: Option<i64>, array: Option<&Value>) -> Vec<i64> {
    if let Some(value) = array {
        let ids = decode_value(value);
        if !ids.is_empty() {
            return ids;
        }
    }

    match scalar {
        Some(id) => vec![id],
        None => Vec::new(),
    }
}

/// Like [`normalize`], but takes the raw text of a JSON column.
pub fn normalize_raw(scalar: Option<i64>, raw: Option<&str>) -> Vec<i64> {
    let value = raw.and_then(|text| {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        match serde_json::from_str::<Value>(trimmed) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(column = %trimmed, %err, "malformed legacy id list, ignoring");
                None
            }
        }
    });

    normalize(scalar, value.as_ref())
}

/// Decode a JSON value into an id list. Strings are unwrapped one
/// encoding level at a time (legacy writers double-encoded some rows).
fn decode_value(value: &Value) -> Vec<i64> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item.as_i64() {
                Some(id) => Some(id),
                None => {
                    warn!(?item, "non-integer entry in legacy id list, skipping");
                    None
                }
            })
            .collect(),
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(inner) => decode_value(&inner),
            Err(err) => {
                warn!(%raw, %err, "malformed legacy id list string, ignoring");
                Vec::new()
            }
        },
        other => {
            warn!(?other, "unexpected legacy id list payload, ignoring");
            Vec::new()
        }
    }
}
