// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common document types shared by stores and the record layer.

use serde_json::Value;

/// A schema-less document: a flat JSON object as held by a document store.
pub type Document = serde_json::Map<String, Value>;

/// Key under which every stored document carries its identifier.
pub const ID_KEY: &str = "_id";

/// Returns the document's identifier, if it has a string `_id`.
pub fn document_id(document: &Document) -> Option<&str> {
    document.get(ID_KEY).and_then(Value::as_str)
}

/// Generates a fresh opaque document identifier.
pub fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Resolves a dotted path (`chartConfiguration.chartType`) inside a document.
pub fn get_path<'a>(document: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = document.get(first)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Sets a dotted path, creating intermediate objects as needed.
///
/// Intermediate values that are not objects are replaced.
pub fn set_path(document: &mut Document, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            document.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = document
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Document::new()));
            if !entry.is_object() {
                *entry = Value::Object(Document::new());
            }
            if let Value::Object(child) = entry {
                set_path(child, rest, value);
            }
        }
    }
}

/// Removes a dotted path. Missing intermediate keys are ignored.
pub fn remove_path(document: &mut Document, path: &str) {
    match path.split_once('.') {
        None => {
            document.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Value::Object(child)) = document.get_mut(head) {
                remove_path(child, rest);
            }
        }
    }
}

/// Health status reported by store health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Store is fully operational.
    Healthy,
    /// Store is operational but experiencing issues.
    Degraded(String),
    /// Store is not operational.
    Unhealthy(String),
}
