// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Saved-query document validation.
//!
//! Structure (required keys, types, non-empty strings, closed objects) is
//! described by a JSON Schema and checked with `jsonschema`. A small local
//! pass normalizes the document first: empty-as-absent strings and blank
//! array items are removed, missing timestamps are defaulted to now, and
//! present timestamps are rewritten as canonical UTC RFC 3339 strings.
//! Every violation from both passes is reported together.

use std::sync::LazyLock;

use chrono::{SecondsFormat, Utc};
use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, Validator};
use querydeck_core::types::{get_path, remove_path, set_path};
use querydeck_core::{Document, QuerydeckError, ValidationError, Violation};
use serde_json::{Value, json};

use crate::model::{fields, parse_timestamp};

/// Canonical form of a timestamp inside stored documents.
pub fn format_timestamp(timestamp: chrono::DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A compiled document schema plus its normalization rules.
pub struct Schema {
    validator: Validator,
    /// Dotted paths where `""` means the key is absent.
    empty_as_absent: &'static [&'static str],
    /// Dotted paths of string arrays whose `""` items are dropped.
    sparse_arrays: &'static [&'static str],
    /// Dotted paths of timestamps, defaulted to now when absent.
    timestamps: &'static [&'static str],
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("empty_as_absent", &self.empty_as_absent)
            .field("sparse_arrays", &self.sparse_arrays)
            .field("timestamps", &self.timestamps)
            .finish_non_exhaustive()
    }
}

impl Schema {
    /// Compiles a Draft 2020-12 JSON Schema.
    pub fn compile(
        schema: &Value,
        empty_as_absent: &'static [&'static str],
        sparse_arrays: &'static [&'static str],
        timestamps: &'static [&'static str],
    ) -> Result<Self, QuerydeckError> {
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(schema)
            .map_err(|e| QuerydeckError::Internal(format!("invalid document schema: {e}")))?;
        Ok(Self {
            validator,
            empty_as_absent,
            sparse_arrays,
            timestamps,
        })
    }

    /// Validates `document`, returning its normalized form.
    pub fn validate(&self, document: &Document) -> Result<Document, ValidationError> {
        let mut violations = Vec::new();
        let normalized = self.normalize(document, &mut violations);

        let instance = Value::Object(normalized);
        for error in self.validator.iter_errors(&instance) {
            let path = pointer_to_path(&error.instance_path.to_string());
            match &error.kind {
                ValidationErrorKind::Required { property } => {
                    let key = property.as_str().unwrap_or_default();
                    violations.push(Violation::new(join(&path, key), "is required"));
                }
                ValidationErrorKind::AdditionalProperties { unexpected } => {
                    for key in unexpected {
                        violations.push(Violation::new(join(&path, key), "is not allowed"));
                    }
                }
                _ => violations.push(Violation::new(path, error.to_string())),
            }
        }

        match instance {
            Value::Object(normalized) if violations.is_empty() => Ok(normalized),
            _ => Err(ValidationError::new(violations)),
        }
    }

    fn normalize(&self, document: &Document, violations: &mut Vec<Violation>) -> Document {
        let mut normalized = document.clone();

        for path in self.empty_as_absent {
            if get_path(&normalized, path) == Some(&Value::String(String::new())) {
                remove_path(&mut normalized, path);
            }
        }

        for path in self.sparse_arrays {
            if let Some(Value::Array(items)) = get_path(&normalized, path) {
                let kept: Vec<Value> = items
                    .iter()
                    .filter(|item| item.as_str() != Some(""))
                    .cloned()
                    .collect();
                set_path(&mut normalized, path, Value::Array(kept));
            }
        }

        for path in self.timestamps {
            let canonical = match get_path(&normalized, path) {
                None => Some(format_timestamp(Utc::now())),
                Some(value) => parse_timestamp(value).map(format_timestamp),
            };
            match canonical {
                Some(timestamp) => set_path(&mut normalized, path, Value::String(timestamp)),
                None => {
                    violations.push(Violation::new(*path, "must be a valid date"));
                    // Reported here; keep the schema pass from repeating it.
                    remove_path(&mut normalized, path);
                }
            }
        }

        normalized
    }
}

/// `/chartConfiguration/chartType` to `chartConfiguration.chartType`.
fn pointer_to_path(pointer: &str) -> String {
    pointer
        .trim_start_matches('/')
        .split('/')
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect::<Vec<_>>()
        .join(".")
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn non_empty_string() -> Value {
    json!({ "type": "string", "minLength": 1 })
}

/// JSON Schema for saved-query documents.
pub fn query_schema_json() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "additionalProperties": false,
        "required": [fields::NAME, fields::CREATED_BY, fields::MODIFIED_BY],
        "properties": {
            "_id": non_empty_string(),
            (fields::NAME): non_empty_string(),
            (fields::TAGS): { "type": "array", "items": non_empty_string() },
            (fields::CONNECTION_ID): non_empty_string(),
            (fields::QUERY_TEXT): non_empty_string(),
            (fields::CHART_CONFIGURATION): {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    (fields::CHART_TYPE): non_empty_string(),
                    (fields::CHART_FIELDS): { "type": "object" }
                }
            },
            (fields::CREATED_DATE): { "type": "string" },
            (fields::MODIFIED_DATE): { "type": "string" },
            (fields::CREATED_BY): non_empty_string(),
            (fields::MODIFIED_BY): non_empty_string(),
            (fields::LAST_ACCESS_DATE): { "type": "string" }
        }
    })
}

const QUERY_EMPTY_AS_ABSENT: &[&str] = &["connectionId", "queryText", "chartConfiguration.chartType"];
const QUERY_SPARSE_ARRAYS: &[&str] = &["tags"];
const QUERY_TIMESTAMPS: &[&str] = &["createdDate", "modifiedDate", "lastAccessDate"];

static QUERY_SCHEMA: LazyLock<Result<Schema, String>> = LazyLock::new(|| {
    Schema::compile(
        &query_schema_json(),
        QUERY_EMPTY_AS_ABSENT,
        QUERY_SPARSE_ARRAYS,
        QUERY_TIMESTAMPS,
    )
    .map_err(|e| e.to_string())
});

/// The compiled saved-query schema.
pub fn query_schema() -> Result<&'static Schema, QuerydeckError> {
    QUERY_SCHEMA
        .as_ref()
        .map_err(|e| QuerydeckError::Internal(e.clone()))
}
