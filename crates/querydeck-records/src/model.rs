// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The saved-query record and its document mapping.

use chrono::{DateTime, Utc};
use querydeck_core::{Document, ID_KEY, QuerydeckError};
use serde::Serialize;
use serde_json::Value;

/// Document keys used by [`QueryRecord`].
pub mod fields {
    pub const NAME: &str = "name";
    pub const TAGS: &str = "tags";
    pub const CONNECTION_ID: &str = "connectionId";
    pub const QUERY_TEXT: &str = "queryText";
    pub const CHART_CONFIGURATION: &str = "chartConfiguration";
    pub const CHART_TYPE: &str = "chartType";
    pub const CHART_FIELDS: &str = "fields";
    pub const CREATED_DATE: &str = "createdDate";
    pub const MODIFIED_DATE: &str = "modifiedDate";
    pub const CREATED_BY: &str = "createdBy";
    pub const MODIFIED_BY: &str = "modifiedBy";
    /// Written by `save`.
    pub const LAST_ACCESS_DATE: &str = "lastAccessDate";
    /// Written by `log_access` and read at construction.
    pub const LAST_ACCESSED_DATE: &str = "lastAccessedDate";
}

/// Chart settings attached to a saved query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<String>,
    /// Chart property to result column, e.g. `{"x": "created_month"}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Document>,
    /// Unknown keys and wrongly typed values, kept for validation.
    #[serde(skip)]
    pub unparsed: Document,
}

/// A saved database query with chart settings, tags, and audit timestamps.
///
/// Instances are built leniently from raw documents and only validated when
/// saved, so required fields are optional here. Values that do not fit their
/// field are kept in `unparsed` and written back by [`to_document`], which
/// lets `save` reject them.
///
/// [`to_document`]: QueryRecord::to_document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Raw tag entries. Saving keeps only trimmed, non-empty strings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_configuration: Option<ChartConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_access_date: Option<DateTime<Utc>>,
    /// Known keys whose values had the wrong shape, kept for validation.
    #[serde(skip)]
    pub unparsed: Document,
}

/// Parses an RFC 3339 string or epoch milliseconds.
pub(crate) fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

/// Typed reads that set aside values of the wrong shape.
struct Reader<'a> {
    document: &'a Document,
    unparsed: Document,
}

impl<'a> Reader<'a> {
    fn new(document: &'a Document) -> Self {
        Self {
            document,
            unparsed: Document::new(),
        }
    }

    fn read<T>(&mut self, key: &str, convert: impl FnOnce(&'a Value) -> Option<T>) -> Option<T> {
        let value = self.document.get(key)?;
        let converted = convert(value);
        if converted.is_none() {
            self.unparsed.insert(key.to_string(), value.clone());
        }
        converted
    }

    fn string(&mut self, key: &str) -> Option<String> {
        self.read(key, |v| v.as_str().map(str::to_string))
    }

    fn timestamp(&mut self, key: &str) -> Option<DateTime<Utc>> {
        self.read(key, parse_timestamp)
    }

    fn array(&mut self, key: &str) -> Option<Vec<Value>> {
        self.read(key, |v| v.as_array().cloned())
    }

    fn object(&mut self, key: &str) -> Option<&'a Document> {
        self.read(key, Value::as_object)
    }
}

impl ChartConfiguration {
    fn from_document(document: &Document) -> Self {
        let mut reader = Reader::new(document);
        let chart_type = reader.string(fields::CHART_TYPE);
        let chart_fields = reader.object(fields::CHART_FIELDS).cloned();
        let mut unparsed = reader.unparsed;
        for (key, value) in document {
            if key != fields::CHART_TYPE && key != fields::CHART_FIELDS {
                unparsed.insert(key.clone(), value.clone());
            }
        }
        Self {
            chart_type,
            fields: chart_fields,
            unparsed,
        }
    }
}

impl QueryRecord {
    /// Builds a record from an arbitrary document without validating it.
    ///
    /// Unknown top-level keys are ignored. Known keys holding values of the
    /// wrong type are kept in `unparsed`, as are unknown chart keys. The
    /// last-access time comes from `lastAccessedDate`, the key maintained by
    /// access logging; `lastAccessDate` as written by `save` is not read.
    pub fn from_document(document: &Document) -> Self {
        let mut reader = Reader::new(document);
        Self {
            id: reader.string(ID_KEY),
            name: reader.string(fields::NAME),
            tags: reader.array(fields::TAGS),
            connection_id: reader.string(fields::CONNECTION_ID),
            query_text: reader.string(fields::QUERY_TEXT),
            chart_configuration: reader
                .object(fields::CHART_CONFIGURATION)
                .map(ChartConfiguration::from_document),
            created_date: reader.timestamp(fields::CREATED_DATE),
            modified_date: reader.timestamp(fields::MODIFIED_DATE),
            created_by: reader.string(fields::CREATED_BY),
            modified_by: reader.string(fields::MODIFIED_BY),
            // Written by access logging only, so a bad value is not kept.
            last_access_date: document
                .get(fields::LAST_ACCESSED_DATE)
                .and_then(parse_timestamp),
            unparsed: reader.unparsed,
        }
    }

    /// Serializes the present fields into a document.
    ///
    /// `unparsed` entries are written back under their keys unless a typed
    /// field now holds that key.
    pub fn to_document(&self) -> Result<Document, QuerydeckError> {
        let mut document = match serde_json::to_value(self) {
            Ok(Value::Object(document)) => document,
            Ok(other) => {
                return Err(QuerydeckError::Internal(format!(
                    "query record serialized to non-object {other}"
                )));
            }
            Err(e) => {
                return Err(QuerydeckError::Internal(format!(
                    "failed to serialize query record: {e}"
                )));
            }
        };

        if let Some(chart) = &self.chart_configuration
            && let Some(Value::Object(target)) = document.get_mut(fields::CHART_CONFIGURATION)
        {
            merge_absent(target, &chart.unparsed);
        }
        merge_absent(&mut document, &self.unparsed);
        Ok(document)
    }

    /// Tag entries that are strings, as stored.
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags
            .iter()
            .flatten()
            .filter_map(Value::as_str)
            .collect()
    }

    /// Drops non-string and blank tags and trims the rest, keeping order.
    pub fn clean_tags(&mut self) {
        if let Some(tags) = &mut self.tags {
            *tags = clean_tags(tags);
        }
    }
}

fn merge_absent(target: &mut Document, extra: &Document) {
    for (key, value) in extra {
        if !target.contains_key(key) {
            target.insert(key.clone(), value.clone());
        }
    }
}

/// Keeps string entries that are non-empty after trimming, in their trimmed form.
pub fn clean_tags(tags: &[Value]) -> Vec<Value> {
    tags.iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(|tag| Value::String(tag.to_string()))
        .collect()
}
