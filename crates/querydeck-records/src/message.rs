// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat announcement for newly saved queries.

use serde_json::{Value, json};

use crate::model::QueryRecord;

/// Formats the announcement text.
///
/// The link target is `{public_url}{base_url}/queries/{id}`; absent values
/// render as empty strings.
pub fn compose_announcement(record: &QueryRecord, public_url: Option<&str>, base_url: Option<&str>) -> String {
    format!(
        "New Query <{}{}/queries/{}|{}> saved by {} on Querydeck ```{}```",
        public_url.unwrap_or_default(),
        base_url.unwrap_or_default(),
        record.id.as_deref().unwrap_or_default(),
        record.name.as_deref().unwrap_or_default(),
        record.modified_by.as_deref().unwrap_or_default(),
        record.query_text.as_deref().unwrap_or_default(),
    )
}

/// Wraps text in an incoming-webhook payload.
pub fn webhook_payload(text: String) -> Value {
    json!({ "text": text })
}
