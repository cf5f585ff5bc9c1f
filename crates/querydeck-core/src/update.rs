// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Update expressions and write options.

use serde_json::Value;

use crate::filter::{ExpressionError, Filter};
use crate::types::{Document, ID_KEY, document_id, new_document_id, remove_path, set_path};

/// How matched documents are rewritten.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Replace the whole document, keeping its `_id`.
    Replace(Document),
    /// Set and unset individual (possibly dotted) paths.
    Modify { set: Document, unset: Vec<String> },
}

impl Update {
    /// A `$set` of the given keys.
    pub fn set(fields: Document) -> Self {
        Update::Modify {
            set: fields,
            unset: Vec::new(),
        }
    }

    /// Parses `{"$set": {...}, "$unset": {...}}` or a plain replacement document.
    pub fn parse(value: &Value) -> Result<Self, ExpressionError> {
        let object = value
            .as_object()
            .ok_or(ExpressionError::NotAnObject("a non-object value"))?;

        let modifiers = object.keys().filter(|k| k.starts_with('$')).count();
        if modifiers == 0 {
            return Ok(Update::Replace(object.clone()));
        }
        if modifiers != object.len() {
            return Err(ExpressionError::MixedOperators("<update>".to_string()));
        }

        let mut set = Document::new();
        let mut unset = Vec::new();
        for (op, arg) in object {
            let fields = arg
                .as_object()
                .ok_or_else(|| ExpressionError::InvalidOperand {
                    operator: op.clone(),
                    expected: "an object",
                })?;
            if fields.contains_key(ID_KEY) {
                return Err(ExpressionError::ImmutableId);
            }
            match op.as_str() {
                "$set" => set.extend(fields.clone()),
                "$unset" => unset.extend(fields.keys().cloned()),
                other => return Err(ExpressionError::UnknownOperator(other.to_string())),
            }
        }
        Ok(Update::Modify { set, unset })
    }

    /// Applies this update to an existing document.
    ///
    /// The existing `_id` always survives; `_id` keys in the update are ignored.
    pub fn apply(&self, existing: &Document) -> Document {
        let mut updated = match self {
            Update::Replace(replacement) => replacement.clone(),
            Update::Modify { set, unset } => {
                let mut updated = existing.clone();
                for (path, value) in set {
                    if path != ID_KEY {
                        set_path(&mut updated, path, value.clone());
                    }
                }
                for path in unset {
                    if path != ID_KEY {
                        remove_path(&mut updated, path);
                    }
                }
                updated
            }
        };
        match existing.get(ID_KEY) {
            Some(id) => {
                updated.insert(ID_KEY.to_string(), id.clone());
            }
            None => {
                updated.remove(ID_KEY);
            }
        }
        updated
    }

    /// Builds the document inserted by an upsert that matched nothing.
    ///
    /// The `_id` comes from the update itself, then from an `_id` equality in
    /// the filter, and is freshly generated otherwise.
    pub fn upsert_document(&self, filter: &Filter) -> Document {
        let mut document = match self {
            Update::Replace(replacement) => replacement.clone(),
            Update::Modify { set, .. } => document_from_paths(set),
        };
        if document_id(&document).is_none() {
            let id = filter
                .id_equality()
                .map(str::to_string)
                .unwrap_or_else(new_document_id);
            document.insert(ID_KEY.to_string(), Value::String(id));
        }
        document
    }
}

fn document_from_paths(set: &Document) -> Document {
    let mut document = Document::new();
    for (path, value) in set {
        set_path(&mut document, path, value.clone());
    }
    document
}

/// Options for [`crate::DocumentStore::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Insert a document when nothing matches.
    pub upsert: bool,
    /// Update every match instead of only the first.
    pub multi: bool,
}

impl UpdateOptions {
    pub fn upsert() -> Self {
        Self {
            upsert: true,
            multi: false,
        }
    }
}

/// Options for [`crate::DocumentStore::remove`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoveOptions {
    /// Remove every match instead of only the first.
    pub multi: bool,
}

impl RemoveOptions {
    pub fn multi() -> Self {
        Self { multi: true }
    }
}

/// Result of an update call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Number of existing documents rewritten.
    pub matched: usize,
    /// Identifier of the inserted document when the update upserted.
    pub upserted_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn plain_object_parses_as_replacement() {
        let update = Update::parse(&json!({"name": "Q2"})).unwrap();
        assert_eq!(update, Update::Replace(doc(json!({"name": "Q2"}))));
    }

    #[test]
    fn modifiers_parse_into_set_and_unset() {
        let update = Update::parse(&json!({"$set": {"name": "Q2"}, "$unset": {"queryText": true}})).unwrap();
        assert_eq!(
            update,
            Update::Modify {
                set: doc(json!({"name": "Q2"})),
                unset: vec!["queryText".to_string()],
            }
        );
    }

    #[test]
    fn malformed_updates_are_rejected() {
        assert!(matches!(
            Update::parse(&json!({"$set": {"a": 1}, "b": 2})),
            Err(ExpressionError::MixedOperators(_))
        ));
        assert_eq!(
            Update::parse(&json!({"$inc": {"a": 1}})),
            Err(ExpressionError::UnknownOperator("$inc".into()))
        );
        assert_eq!(
            Update::parse(&json!({"$set": {"_id": "x"}})),
            Err(ExpressionError::ImmutableId)
        );
        assert!(Update::parse(&json!("nope")).is_err());
    }

    #[test]
    fn replace_keeps_the_existing_id() {
        let existing = doc(json!({"_id": "q1", "name": "old", "queryText": "select 1"}));
        let updated = Update::Replace(doc(json!({"_id": "other", "name": "new"}))).apply(&existing);
        assert_eq!(updated, doc(json!({"_id": "q1", "name": "new"})));
    }

    #[test]
    fn modify_touches_only_listed_paths() {
        let existing = doc(json!({"_id": "q1", "name": "old", "queryText": "select 1"}));
        let update = Update::Modify {
            set: doc(json!({"lastAccessedDate": "2026-01-01T00:00:00Z", "chartConfiguration.chartType": "bar"})),
            unset: vec!["queryText".into()],
        };
        let updated = update.apply(&existing);
        assert_eq!(
            updated,
            doc(json!({
                "_id": "q1",
                "name": "old",
                "lastAccessedDate": "2026-01-01T00:00:00Z",
                "chartConfiguration": {"chartType": "bar"}
            }))
        );
    }

    #[test]
    fn upsert_document_takes_id_from_update_then_filter() {
        let replacement = Update::Replace(doc(json!({"_id": "from-doc", "name": "x"})));
        assert_eq!(
            document_id(&replacement.upsert_document(&Filter::by_id("from-filter"))),
            Some("from-doc")
        );

        let replacement = Update::Replace(doc(json!({"name": "x"})));
        assert_eq!(
            document_id(&replacement.upsert_document(&Filter::by_id("from-filter"))),
            Some("from-filter")
        );

        let generated = replacement.upsert_document(&Filter::all());
        assert!(document_id(&generated).is_some());
    }

    #[test]
    fn modify_upsert_builds_document_from_set() {
        let update = Update::set(doc(json!({"name": "fresh"})));
        let inserted = update.upsert_document(&Filter::by_id("q9"));
        assert_eq!(inserted, doc(json!({"_id": "q9", "name": "fresh"})));
    }
}
