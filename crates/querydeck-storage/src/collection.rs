// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed [`DocumentStore`] for a single named collection.
//!
//! Documents live in the shared `documents` table as JSON bodies keyed by
//! `(collection, id)`. Filters with an `_id` equality are narrowed in SQL;
//! everything else is evaluated in Rust after a collection scan. Rowid order
//! doubles as insertion order.

use async_trait::async_trait;
use querydeck_core::{
    Document, DocumentStore, Filter, ID_KEY, QuerydeckError, RemoveOptions, Update, UpdateOptions,
    UpdateOutcome,
};
use rusqlite::types::Type;
use rusqlite::{Connection, params};
use serde_json::Value;
use tracing::debug;

use crate::database::{Database, map_tr_err};

/// Handle to one collection. Cheap to clone.
#[derive(Clone)]
pub struct SqliteCollection {
    db: Database,
    name: String,
}

impl SqliteCollection {
    pub fn new(db: Database, name: impl Into<String>) -> Self {
        Self {
            db,
            name: name.into(),
        }
    }
}

fn decode(body: &str) -> Result<Document, rusqlite::Error> {
    serde_json::from_str(body)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

fn encode(document: &Document) -> Result<String, rusqlite::Error> {
    serde_json::to_string(document).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

/// Loads `(id, document)` pairs for a collection in insertion order,
/// optionally narrowed to a single id.
fn scan(
    conn: &Connection,
    collection: &str,
    id: Option<&str>,
) -> Result<Vec<(String, Document)>, rusqlite::Error> {
    let rows: Vec<(String, String)> = match id {
        Some(id) => {
            let mut stmt = conn.prepare(
                "SELECT id, body FROM documents WHERE collection = ?1 AND id = ?2",
            )?;
            stmt.query_map(params![collection, id], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<Result<_, _>>()?
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT id, body FROM documents WHERE collection = ?1 ORDER BY rowid",
            )?;
            stmt.query_map(params![collection], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<Result<_, _>>()?
        }
    };
    rows.into_iter()
        .map(|(id, body)| Ok((id, decode(&body)?)))
        .collect()
}

fn scan_matching(
    conn: &Connection,
    collection: &str,
    filter: &Filter,
) -> Result<Vec<(String, Document)>, rusqlite::Error> {
    let mut rows = scan(conn, collection, filter.id_equality())?;
    rows.retain(|(_, doc)| filter.matches(doc));
    Ok(rows)
}

fn insert_row(
    conn: &Connection,
    collection: &str,
    id: &str,
    document: &Document,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3)",
        params![collection, id, encode(document)?],
    )?;
    Ok(())
}

/// Ensures the document has a string `_id`, generating one when absent.
fn assign_id(document: &mut Document) -> Result<String, QuerydeckError> {
    match document.get(ID_KEY) {
        Some(Value::String(id)) => Ok(id.clone()),
        None => {
            let id = querydeck_core::new_document_id();
            document.insert(ID_KEY.to_string(), Value::String(id.clone()));
            Ok(id)
        }
        Some(_) => Err(QuerydeckError::storage("document `_id` must be a string")),
    }
}

#[async_trait]
impl DocumentStore for SqliteCollection {
    fn collection(&self) -> &str {
        &self.name
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, QuerydeckError> {
        Ok(self.find(filter).await?.into_iter().next())
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<Document>, QuerydeckError> {
        let collection = self.name.clone();
        let filter = filter.clone();
        let docs = self
            .db
            .connection()
            .call(move |conn| -> Result<Vec<Document>, rusqlite::Error> {
                Ok(scan_matching(conn, &collection, &filter)?
                    .into_iter()
                    .map(|(_, doc)| doc)
                    .collect())
            })
            .await
            .map_err(map_tr_err)?;
        debug!(collection = %self.name, found = docs.len(), "find");
        Ok(docs)
    }

    async fn insert(&self, mut document: Document) -> Result<Document, QuerydeckError> {
        let id = assign_id(&mut document)?;
        let collection = self.name.clone();
        let document = self
            .db
            .connection()
            .call(move |conn| -> Result<Document, rusqlite::Error> {
                insert_row(conn, &collection, &id, &document)?;
                Ok(document)
            })
            .await
            .map_err(map_tr_err)?;
        debug!(collection = %self.name, "document inserted");
        Ok(document)
    }

    async fn update(
        &self,
        filter: &Filter,
        update: Update,
        options: UpdateOptions,
    ) -> Result<UpdateOutcome, QuerydeckError> {
        let collection = self.name.clone();
        let filter = filter.clone();
        let outcome = self
            .db
            .connection()
            .call(move |conn| -> Result<UpdateOutcome, rusqlite::Error> {
                let tx = conn.transaction()?;
                let mut outcome = UpdateOutcome::default();
                for (id, existing) in scan_matching(&tx, &collection, &filter)? {
                    let updated = update.apply(&existing);
                    tx.execute(
                        "UPDATE documents SET body = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') \
                         WHERE collection = ?2 AND id = ?3",
                        params![encode(&updated)?, collection, id],
                    )?;
                    outcome.matched += 1;
                    if !options.multi {
                        break;
                    }
                }
                if outcome.matched == 0 && options.upsert {
                    let document = update.upsert_document(&filter);
                    if let Some(id) = querydeck_core::document_id(&document) {
                        insert_row(&tx, &collection, id, &document)?;
                        outcome.upserted_id = Some(id.to_string());
                    }
                }
                tx.commit()?;
                Ok(outcome)
            })
            .await
            .map_err(map_tr_err)?;
        debug!(
            collection = %self.name,
            matched = outcome.matched,
            upserted = outcome.upserted_id.is_some(),
            "update"
        );
        Ok(outcome)
    }

    async fn remove(&self, filter: &Filter, options: RemoveOptions) -> Result<usize, QuerydeckError> {
        let collection = self.name.clone();
        let filter = filter.clone();
        let removed = self
            .db
            .connection()
            .call(move |conn| -> Result<usize, rusqlite::Error> {
                if options.multi && filter == Filter::all() {
                    return conn.execute(
                        "DELETE FROM documents WHERE collection = ?1",
                        params![collection],
                    );
                }
                let tx = conn.transaction()?;
                let mut removed = 0;
                for (id, _) in scan_matching(&tx, &collection, &filter)? {
                    removed += tx.execute(
                        "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                        params![collection, id],
                    )?;
                    if !options.multi {
                        break;
                    }
                }
                tx.commit()?;
                Ok(removed)
            })
            .await
            .map_err(map_tr_err)?;
        debug!(collection = %self.name, removed, "remove");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    async fn collection() -> SqliteCollection {
        let db = Database::open_in_memory().await.unwrap();
        SqliteCollection::new(db, "queries")
    }

    #[tokio::test]
    async fn insert_assigns_missing_ids() {
        let c = collection().await;
        let stored = c.insert(doc(json!({"name": "Q1"}))).await.unwrap();
        assert!(querydeck_core::document_id(&stored).is_some());
    }

    #[tokio::test]
    async fn insert_rejects_non_string_ids() {
        let c = collection().await;
        let err = c.insert(doc(json!({"_id": 7}))).await.unwrap_err();
        assert!(err.is_storage());
    }

    #[tokio::test]
    async fn duplicate_insert_fails() {
        let c = collection().await;
        c.insert(doc(json!({"_id": "q1"}))).await.unwrap();
        let err = c.insert(doc(json!({"_id": "q1"}))).await.unwrap_err();
        assert!(err.is_storage());
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let db = Database::open_in_memory().await.unwrap();
        let queries = SqliteCollection::new(db.clone(), "queries");
        let other = SqliteCollection::new(db, "dashboards");
        queries.insert(doc(json!({"_id": "shared"}))).await.unwrap();
        other.insert(doc(json!({"_id": "shared"}))).await.unwrap();

        assert_eq!(other.remove(&Filter::all(), RemoveOptions::multi()).await.unwrap(), 1);
        assert_eq!(queries.find(&Filter::all()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn find_returns_insertion_order() {
        let c = collection().await;
        for id in ["z", "a", "m"] {
            c.insert(doc(json!({"_id": id}))).await.unwrap();
        }
        let ids: Vec<String> = c
            .find(&Filter::all())
            .await
            .unwrap()
            .iter()
            .filter_map(|d| querydeck_core::document_id(d).map(str::to_string))
            .collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }

    #[tokio::test]
    async fn single_remove_only_deletes_first_match() {
        let c = collection().await;
        c.insert(doc(json!({"_id": "a", "createdBy": "ana"}))).await.unwrap();
        c.insert(doc(json!({"_id": "b", "createdBy": "ana"}))).await.unwrap();
        let removed = c
            .remove(&Filter::eq("createdBy", "ana"), RemoveOptions::default())
            .await
            .unwrap();
        assert_eq!(removed, 1);
        let left = c.find(&Filter::all()).await.unwrap();
        assert_eq!(querydeck_core::document_id(&left[0]), Some("b"));
    }
}
