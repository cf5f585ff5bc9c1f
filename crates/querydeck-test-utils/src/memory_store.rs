// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory document store for deterministic tests.
//!
//! `MemoryStore` keeps documents in insertion order, counts successful
//! writes, and can be switched into a failing mode to exercise error paths.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use querydeck_core::{
    Document, DocumentStore, Filter, ID_KEY, QuerydeckError, RemoveOptions, Update, UpdateOptions,
    UpdateOutcome, document_id, new_document_id,
};
use serde_json::Value;
use tokio::sync::Mutex;

/// A `DocumentStore` backed by a `Vec`.
#[derive(Clone)]
pub struct MemoryStore {
    name: String,
    documents: Arc<Mutex<Vec<Document>>>,
    writes: Arc<AtomicUsize>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Creates an empty store for the named collection.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            documents: Arc::new(Mutex::new(Vec::new())),
            writes: Arc::new(AtomicUsize::new(0)),
            fail_reads: Arc::new(AtomicBool::new(false)),
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Number of insert/update/remove calls that reached the store.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Makes subsequent reads fail with a storage error.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent writes fail with a storage error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of every stored document.
    pub async fn documents(&self) -> Vec<Document> {
        self.documents.lock().await.clone()
    }

    fn check_read(&self) -> Result<(), QuerydeckError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(QuerydeckError::storage("injected read failure"));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), QuerydeckError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(QuerydeckError::storage("injected write failure"));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn collection(&self) -> &str {
        &self.name
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, QuerydeckError> {
        self.check_read()?;
        let documents = self.documents.lock().await;
        Ok(documents.iter().find(|d| filter.matches(d)).cloned())
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<Document>, QuerydeckError> {
        self.check_read()?;
        let documents = self.documents.lock().await;
        Ok(documents.iter().filter(|d| filter.matches(d)).cloned().collect())
    }

    async fn insert(&self, mut document: Document) -> Result<Document, QuerydeckError> {
        self.check_write()?;
        let mut documents = self.documents.lock().await;
        let id = match document.get(ID_KEY) {
            Some(Value::String(id)) => id.clone(),
            None => new_document_id(),
            Some(_) => return Err(QuerydeckError::storage("document `_id` must be a string")),
        };
        if documents.iter().any(|d| document_id(d) == Some(id.as_str())) {
            return Err(QuerydeckError::storage(format!("duplicate id `{id}`")));
        }
        document.insert(ID_KEY.to_string(), Value::String(id));
        documents.push(document.clone());
        Ok(document)
    }

    async fn update(
        &self,
        filter: &Filter,
        update: Update,
        options: UpdateOptions,
    ) -> Result<UpdateOutcome, QuerydeckError> {
        self.check_write()?;
        let mut documents = self.documents.lock().await;
        let mut outcome = UpdateOutcome::default();
        for document in documents.iter_mut().filter(|d| filter.matches(d)) {
            *document = update.apply(document);
            outcome.matched += 1;
            if !options.multi {
                break;
            }
        }
        if outcome.matched == 0 && options.upsert {
            let document = update.upsert_document(filter);
            outcome.upserted_id = document_id(&document).map(str::to_string);
            documents.push(document);
        }
        Ok(outcome)
    }

    async fn remove(&self, filter: &Filter, options: RemoveOptions) -> Result<usize, QuerydeckError> {
        self.check_write()?;
        let mut documents = self.documents.lock().await;
        if options.multi {
            let before = documents.len();
            documents.retain(|d| !filter.matches(d));
            return Ok(before - documents.len());
        }
        match documents.iter().position(|d| filter.matches(d)) {
            Some(index) => {
                documents.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn counts_writes_but_not_reads() {
        let store = MemoryStore::new("queries");
        store.insert(doc(json!({"name": "a"}))).await.unwrap();
        store.find(&Filter::all()).await.unwrap();
        store.remove(&Filter::all(), RemoveOptions::multi()).await.unwrap();
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn injected_failures_surface_as_storage_errors() {
        let store = MemoryStore::new("queries");
        store.fail_writes(true);
        assert!(store.insert(doc(json!({}))).await.unwrap_err().is_storage());
        assert_eq!(store.write_count(), 0);

        store.fail_reads(true);
        assert!(store.find(&Filter::all()).await.unwrap_err().is_storage());
    }

    #[tokio::test]
    async fn upsert_and_replace_follow_store_contract() {
        let store = MemoryStore::new("queries");
        let outcome = store
            .update(
                &Filter::by_id("q1"),
                Update::Replace(doc(json!({"name": "one"}))),
                UpdateOptions::upsert(),
            )
            .await
            .unwrap();
        assert_eq!(outcome.upserted_id.as_deref(), Some("q1"));

        store
            .update(
                &Filter::by_id("q1"),
                Update::Replace(doc(json!({"name": "two"}))),
                UpdateOptions::upsert(),
            )
            .await
            .unwrap();
        assert_eq!(store.documents().await, vec![doc(json!({"_id": "q1", "name": "two"}))]);
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let store = MemoryStore::new("queries");
        store.insert(doc(json!({"_id": "x"}))).await.unwrap();
        assert!(store.insert(doc(json!({"_id": "x"}))).await.is_err());
    }
}
