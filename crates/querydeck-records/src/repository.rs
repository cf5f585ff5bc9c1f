// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence operations for saved queries.
//!
//! [`QueryRepository`] is written against the collaborator traits from
//! `querydeck-core`; any store, config source, and notifier can be plugged in.

use std::sync::Arc;

use chrono::Utc;
use querydeck_core::{
    ConfigSource, Document, DocumentStore, Filter, Notifier, QuerydeckError, RemoveOptions, Update,
    UpdateOptions, keys,
};
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info};

use crate::message::{compose_announcement, webhook_payload};
use crate::model::{QueryRecord, fields};
use crate::schema::{format_timestamp, query_schema};

/// Collection holding saved queries.
pub const COLLECTION: &str = "queries";

/// Saves, loads, and removes [`QueryRecord`]s.
#[derive(Clone)]
pub struct QueryRepository {
    store: Arc<dyn DocumentStore>,
    config: Arc<dyn ConfigSource>,
    notifier: Arc<dyn Notifier>,
}

impl QueryRepository {
    /// Creates a repository. `store` should address the [`COLLECTION`] collection.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        config: Arc<dyn ConfigSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            config,
            notifier,
        }
    }

    /// Validates and persists `record`.
    ///
    /// Refreshes `modified_date` and `last_access_date` and cleans `tags` on
    /// `record` itself. Records with an id are upserted and re-read; records
    /// without one are inserted and get their id from the store. Validation
    /// failures return before the store is touched.
    pub async fn save(&self, record: &mut QueryRecord) -> Result<QueryRecord, QuerydeckError> {
        let now = Utc::now();
        record.modified_date = Some(now);
        record.last_access_date = Some(now);
        record.clean_tags();

        let document = query_schema()?.validate(&record.to_document()?)?;

        match record.id.clone() {
            Some(id) => {
                self.store
                    .update(&Filter::by_id(id.as_str()), Update::Replace(document), UpdateOptions::upsert())
                    .await?;
                info!(id = %id, "query updated");
                self.find_one_by_id(&id).await?.ok_or_else(|| {
                    QuerydeckError::Internal(format!("query `{id}` missing after upsert"))
                })
            }
            None => {
                let inserted = self.store.insert(document).await?;
                let saved = QueryRecord::from_document(&inserted);
                info!(id = saved.id.as_deref().unwrap_or_default(), "query created");
                Ok(saved)
            }
        }
    }

    /// Announces `record` on the configured chat webhook, if any.
    ///
    /// Delivery runs on a detached task spawned on the current Tokio
    /// runtime; failures are logged and dropped. Returns the task handle, or
    /// `None` when no webhook is configured or when called outside a runtime,
    /// in which case the announcement is logged as skipped.
    pub fn notify_external_channel(&self, record: &QueryRecord) -> Option<JoinHandle<()>> {
        let webhook = self.config.get(keys::SLACK_WEBHOOK)?;
        let Ok(runtime) = Handle::try_current() else {
            error!(
                id = record.id.as_deref().unwrap_or_default(),
                "no tokio runtime, query announcement skipped"
            );
            return None;
        };
        let public_url = self.config.get(keys::PUBLIC_URL);
        let base_url = self.config.get(keys::BASE_URL);
        let text = compose_announcement(record, public_url.as_deref(), base_url.as_deref());
        let notifier = Arc::clone(&self.notifier);
        let id = record.id.clone().unwrap_or_default();

        let task = async move {
            match notifier.post_json(&webhook, &webhook_payload(text)).await {
                Ok(()) => debug!(id = %id, "query announcement delivered"),
                Err(e) => error!(id = %id, error = %e, "failed to announce saved query"),
            }
        };
        Some(runtime.spawn(task.in_current_span()))
    }

    /// Loads the record with `id`; `None` when it does not exist.
    pub async fn find_one_by_id(&self, id: &str) -> Result<Option<QueryRecord>, QuerydeckError> {
        let document = self.store.find_one(&Filter::by_id(id)).await?;
        Ok(document.as_ref().map(QueryRecord::from_document))
    }

    /// Loads every record in insertion order.
    pub async fn find_all(&self) -> Result<Vec<QueryRecord>, QuerydeckError> {
        self.find_by_filter(&Filter::all()).await
    }

    /// Loads every record matching `filter`, passed to the store as is.
    pub async fn find_by_filter(&self, filter: &Filter) -> Result<Vec<QueryRecord>, QuerydeckError> {
        let documents = self.store.find(filter).await?;
        debug!(found = documents.len(), "queries loaded");
        Ok(documents.iter().map(QueryRecord::from_document).collect())
    }

    /// Stamps the stored record's `lastAccessedDate` with the current time.
    ///
    /// Touches no other field and never creates a record. A record without
    /// an id has nothing stored to stamp.
    pub async fn log_access(&self, record: &QueryRecord) -> Result<(), QuerydeckError> {
        let Some(id) = record.id.as_deref() else {
            debug!("access not logged for unsaved query");
            return Ok(());
        };
        let mut set = Document::new();
        set.insert(
            fields::LAST_ACCESSED_DATE.to_string(),
            Value::String(format_timestamp(Utc::now())),
        );
        let outcome = self
            .store
            .update(&Filter::by_id(id), Update::set(set), UpdateOptions::default())
            .await?;
        debug!(id = %id, matched = outcome.matched, "query access logged");
        Ok(())
    }

    /// Removes the record with `id`. Missing ids are not an error.
    pub async fn remove_one_by_id(&self, id: &str) -> Result<(), QuerydeckError> {
        let removed = self
            .store
            .remove(&Filter::by_id(id), RemoveOptions::default())
            .await?;
        info!(id = %id, removed, "query removed");
        Ok(())
    }

    /// Removes every record and returns how many were deleted.
    pub async fn remove_all(&self) -> Result<usize, QuerydeckError> {
        let removed = self.store.remove(&Filter::all(), RemoveOptions::multi()).await?;
        info!(removed, "all queries removed");
        Ok(removed)
    }
}
