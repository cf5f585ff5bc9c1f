// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document store trait for schema-less persistence backends.

use async_trait::async_trait;

use crate::error::QuerydeckError;
use crate::filter::Filter;
use crate::types::Document;
use crate::update::{RemoveOptions, Update, UpdateOptions, UpdateOutcome};

/// A single named collection inside a document store.
///
/// Documents are JSON objects addressed by filters. Every document carries a
/// string `_id`; implementations assign one on insert when absent.
/// Concurrency control is the implementation's concern: callers issue
/// independent calls and observe last-write-wins on conflicting writes.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Name of the collection this handle addresses.
    fn collection(&self) -> &str;

    /// Returns the first document matching the filter, in insertion order.
    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, QuerydeckError>;

    /// Returns every document matching the filter, in insertion order.
    async fn find(&self, filter: &Filter) -> Result<Vec<Document>, QuerydeckError>;

    /// Inserts a document and returns it as stored (including its `_id`).
    ///
    /// Inserting an `_id` that already exists is an error.
    async fn insert(&self, document: Document) -> Result<Document, QuerydeckError>;

    /// Rewrites the first (or, with `multi`, every) matching document.
    ///
    /// With `upsert` and no match, inserts [`Update::upsert_document`].
    async fn update(
        &self,
        filter: &Filter,
        update: Update,
        options: UpdateOptions,
    ) -> Result<UpdateOutcome, QuerydeckError>;

    /// Removes the first (or, with `multi`, every) matching document and
    /// returns how many were removed. Matching nothing is not an error.
    async fn remove(&self, filter: &Filter, options: RemoveOptions) -> Result<usize, QuerydeckError>;
}
