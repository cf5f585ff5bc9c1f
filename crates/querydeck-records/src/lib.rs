// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Saved-query records for Querydeck.
//!
//! A [`QueryRecord`] is a saved database query with its chart configuration,
//! tags, and audit timestamps. Records are validated against a JSON Schema
//! ([`schema::query_schema`]) immediately before every write and
//! persisted through a [`QueryRepository`] wired to injected collaborators.

pub mod message;
pub mod model;
pub mod repository;
pub mod schema;

pub use model::{ChartConfiguration, QueryRecord};
pub use repository::{COLLECTION, QueryRepository};
