// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for Querydeck.
//!
//! Provides a WAL-mode SQLite document store with embedded migrations and a
//! single-writer concurrency model via `tokio-rusqlite`. Each collection is
//! exposed as a [`querydeck_core::DocumentStore`].

pub mod adapter;
pub mod collection;
pub mod database;
pub mod migrations;

pub use adapter::SqliteStore;
pub use collection::SqliteCollection;
pub use database::Database;
