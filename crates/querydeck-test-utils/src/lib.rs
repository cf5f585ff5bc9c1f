// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Querydeck.
//!
//! In-memory stand-ins for every collaborator the record layer depends on,
//! for fast, deterministic tests without SQLite or network access.
//!
//! # Components
//!
//! - [`MemoryStore`] - `DocumentStore` over a `Vec`, with write counting and failure injection
//! - [`StaticConfig`] - `ConfigSource` backed by a fixed map
//! - [`RecordingNotifier`] - `Notifier` that captures (or rejects) deliveries

pub mod memory_store;
pub mod notifier;
pub mod static_config;

pub use memory_store::MemoryStore;
pub use notifier::{Delivery, RecordingNotifier};
pub use static_config::StaticConfig;
