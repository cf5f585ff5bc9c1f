// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions.
//!
//! The record layer never reaches for process-wide state: a document store,
//! a configuration source, and a notifier are injected as trait objects.
//! Async traits use `#[async_trait]` for dynamic dispatch compatibility.

pub mod config;
pub mod notifier;
pub mod store;

pub use config::ConfigSource;
pub use notifier::Notifier;
pub use store::DocumentStore;
