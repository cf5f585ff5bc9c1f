// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Querydeck.
//!
//! This crate provides the shared error type, the document, filter, and
//! update types, and the collaborator traits (document store, configuration
//! source, notifier) that the record layer is written against.

pub mod error;
pub mod filter;
pub mod traits;
pub mod types;
pub mod update;

// Re-export key items at crate root for ergonomic imports.
pub use error::{QuerydeckError, ValidationError, Violation};
pub use filter::{Condition, ExpressionError, Filter};
pub use types::{Document, HealthStatus, ID_KEY, document_id, new_document_id};
pub use update::{RemoveOptions, Update, UpdateOptions, UpdateOutcome};

pub use traits::config::keys;
pub use traits::{ConfigSource, DocumentStore, Notifier};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn querydeck_error_has_all_variants() {
        let _config = QuerydeckError::Config("test".into());
        let _validation = QuerydeckError::Validation(ValidationError::new(Vec::new()));
        let _storage = QuerydeckError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _notification = QuerydeckError::Notification {
            message: "test".into(),
            source: None,
        };
        let _internal = QuerydeckError::Internal("test".into());
    }

    #[test]
    fn all_traits_are_exported() {
        // Compiles only if every collaborator trait is reachable and object safe.
        fn _assert_store(_: &dyn DocumentStore) {}
        fn _assert_config(_: &dyn ConfigSource) {}
        fn _assert_notifier(_: &dyn Notifier) {}
    }

    #[test]
    fn config_keys_match_the_store_contract() {
        assert_eq!(keys::SLACK_WEBHOOK, "slackWebhook");
        assert_eq!(keys::PUBLIC_URL, "publicUrl");
        assert_eq!(keys::BASE_URL, "baseUrl");
    }
}
