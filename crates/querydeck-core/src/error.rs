// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Querydeck.

use std::fmt;

use thiserror::Error;

/// The primary error type shared by the store, config, notifier, and record layers.
#[derive(Debug, Error)]
pub enum QuerydeckError {
    /// Configuration errors (invalid TOML, bad values, missing keys).
    #[error("configuration error: {0}")]
    Config(String),

    /// A record failed schema validation. Raised before any store write.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Document store errors (database failure, JSON codec, malformed filter).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Outbound notification failed. Only ever logged, never returned to callers of `save`.
    #[error("notification error: {message}")]
    Notification {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl QuerydeckError {
    /// Wraps any error (or message) as a storage error.
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage {
            source: source.into(),
        }
    }

    /// Returns true if this is a validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a storage failure.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }
}

/// A single schema rule violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path of the offending key (e.g. `chartConfiguration.chartType`).
    pub key: String,
    /// Human-readable description of the failure.
    pub message: String,
}

impl Violation {
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` {}", self.key, self.message)
    }
}

/// Schema validation failure carrying every violation found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {}", summarize(.violations))]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Returns true if any violation concerns the given key.
    pub fn has_violation_for(&self, key: &str) -> bool {
        self.violations.iter().any(|v| v.key == key)
    }
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_every_violation() {
        let err = ValidationError::new(vec![
            Violation::new("name", "is required"),
            Violation::new("createdBy", "must not be empty"),
        ]);
        let rendered = err.to_string();
        assert!(rendered.contains("`name` is required"));
        assert!(rendered.contains("`createdBy` must not be empty"));
        assert!(err.has_violation_for("name"));
        assert!(!err.has_violation_for("tags"));
    }

    #[test]
    fn validation_converts_into_querydeck_error() {
        let err: QuerydeckError = ValidationError::new(vec![Violation::new("name", "is required")]).into();
        assert!(err.is_validation());
        assert!(!err.is_storage());
        assert!(err.to_string().starts_with("validation failed"));
    }

    #[test]
    fn storage_helper_accepts_messages_and_errors() {
        let from_str = QuerydeckError::storage("disk on fire");
        assert!(from_str.is_storage());
        assert_eq!(from_str.to_string(), "storage error: disk on fire");

        let from_io = QuerydeckError::storage(std::io::Error::other("eof"));
        assert!(from_io.to_string().contains("eof"));
    }
}
