// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde attributes cannot express: non-empty
//! paths, URL schemes, path prefixes, and known log levels.

use crate::diagnostic::ConfigError;
use crate::model::QuerydeckConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validates a deserialized configuration.
///
/// Collects every problem instead of stopping at the first one.
pub fn validate_config(config: &QuerydeckConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    let notifications = &config.notifications;
    if let Some(webhook) = notifications.slack_webhook.as_deref()
        && !webhook.is_empty()
        && !is_http_url(webhook)
    {
        fail(format!(
            "notifications.slack_webhook `{webhook}` must be an http:// or https:// URL"
        ));
    }

    if let Some(public_url) = notifications.public_url.as_deref()
        && !public_url.is_empty()
    {
        if !is_http_url(public_url) {
            fail(format!(
                "notifications.public_url `{public_url}` must be an http:// or https:// URL"
            ));
        } else if public_url.ends_with('/') {
            fail(format!(
                "notifications.public_url `{public_url}` must not end with `/`"
            ));
        }
    }

    if let Some(base_url) = notifications.base_url.as_deref()
        && !base_url.is_empty()
        && !base_url.starts_with('/')
    {
        fail(format!(
            "notifications.base_url `{base_url}` must be empty or start with `/`"
        ));
    }

    if notifications.timeout_secs == 0 {
        fail("notifications.timeout_secs must be at least 1".to_string());
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        fail(format!(
            "logging.level `{}` is not one of: {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(value: &str) -> bool {
    ["http://", "https://"]
        .iter()
        .any(|scheme| value.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()))
}
