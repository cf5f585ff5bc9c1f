// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Querydeck.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key fails
//! at startup instead of being silently ignored.

use querydeck_core::keys;
use querydeck_core::ConfigSource;
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

/// Top-level Querydeck configuration.
///
/// Every section is optional and falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QuerydeckConfig {
    /// Document store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Saved-query announcement settings.
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("querydeck").join("querydeck.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("querydeck.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Webhook announcement configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationConfig {
    /// Incoming-webhook URL. `None` disables announcements.
    #[serde(default)]
    pub slack_webhook: Option<String>,

    /// Public origin used to build links, e.g. `https://querydeck.example.com`.
    #[serde(default)]
    pub public_url: Option<String>,

    /// Path prefix the app is served under, e.g. `/querydeck`.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout for webhook delivery, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            slack_webhook: None,
            public_url: None,
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

/// Log output configuration.
///
/// Querydeck libraries only emit `tracing` events; the embedding application
/// installs the subscriber and reads [`LoggingConfig::level_filter`] for it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Level filter (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    /// The configured level as a `tracing` filter, `INFO` when unparsable.
    pub fn level_filter(&self) -> LevelFilter {
        self.level.trim().parse().unwrap_or(LevelFilter::INFO)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ConfigSource for QuerydeckConfig {
    fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            keys::SLACK_WEBHOOK => self.notifications.slack_webhook.as_ref(),
            keys::PUBLIC_URL => self.notifications.public_url.as_ref(),
            keys::BASE_URL => self.notifications.base_url.as_ref(),
            _ => None,
        };
        value.filter(|v| !v.is_empty()).cloned()
    }
}
