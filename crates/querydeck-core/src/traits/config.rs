// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only access to named configuration values.

/// Well-known configuration keys.
pub mod keys {
    /// Incoming-webhook URL that receives saved-query announcements.
    pub const SLACK_WEBHOOK: &str = "slackWebhook";
    /// Externally reachable origin used in announcement links.
    pub const PUBLIC_URL: &str = "publicUrl";
    /// Path prefix the application is mounted under.
    pub const BASE_URL: &str = "baseUrl";
}

/// A source of named configuration values.
pub trait ConfigSource: Send + Sync + 'static {
    /// Returns the value for `key`, or `None` when unset.
    ///
    /// Implementations treat empty strings as unset.
    fn get(&self, key: &str) -> Option<String>;
}
