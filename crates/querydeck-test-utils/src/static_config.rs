// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;

use querydeck_core::{ConfigSource, keys};

/// Fixed key/value configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticConfig {
    values: HashMap<String, String>,
}

impl StaticConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a value.
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    /// Config with a webhook plus public and base URLs.
    pub fn with_webhook(webhook: &str) -> Self {
        Self::new()
            .with(keys::SLACK_WEBHOOK, webhook)
            .with(keys::PUBLIC_URL, "https://querydeck.example.com")
            .with(keys::BASE_URL, "/app")
    }
}

impl ConfigSource for StaticConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).filter(|v| !v.is_empty()).cloned()
    }
}
