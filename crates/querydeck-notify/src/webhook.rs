// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON webhook client.

use std::time::Duration;

use async_trait::async_trait;
use querydeck_config::model::NotificationConfig;
use querydeck_core::{Notifier, QuerydeckError};
use tracing::debug;

/// Upper bound on how much of an error response body is kept in messages.
const MAX_ERROR_BODY: usize = 256;

/// Posts JSON bodies to webhook URLs.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
}

impl WebhookNotifier {
    /// Creates a notifier whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, QuerydeckError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| QuerydeckError::Notification {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self { client })
    }

    /// Creates a notifier from the `[notifications]` config section.
    pub fn from_config(config: &NotificationConfig) -> Result<Self, QuerydeckError> {
        Self::new(Duration::from_secs(config.timeout_secs))
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<(), QuerydeckError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| QuerydeckError::Notification {
                message: format!("webhook request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, "webhook response received");
        if status.is_success() {
            return Ok(());
        }

        let mut text = response.text().await.unwrap_or_default();
        if text.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
            text.truncate(cut);
        }
        Err(QuerydeckError::Notification {
            message: format!("webhook returned {status}: {text}"),
            source: None,
        })
    }
}
