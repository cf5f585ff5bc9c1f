// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound notification delivery.

use async_trait::async_trait;

use crate::error::QuerydeckError;

/// Delivers JSON payloads to external HTTP endpoints.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// POSTs `body` as JSON to `url`.
    ///
    /// Transport failures and non-success responses are reported as
    /// [`QuerydeckError::Notification`].
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<(), QuerydeckError>;
}
