// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notifier double that captures every delivery attempt.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use querydeck_core::{Notifier, QuerydeckError};
use serde_json::Value;
use tokio::sync::{Mutex, Notify};

/// One captured `post_json` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub url: String,
    pub body: Value,
}

/// Captures deliveries; optionally fails every one of them.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    deliveries: Arc<Mutex<Vec<Delivery>>>,
    notify: Arc<Notify>,
    failure: Option<String>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier that records each attempt and then fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// All attempts so far, in order.
    pub async fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().await.clone()
    }

    /// Waits until at least `count` attempts were made or `timeout` elapses.
    ///
    /// Returns the attempts seen at that point.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<Delivery> {
        let _ = tokio::time::timeout(timeout, async {
            loop {
                let notified = self.notify.notified();
                if self.deliveries.lock().await.len() >= count {
                    return;
                }
                notified.await;
            }
        })
        .await;
        self.deliveries().await
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn post_json(&self, url: &str, body: &Value) -> Result<(), QuerydeckError> {
        self.deliveries.lock().await.push(Delivery {
            url: url.to_string(),
            body: body.clone(),
        });
        self.notify.notify_waiters();
        match &self.failure {
            Some(message) => Err(QuerydeckError::Notification {
                message: message.clone(),
                source: None,
            }),
            None => Ok(()),
        }
    }
}
