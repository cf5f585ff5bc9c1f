// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP webhook delivery for Querydeck announcements.
//!
//! Provides [`WebhookNotifier`], a [`querydeck_core::Notifier`] that POSTs
//! JSON payloads (such as Slack incoming-webhook messages) with a bounded
//! request timeout.

pub mod webhook;

pub use webhook::WebhookNotifier;
