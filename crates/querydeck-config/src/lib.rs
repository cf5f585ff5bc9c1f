// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for Querydeck.
//!
//! TOML files layered with Figment, strict `deny_unknown_fields` parsing,
//! `QUERYDECK_*` environment overrides, and miette diagnostics with typo
//! suggestions. [`QuerydeckConfig`] implements
//! [`querydeck_core::ConfigSource`], so a loaded config can be handed
//! straight to the record layer.
//!
//! # Usage
//!
//! ```no_run
//! use querydeck_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("database: {}", config.storage.database_path);
//!
//! // The application owns the subscriber; the config supplies its level.
//! let max_level = config.logging.level_filter();
//! # let _ = max_level;
//! ```
//!
//! With `tracing-subscriber` in the application this becomes
//! `tracing_subscriber::fmt().with_max_level(config.logging.level_filter()).init()`.

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::PathBuf;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::QuerydeckConfig;

/// Loads configuration from the standard hierarchy and validates it.
pub fn load_and_validate() -> Result<QuerydeckConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            tracing::debug!(
                database_path = %config.storage.database_path,
                notifications = config.notifications.slack_webhook.is_some(),
                "configuration loaded"
            );
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &collect_toml_sources())),
    }
}

/// Loads configuration from an inline TOML string and validates it.
pub fn load_and_validate_str(toml_content: &str) -> Result<QuerydeckConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Reads whichever config files exist, for diagnostic source spans.
fn collect_toml_sources() -> Vec<(String, String)> {
    let local = std::env::current_dir()
        .map(|d| d.join(loader::LOCAL_CONFIG_FILE))
        .unwrap_or_else(|_| PathBuf::from(loader::LOCAL_CONFIG_FILE));

    [Some(local), loader::user_config_path(), Some(PathBuf::from(loader::SYSTEM_CONFIG_PATH))]
        .into_iter()
        .flatten()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}
