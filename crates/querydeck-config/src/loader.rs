// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order: `./querydeck.toml` > `~/.config/querydeck/querydeck.toml` >
//! `/etc/querydeck/querydeck.toml`, with `QUERYDECK_` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::QuerydeckConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/querydeck/querydeck.toml";

/// Local configuration file, resolved against the working directory.
pub const LOCAL_CONFIG_FILE: &str = "querydeck.toml";

/// Sections addressable from `QUERYDECK_<SECTION>_<KEY>` variables.
const ENV_SECTIONS: &[&str] = &["storage", "notifications", "logging"];

/// Returns the per-user configuration file path, if a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("querydeck").join(LOCAL_CONFIG_FILE))
}

/// Builds the full layered Figment.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/querydeck/querydeck.toml`
/// 3. `~/.config/querydeck/querydeck.toml`
/// 4. `./querydeck.toml`
/// 5. `QUERYDECK_*` environment variables
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(QuerydeckConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Loads configuration from the standard hierarchy.
pub fn load_config() -> Result<QuerydeckConfig, figment::Error> {
    build_figment().extract()
}

/// Loads configuration from a TOML string over compiled defaults (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<QuerydeckConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QuerydeckConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Loads configuration from one explicit file, with env overrides.
pub fn load_config_from_path(path: &Path) -> Result<QuerydeckConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QuerydeckConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Environment provider mapping `QUERYDECK_NOTIFICATIONS_SLACK_WEBHOOK` to
/// `notifications.slack_webhook`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// keys that themselves contain underscores stay intact.
fn env_provider() -> Env {
    Env::prefixed("QUERYDECK_").map(|key| {
        let key_str = key.as_str().to_ascii_lowercase();
        let mapped = ENV_SECTIONS
            .iter()
            .find_map(|section| {
                key_str
                    .strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| format!("{section}.{rest}"))
            })
            .unwrap_or(key_str);
        mapped.into()
    })
}
