// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Querydeck configuration system.

use querydeck_config::diagnostic::ConfigError;
use querydeck_config::model::QuerydeckConfig;
use querydeck_config::{load_and_validate_str, load_config_from_path, load_config_from_str};
use querydeck_core::{ConfigSource, keys};

/// Every known section and key deserializes.
#[test]
fn full_toml_deserializes() {
    let toml = r#"
[storage]
database_path = "/tmp/querydeck-test.db"
wal_mode = false

[notifications]
slack_webhook = "https://hooks.example.com/services/T1"
public_url = "https://querydeck.example.com"
base_url = "/qd"
timeout_secs = 3

[logging]
level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.storage.database_path, "/tmp/querydeck-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(
        config.notifications.slack_webhook.as_deref(),
        Some("https://hooks.example.com/services/T1")
    );
    assert_eq!(config.notifications.timeout_secs, 3);
    assert_eq!(config.logging.level, "debug");
}

/// An empty file yields the compiled defaults.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    assert!(config.notifications.slack_webhook.is_none());
    assert!(config.notifications.public_url.is_none());
    assert!(config.storage.wal_mode);
    assert_eq!(config.logging.level, "info");
}

/// A loaded config answers the record layer's key lookups.
#[test]
fn loaded_config_serves_as_config_source() {
    let config = load_and_validate_str(
        r#"
[notifications]
slack_webhook = "https://hooks.example.com/services/T1"
public_url = "https://querydeck.example.com"
"#,
    )
    .expect("config should validate");

    let source: &dyn ConfigSource = &config;
    assert_eq!(
        source.get(keys::SLACK_WEBHOOK).as_deref(),
        Some("https://hooks.example.com/services/T1")
    );
    assert_eq!(
        source.get(keys::PUBLIC_URL).as_deref(),
        Some("https://querydeck.example.com")
    );
    assert_eq!(source.get(keys::BASE_URL), None);
}

/// A typo produces an UnknownKey diagnostic with a suggestion.
#[test]
fn typo_produces_suggestion() {
    let errors = load_and_validate_str(
        r#"
[notifications]
slack_webhok = "https://hooks.example.com"
"#,
    )
    .expect_err("unknown key should be rejected");

    let suggestion = errors.iter().find_map(|e| match e {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } if key == "slack_webhok" => suggestion.clone(),
        _ => None,
    });
    assert_eq!(suggestion.as_deref(), Some("slack_webhook"));
}

/// Unknown top-level sections are rejected.
#[test]
fn unknown_section_is_rejected() {
    let err = load_config_from_str("[server]\nport = 8080\n").expect_err("should reject");
    let rendered = err.to_string();
    assert!(
        rendered.contains("unknown field") || rendered.contains("server"),
        "error should mention the unknown section, got: {rendered}"
    );
}

/// Wrong value types surface as InvalidType.
#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[notifications]\ntimeout_secs = \"soon\"\n")
        .expect_err("string timeout should be rejected");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("timeout_secs"))));
}

/// Semantic validation runs after a successful parse.
#[test]
fn semantic_validation_runs_after_parse() {
    let errors = load_and_validate_str("[notifications]\nslack_webhook = \"hooks.example.com\"\n")
        .expect_err("schemeless webhook should be rejected");
    assert!(matches!(&errors[0], ConfigError::Validation { message } if message.contains("slack_webhook")));
}

/// Explicit file paths load, and a missing file is silently skipped.
#[test]
fn load_from_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("querydeck.toml");
    std::fs::write(&path, "[logging]\nlevel = \"warn\"\n").unwrap();

    let config = load_config_from_path(&path).expect("file should load");
    assert_eq!(config.logging.level, "warn");

    let missing: QuerydeckConfig =
        load_config_from_path(&dir.path().join("absent.toml")).expect("missing file is skipped");
    assert_eq!(missing.logging.level, "info");
}
