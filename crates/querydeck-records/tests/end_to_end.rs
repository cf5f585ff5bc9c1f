// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Full stack: TOML config, SQLite store, and a mocked webhook.

use std::sync::Arc;

use querydeck_config::load_and_validate_str;
use querydeck_core::{Document, DocumentStore, Filter};
use querydeck_notify::WebhookNotifier;
use querydeck_records::{COLLECTION, QueryRecord, QueryRepository};
use querydeck_storage::SqliteStore;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn doc(value: Value) -> Document {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn save_announce_and_reload_through_sqlite() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("querydeck.db");

    let toml = format!(
        r#"
[storage]
database_path = "{}"

[notifications]
slack_webhook = "{}/services/T1"
public_url = "https://querydeck.example.com"
base_url = "/app"
timeout_secs = 5
"#,
        db_path.display(),
        server.uri()
    );
    let config = load_and_validate_str(&toml).unwrap();

    let store = SqliteStore::new(config.storage.clone());
    store.initialize().await.unwrap();
    let queries = store.collection(COLLECTION).unwrap();
    let notifier = WebhookNotifier::from_config(&config.notifications).unwrap();
    let repo = QueryRepository::new(
        Arc::new(queries.clone()),
        Arc::new(config),
        Arc::new(notifier),
    );

    let mut record = QueryRecord::from_document(&doc(json!({
        "name": "Signups",
        "createdBy": "alice",
        "modifiedBy": "alice",
        "queryText": "select count(*) from users",
        "tags": ["growth ", 1, ""],
        "chartConfiguration": {"chartType": "line", "fields": {"x": "created_month"}}
    })));
    let saved = repo.save(&mut record).await.unwrap();
    let id = saved.id.clone().unwrap();

    Mock::given(method("POST"))
        .and(path("/services/T1"))
        .and(body_json(json!({
            "text": format!(
                "New Query <https://querydeck.example.com/app/queries/{id}|Signups> saved by alice on Querydeck ```select count(*) from users```"
            )
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    repo.notify_external_channel(&saved).unwrap().await.unwrap();

    let stored = queries.find_one(&Filter::by_id(id.as_str())).await.unwrap().unwrap();
    assert_eq!(stored["tags"], json!(["growth"]));
    assert_eq!(stored["chartConfiguration"]["chartType"], json!("line"));
    assert!(stored.contains_key("lastAccessDate"));

    repo.log_access(&saved).await.unwrap();
    let reloaded = repo.find_one_by_id(&id).await.unwrap().unwrap();
    assert!(reloaded.last_access_date.is_some());
    assert_eq!(reloaded.name.as_deref(), Some("Signups"));

    let mut edited = reloaded.clone();
    edited.query_text = Some(String::new());
    let resaved = repo.save(&mut edited).await.unwrap();
    assert_eq!(resaved.query_text, None, "empty query text is stored as absent");

    assert_eq!(repo.remove_all().await.unwrap(), 1);
    assert!(repo.find_all().await.unwrap().is_empty());
    store.close().await.unwrap();
}

#[tokio::test]
async fn failing_webhook_does_not_affect_saved_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let toml = format!(
        r#"
[storage]
database_path = "{}"

[notifications]
slack_webhook = "{}"
"#,
        dir.path().join("q.db").display(),
        server.uri()
    );
    let config = load_and_validate_str(&toml).unwrap();
    let store = SqliteStore::new(config.storage.clone());
    store.initialize().await.unwrap();
    let notifier = WebhookNotifier::from_config(&config.notifications).unwrap();
    let repo = QueryRepository::new(
        Arc::new(store.collection(COLLECTION).unwrap()),
        Arc::new(config),
        Arc::new(notifier),
    );

    let mut record = QueryRecord::from_document(&doc(json!({
        "name": "Q", "createdBy": "bo", "modifiedBy": "bo"
    })));
    let saved = repo.save(&mut record).await.unwrap();
    repo.notify_external_channel(&saved).unwrap().await.unwrap();

    assert_eq!(repo.find_all().await.unwrap().len(), 1);
}
