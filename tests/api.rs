//! End-to-end tests of the HTTP API.

use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;

use common::VALID_YAML;

async fn error_of(resp: reqwest::Response) -> String {
    let body: Value = resp.json().await.unwrap();
    body["error"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let server = common::start_server().await;
    let client = config_store_sdk::ConfigClient::new(&server.url());

    let health = client.health().await.unwrap();
    assert_eq!(health, json!({"status": "ok"}));
    server.stop().await;
}

#[tokio::test]
async fn test_upload_then_read_latest() {
    let server = common::start_server().await;
    let client = config_store_sdk::ConfigClient::new(&server.url());

    let receipt = client.upload_yaml("orders", VALID_YAML).await.unwrap();
    assert_eq!(receipt.service, "orders");
    assert_eq!(receipt.version, 1);
    assert_eq!(receipt.status, "saved");

    let receipt = client.upload_yaml("orders", VALID_YAML).await.unwrap();
    assert_eq!(receipt.version, 2);

    let doc = client.get("orders", None).await.unwrap();
    assert_eq!(doc["version"], 2);
    assert_eq!(doc["database"]["host"], "db.local");

    let doc = client.get("orders", Some(1)).await.unwrap();
    assert_eq!(doc["version"], 1);
    server.stop().await;
}

#[tokio::test]
async fn test_duplicate_explicit_version() {
    let server = common::start_server().await;
    let client = config_store_sdk::ConfigClient::new(&server.url());
    let body = "version: 2\ndatabase:\n  host: h\n  port: 1\n";

    let resp = client.upload_raw("billing", body).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client.upload_raw("billing", body).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(error_of(resp).await, "duplicate version");
    server.stop().await;
}

#[tokio::test]
async fn test_upload_rejections() {
    let server = common::start_server().await;
    let client = config_store_sdk::ConfigClient::new(&server.url());

    let resp = client.upload_raw("svc", "database: [1, 2\n").await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(error_of(resp).await.starts_with("Invalid YAML: "));

    let resp = client.upload_raw("svc", "- 1\n- 2\n").await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(resp).await, "Top-level YAML must be a mapping");

    let resp = client
        .upload_raw("svc", "version: abc\ndatabase:\n  port: 5432\n")
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!({"errors": {"version": "must be int", "database.host": "is required"}})
    );

    let resp = client.history_raw("svc").await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    server.stop().await;
}

#[tokio::test]
async fn test_read_errors() {
    let server = common::start_server().await;
    let client = config_store_sdk::ConfigClient::new(&server.url());

    let resp = client.get_raw("missing", None, None).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_of(resp).await, "service or version not found");

    client.upload_yaml("orders", VALID_YAML).await.unwrap();

    let resp = client.get_raw("orders", Some(9), None).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = reqwest::get(format!("{}/config/orders?version=latest", server.url()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(resp).await, "version must be integer");

    let resp = reqwest::get(format!("{}/config/orders?version=", server.url()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(resp).await, "version must be integer");

    let resp = reqwest::Client::new()
        .get(format!("{}/config/orders?template=true", server.url()))
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(error_of(resp).await.starts_with("Invalid JSON context: "));
    server.stop().await;
}

#[tokio::test]
async fn test_template_rendering() {
    let server = common::start_server().await;
    let client = config_store_sdk::ConfigClient::new(&server.url());
    let yaml = "database:\n  host: \"{{ region }}.db.local\"\n  port: 5432\nwelcome_message: \"Hello {{ user }}!\"\n";
    client.upload_yaml("web", yaml).await.unwrap();

    let ctx = json!({"user": "Alice", "region": "eu"});
    let doc = client.get_rendered("web", None, &ctx).await.unwrap();
    assert_eq!(doc["welcome_message"], "Hello Alice!");
    assert_eq!(doc["database"]["host"], "eu.db.local");
    assert_eq!(doc["database"]["port"], 5432);

    let stored = client.get("web", None).await.unwrap();
    assert_eq!(stored["welcome_message"], "Hello {{ user }}!");

    let resp = client.get_raw("web", None, Some(&json!({}))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(error_of(resp).await.starts_with("Template rendering error: "));

    // Rendering stays off unless the flag is 1 or true.
    let resp = reqwest::Client::new()
        .get(format!("{}/config/web?template=no", server.url()))
        .json(&ctx)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let doc: Value = resp.json().await.unwrap();
    assert_eq!(doc["welcome_message"], "Hello {{ user }}!");
    server.stop().await;
}

#[tokio::test]
async fn test_history_is_ascending() {
    let server = common::start_server().await;
    let client = config_store_sdk::ConfigClient::new(&server.url());

    for version in [3, 1, 2] {
        let body = format!("version: {version}\n{VALID_YAML}");
        client.upload_yaml("inventory", &body).await.unwrap();
    }

    let history = client.history("inventory").await.unwrap();
    let versions: Vec<i64> = history.iter().map(|h| h.version).collect();
    assert_eq!(versions, vec![1, 2, 3]);
    assert!(history.iter().all(|h| !h.created_at.is_empty()));

    let resp = client.history_raw("unknown").await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_of(resp).await, "service not found");
    server.stop().await;
}

#[tokio::test]
async fn test_service_names_with_reserved_characters() {
    let server = common::start_server().await;
    let client = config_store_sdk::ConfigClient::new(&server.url());

    let receipt = client.upload_yaml("team/api", VALID_YAML).await.unwrap();
    assert_eq!(receipt.service, "team/api");
    client.upload_yaml("odd?name#1", VALID_YAML).await.unwrap();

    let doc = client.get("team/api", Some(1)).await.unwrap();
    assert_eq!(doc["database"]["host"], "db.local");
    assert_eq!(client.history("odd?name#1").await.unwrap().len(), 1);

    let resp = client.history_raw("team").await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    server.stop().await;
}

#[tokio::test]
async fn test_request_id_header() {
    let server = common::start_server().await;
    let http = reqwest::Client::new();

    let resp = http.get(format!("{}/health", server.url())).send().await.unwrap();
    let generated = resp.headers().get("x-request-id").unwrap().to_str().unwrap();
    let parsed = uuid::Uuid::parse_str(generated).unwrap();
    assert_eq!(parsed.get_version_num(), 4);

    let resp = http
        .get(format!("{}/health", server.url()))
        .header("x-request-id", "client-chosen")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "client-chosen");
    server.stop().await;
}
