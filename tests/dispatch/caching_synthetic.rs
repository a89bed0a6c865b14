use httpmock::Method::{GET, POST};
use std::time::Duration;

use resilient_client::{CacheMode, RequestDescriptor};

use crate::common;

#[tokio::test]
async fn get_is_served_from_cache_within_ttl() {
    let server = common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/items")
            .query_param("page", "1");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"[{"id":1,"name":"Margherita"}]"#);
    });

    let client = common::client_for(&server);

    let first: serde_json::Value = client.get("/api/v1/items", &[("page", "1")]).await.unwrap();
    mock.assert();

    // Second call within the TTL must not touch the network.
    let second: serde_json::Value = client.get("/api/v1/items", &[("page", "1")]).await.unwrap();
    mock.assert();

    assert_eq!(first, second);
}

#[tokio::test]
async fn expired_entry_triggers_a_second_network_call() {
    let server = common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/v1/menu");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"sections":[]}"#);
    });

    let client = common::builder_for(&server)
        .cache_ttl(Duration::from_millis(40))
        .build()
        .unwrap();

    let _: serde_json::Value = client.get("/api/v1/menu", &[]).await.unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;
    let _: serde_json::Value = client.get("/api/v1/menu", &[]).await.unwrap();

    mock.assert_hits(2);
}

#[tokio::test]
async fn cache_refresh_bypasses_read_but_updates_entry() {
    let server = common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/v1/menu");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"sections":[]}"#);
    });

    let client = common::client_for(&server);

    let _: serde_json::Value = client.get("/api/v1/menu", &[]).await.unwrap();
    mock.assert_hits(1);

    // Refresh ignores the cached entry but rewrites it.
    let desc = RequestDescriptor::get("/api/v1/menu").cache_mode(CacheMode::Refresh);
    let _: serde_json::Value = client.fetch(desc).await.unwrap();
    mock.assert_hits(2);

    // The rewritten entry serves the next plain read.
    let _: serde_json::Value = client.get("/api/v1/menu", &[]).await.unwrap();
    mock.assert_hits(2);
}

#[tokio::test]
async fn cache_bypass_never_writes() {
    let server = common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/v1/menu");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"sections":[]}"#);
    });

    let client = common::client_for(&server);

    let desc = RequestDescriptor::get("/api/v1/menu").cache_mode(CacheMode::Bypass);
    let _: serde_json::Value = client.fetch(desc).await.unwrap();
    mock.assert_hits(1);

    // Nothing was cached, so a plain read goes to the network again.
    let _: serde_json::Value = client.get("/api/v1/menu", &[]).await.unwrap();
    mock.assert_hits(2);

    let _: serde_json::Value = client.get("/api/v1/menu", &[]).await.unwrap();
    mock.assert_hits(2);
}

#[tokio::test]
async fn mutating_requests_never_touch_the_cache() {
    let server = common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/api/v1/items");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"id":7}"#);
    });

    let client = common::client_for(&server);
    let body = serde_json::json!({"name": "Quattro Stagioni"});

    let _: serde_json::Value = client.post("/api/v1/items", &body).await.unwrap();
    let _: serde_json::Value = client.post("/api/v1/items", &body).await.unwrap();

    mock.assert_hits(2);
}

#[tokio::test]
async fn clear_cache_forces_a_refetch() {
    let server = common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/v1/categories");
        then.status(200)
            .header("content-type", "application/json")
            .body("[]");
    });

    let client = common::client_for(&server);

    let _: serde_json::Value = client.get("/api/v1/categories", &[]).await.unwrap();
    mock.assert_hits(1);

    client.clear_cache().await;

    let _: serde_json::Value = client.get("/api/v1/categories", &[]).await.unwrap();
    mock.assert_hits(2);
}
