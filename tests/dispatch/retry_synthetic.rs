use httpmock::Method::GET;
use std::time::{Duration, Instant};
use url::Url;

use resilient_client::{ApiClient, ErrorKind, RetryPolicy};

use crate::common;

#[tokio::test]
async fn persistent_5xx_uses_exactly_max_attempts() {
    let server = common::setup_server();
    let fail = server.mock(|when, then| {
        when.method(GET).path("/api/v1/menu");
        then.status(503).body("Service Unavailable");
    });

    let client = common::builder_for(&server)
        .retry_policy(common::fast_retry(3))
        .build()
        .unwrap();

    let err = client
        .get::<serde_json::Value>("/api/v1/menu", &[])
        .await
        .unwrap_err();

    fail.assert_hits(3);
    assert_eq!(err.kind, ErrorKind::ServerError);
    assert_eq!(err.http_status, Some(503));
}

#[tokio::test]
async fn backoff_delays_follow_geometric_progression() {
    let server = common::setup_server();
    let fail = server.mock(|when, then| {
        when.method(GET).path("/api/v1/menu");
        then.status(503).body("Service Unavailable");
    });

    let client = common::builder_for(&server)
        .retry_policy(RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(20),
            backoff_factor: 2.0,
        })
        .build()
        .unwrap();

    let started = Instant::now();
    let _ = client
        .get::<serde_json::Value>("/api/v1/menu", &[])
        .await
        .unwrap_err();

    // Sleeps of 20ms and 40ms separate the three attempts.
    assert!(started.elapsed() >= Duration::from_millis(60));
    fail.assert_hits(3);
}

#[tokio::test]
async fn client_error_is_not_retried() {
    let server = common::setup_server();
    let missing = server.mock(|when, then| {
        when.method(GET).path("/api/v1/items/999");
        then.status(404)
            .header("content-type", "application/json")
            .body(r#"{"message":"Item not found","statusCode":404}"#);
    });

    let client = common::client_for(&server);
    let err = client
        .get::<serde_json::Value>("/api/v1/items/999", &[])
        .await
        .unwrap_err();

    missing.assert_hits(1);
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(err.http_status, Some(404));
    assert_eq!(err.message, "The requested resource was not found.");
}

#[tokio::test]
async fn validation_payload_yields_field_errors_without_retry() {
    let server = common::setup_server();
    let invalid = server.mock(|when, then| {
        when.method(GET).path("/api/v1/items");
        then.status(422)
            .header("content-type", "application/json")
            .body(
                r#"{"statusCode":422,"error":"Unprocessable Entity","message":["name: must not be empty","price: must be a positive number"]}"#,
            );
    });

    let client = common::client_for(&server);
    let err = client
        .get::<serde_json::Value>("/api/v1/items", &[])
        .await
        .unwrap_err();

    invalid.assert_hits(1);
    assert_eq!(err.kind, ErrorKind::ValidationFailed);
    let fields = err.field_errors.expect("field errors");
    assert_eq!(fields["name"], "must not be empty");
    assert_eq!(fields["price"], "must be a positive number");
}

#[tokio::test]
async fn connection_failure_is_classified_as_transport() {
    // Nothing listens on the discard port.
    let client = ApiClient::builder()
        .base_url(Url::parse("http://127.0.0.1:9").unwrap())
        .retry_policy(common::fast_retry(2))
        .build()
        .unwrap();

    let err = client
        .get::<serde_json::Value>("/health", &[])
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Transport);
    assert_eq!(err.http_status, None);
}
