use httpmock::Method::GET;

use resilient_client::{ErrorKind, TokenStore};

use crate::common;

#[tokio::test]
async fn second_401_after_refresh_surfaces_auth_without_another_refresh() {
    let server = common::setup_server();
    let store = common::seeded_store("stale");

    // The endpoint rejects every token it is shown.
    let rejected = server.mock(|when, then| {
        when.method(GET).path("/api/v1/items");
        then.status(401)
            .header("content-type", "application/json")
            .body(r#"{"message":"token expired"}"#);
    });
    let refresh = common::mock_refresh(&server, "fresh");

    let client = common::client_with_store(&server, store.clone());
    let err = client
        .get::<serde_json::Value>("/api/v1/items", &[])
        .await
        .unwrap_err();

    // One original dispatch, one refresh, one resubmit. Nothing more.
    rejected.assert_hits(2);
    refresh.assert_hits(1);
    assert_eq!(err.kind, ErrorKind::Auth);
    assert_eq!(err.http_status, Some(401));
    assert_eq!(store.get(), None);
}

#[tokio::test]
async fn empty_store_still_gets_exactly_one_refresh() {
    let server = common::setup_server();
    let store = common::empty_store();

    let rejected = server.mock(|when, then| {
        when.method(GET).path("/api/v1/items");
        then.status(401)
            .header("content-type", "application/json")
            .body(r#"{"message":"authentication required"}"#);
    });
    let refresh = common::mock_refresh(&server, "fresh");

    let client = common::client_with_store(&server, store.clone());
    let err = client
        .get::<serde_json::Value>("/api/v1/items", &[])
        .await
        .unwrap_err();

    rejected.assert_hits(2);
    refresh.assert_hits(1);
    assert_eq!(err.kind, ErrorKind::Auth);
    assert_eq!(store.get(), None);
}
