//! Integration tests for gqlm-runtime
//!
//! These tests run a session against mock GraphQL endpoints to validate
//! dispatch routing, header handling, token rotation, and error capture.

use gqlm_core::{ClientSource, Error, GqlConfig, OperationRegistry};
use gqlm_runtime::{OperationCatalog, OperationKind, Session};
use httpmock::prelude::*;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn catalog() -> OperationCatalog {
    let mut catalog = OperationCatalog::new();
    catalog.insert(
        "GetUser",
        OperationKind::Query,
        "query GetUser { user { id name } }",
    );
    catalog.insert(
        "GetPosts",
        OperationKind::Query,
        "query GetPosts { posts { id title } }",
    );
    catalog
}

fn session_for(default_host: &str, blog_host: &str) -> Session {
    let config = GqlConfig::builder()
        .client(
            "default",
            ClientSource::full(default_host).token_value("secret"),
        )
        .client("blog", ClientSource::host(blog_host))
        .build_with_env(&BTreeMap::<String, String>::new())
        .unwrap();

    let mut registry = OperationRegistry::new();
    for name in config.client_names() {
        registry.add_client(name.clone());
    }
    registry.register(&"default".into(), "GetUser".into());
    registry.register(&"blog".into(), "GetPosts".into());

    Session::new(config, registry, catalog())
}

/// Tests a successful dispatch returns the response data and sends the
/// configured auth header and operation name.
#[tokio::test]
async fn test_dispatch_returns_data() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/graphql")
                .header("Authorization", "Bearer secret")
                .json_body_partial(r#"{"operationName": "GetUser"}"#);
            then.status(200)
                .json_body(json!({"data": {"user": {"id": 1, "name": "Ada"}}}));
        })
        .await;

    let session = session_for(
        &server.url("/graphql"),
        "https://unused.test/graphql",
    );
    let data = session.dispatch("GetUser", None).await.unwrap();

    mock.assert_async().await;
    assert_eq!(data["user"]["name"], "Ada");
}

/// Tests operations are routed to the client that owns them.
#[tokio::test]
async fn test_dispatch_routes_to_owning_client() {
    let default_server = MockServer::start_async().await;
    let blog_server = MockServer::start_async().await;
    let blog_mock = blog_server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/graphql")
                .json_body_partial(r#"{"operationName": "GetPosts"}"#);
            then.status(200)
                .json_body(json!({"data": {"posts": []}}));
        })
        .await;

    let session = session_for(
        &default_server.url("/graphql"),
        &blog_server.url("/graphql"),
    );
    let data = session.dispatch("GetPosts", None).await.unwrap();

    blog_mock.assert_async().await;
    assert_eq!(data["posts"], json!([]));
}

/// Tests an explicit client choice bypasses registry resolution.
#[tokio::test]
async fn test_dispatch_to_explicit_client() {
    let default_server = MockServer::start_async().await;
    let blog_server = MockServer::start_async().await;
    let blog_mock = blog_server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/graphql")
                .json_body_partial(r#"{"operationName": "GetUser"}"#);
            then.status(200).json_body(json!({"data": {"user": null}}));
        })
        .await;

    let session = session_for(
        &default_server.url("/graphql"),
        &blog_server.url("/graphql"),
    );
    // GetUser is owned by `default`; route it to `blog` anyway.
    session
        .dispatch_to(&"blog".into(), "GetUser", None)
        .await
        .unwrap();
    blog_mock.assert_async().await;
}

/// Tests variables are forwarded in the request body.
#[tokio::test]
async fn test_dispatch_forwards_variables() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/graphql")
                .json_body_partial(r#"{"variables": {"id": 42}}"#);
            then.status(200).json_body(json!({"data": {"user": null}}));
        })
        .await;

    let session = session_for(&server.url("/graphql"), "https://unused.test/graphql");
    session
        .dispatch("GetUser", Some(json!({"id": 42})))
        .await
        .unwrap();

    mock.assert_async().await;
}

/// Tests a failed dispatch produces an error record carrying the status
/// code and the response's GraphQL errors.
#[tokio::test]
async fn test_failure_captures_error_record() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/graphql");
            then.status(401)
                .json_body(json!({"errors": [{"message": "unauthorized"}]}));
        })
        .await;

    let session = session_for(&server.url("/graphql"), "https://unused.test/graphql");
    let err = session.dispatch("GetUser", None).await.unwrap_err();

    let record = err.dispatch_record().expect("dispatch error record");
    assert_eq!(record.client.as_str(), "default");
    assert_eq!(record.operation_name.as_str(), "GetUser");
    assert_eq!(record.operation_type.as_deref(), Some("query"));
    assert_eq!(record.status_code, Some(401));
    assert_eq!(record.gql_errors.as_ref().unwrap()[0].message, "unauthorized");

    let last = session.last_error().await.expect("captured record");
    assert_eq!(last.status_code, Some(401));
}

/// Tests a handler registered after a failure is caught up with the most
/// recent record, and a handler registered before receives failures as
/// they happen.
#[tokio::test]
async fn test_error_handler_catch_up_and_live_delivery() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/graphql");
            then.status(500)
                .json_body(json!({"errors": [{"message": "boom"}]}));
        })
        .await;

    let session = session_for(&server.url("/graphql"), "https://unused.test/graphql");
    let _ = session.dispatch("GetUser", None).await;

    // Late registration: the captured failure is replayed immediately.
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    session
        .on_error(move |record| {
            sink.lock().unwrap().push(record.operation_name.to_string());
        })
        .await;
    assert_eq!(seen.lock().unwrap().as_slice(), ["GetUser"]);

    // Live delivery on the next failure.
    let _ = session.dispatch("GetUser", None).await;
    assert_eq!(seen.lock().unwrap().len(), 2);
}

/// Tests a replacement handler takes over delivery.
#[tokio::test]
async fn test_second_handler_replaces_first() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/graphql");
            then.status(500)
                .json_body(json!({"errors": [{"message": "boom"}]}));
        })
        .await;

    let session = session_for(&server.url("/graphql"), "https://unused.test/graphql");

    let first = Arc::new(AtomicUsize::new(0));
    let first_sink = Arc::clone(&first);
    session
        .on_error(move |_| {
            first_sink.fetch_add(1, Ordering::SeqCst);
        })
        .await;

    let second = Arc::new(AtomicUsize::new(0));
    let second_sink = Arc::clone(&second);
    session
        .on_error(move |_| {
            second_sink.fetch_add(1, Ordering::SeqCst);
        })
        .await;

    let _ = session.dispatch("GetUser", None).await;
    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

/// Tests a rotated token is sent on subsequent requests and a cleared
/// token removes the header entirely.
#[tokio::test]
async fn test_token_rotation_and_clearing() {
    let server = MockServer::start_async().await;
    let rotated = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/graphql")
                .header("Authorization", "Bearer rotated");
            then.status(200).json_body(json!({"data": {"user": null}}));
        })
        .await;

    let session = session_for(&server.url("/graphql"), "https://unused.test/graphql");
    session.set_token(None, Some("rotated")).await.unwrap();
    session.dispatch("GetUser", None).await.unwrap();
    rotated.assert_async().await;

    session.set_token(None, None).await.unwrap();
    let headers = session
        .client_options(None)
        .await
        .unwrap()
        .headers();
    assert!(!headers.contains_key("Authorization"));
}

/// Tests dispatching a name with no catalog entry fails before any
/// request is made.
#[tokio::test]
async fn test_unknown_operation_never_hits_the_wire() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200).json_body(json!({"data": null}));
        })
        .await;

    let session = session_for(&server.url("/graphql"), "https://unused.test/graphql");
    let err = session.dispatch("Missing", None).await.unwrap_err();
    assert!(matches!(err, Error::UnknownOperation { .. }));
    assert_eq!(mock.hits_async().await, 0);
}

/// Tests transport failures (unreachable host) still produce an error
/// record, with a synthesized message and no status code.
#[tokio::test]
async fn test_transport_failure_produces_record() {
    // Port 9 (discard) is not listening.
    let session = session_for("http://127.0.0.1:9/graphql", "https://unused.test/graphql");
    let err = session.dispatch("GetUser", None).await.unwrap_err();

    let record = err.dispatch_record().expect("dispatch error record");
    assert_eq!(record.status_code, None);
    assert!(record.gql_errors.as_ref().is_some_and(|errors| !errors.is_empty()));
}

/// Tests runtime header patches apply to subsequent requests without
/// disturbing configured headers.
#[tokio::test]
async fn test_header_patch_applies_to_requests() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/graphql")
                .header("X-Trace", "abc")
                .header("Authorization", "Bearer secret");
            then.status(200).json_body(json!({"data": {"user": null}}));
        })
        .await;

    let session = session_for(&server.url("/graphql"), "https://unused.test/graphql");
    session
        .set_headers(None, json!({"X-Trace": "abc"}), false)
        .await
        .unwrap();
    session.dispatch("GetUser", None).await.unwrap();
    mock.assert_async().await;
}

/// Tests a null response data value is surfaced as JSON null.
#[tokio::test]
async fn test_null_data_round_trips() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200).json_body(json!({"data": null}));
        })
        .await;

    let session = session_for(&server.url("/graphql"), "https://unused.test/graphql");
    let data = session.dispatch("GetUser", None).await.unwrap();
    assert_eq!(data, Value::Null);
}
