//! Control API integration tests.
//!
//! Each test starts a control server on an ephemeral loopback port and talks
//! to it over real HTTP.

mod common;

use common::{RecordingInfo, TestServer};
use modbot::control::server::READ_TIMEOUT;
use modbot::control::{ControlClient, Rule, StatsSnapshot};
use modbot::error::{ControlError, RuleError};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::Instant;

fn snapshot() -> StatsSnapshot {
    StatsSnapshot {
        uptime: "1m1s".to_string(),
        start_time: 1_700_000_000,
        commands_executed: 42,
        guild_count: 3,
        active_rules: 1,
    }
}

fn spam_rule() -> Rule {
    Rule {
        name: "spam".to_string(),
        description: "Delete repeated messages".to_string(),
        enabled: true,
        key: "threshold".to_string(),
        value: "5".to_string(),
    }
}

#[tokio::test]
async fn test_stats_served_as_json() {
    let info = Arc::new(RecordingInfo::default().with_stats(snapshot()));
    let server = TestServer::spawn(info).await.unwrap();

    let response = server.http.get(server.url("/stats")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("application/json"), "{content_type}");

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["commands_executed"], 42);
    assert_eq!(body["guild_count"], 3);
    assert_eq!(body["uptime"], "1m1s");

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_stats_unavailable_is_500() {
    let server = TestServer::spawn(Arc::new(RecordingInfo::default()))
        .await
        .unwrap();

    let response = server.http.get(server.url("/stats")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_rules_empty_when_unavailable() {
    let server = TestServer::spawn(Arc::new(RecordingInfo::default()))
        .await
        .unwrap();

    let response = server.http.get(server.url("/rules")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!([]));

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_rules_listed() {
    let info = Arc::new(RecordingInfo::default().with_rules(vec![spam_rule()]));
    let server = TestServer::spawn(info).await.unwrap();

    let rules: Vec<Rule> = server
        .http
        .get(server.url("/rules"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(rules, vec![spam_rule()]);

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_set_rule_success() {
    let info = Arc::new(RecordingInfo::default());
    let server = TestServer::spawn(info.clone()).await.unwrap();

    let response = server
        .http
        .post(server.url("/rules/set"))
        .json(&json!({"name": "spam", "key": "threshold", "value": "7", "extra": [1, 2]}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"status": "ok"}));
    assert_eq!(
        info.calls(),
        vec![("spam".to_string(), "threshold".to_string(), "7".to_string())]
    );

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_set_rule_missing_value_defaults_empty() {
    let info = Arc::new(RecordingInfo::default());
    let server = TestServer::spawn(info.clone()).await.unwrap();

    let response = server
        .http
        .post(server.url("/rules/set"))
        .json(&json!({"name": "spam", "key": "threshold"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        info.calls(),
        vec![("spam".to_string(), "threshold".to_string(), String::new())]
    );

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_set_rule_rejects_incomplete_body() {
    let info = Arc::new(RecordingInfo::default());
    let server = TestServer::spawn(info.clone()).await.unwrap();

    for body in [
        json!({"key": "threshold", "value": "7"}),
        json!({"name": "", "key": "threshold"}),
        json!({"name": "spam"}),
        json!({"name": "spam", "key": ""}),
    ] {
        let response = server
            .http
            .post(server.url("/rules/set"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        let error: Value = response.json().await.unwrap();
        assert!(error["error"].is_string());
    }
    assert!(info.calls().is_empty());

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_set_rule_rejects_malformed_json() {
    let info = Arc::new(RecordingInfo::default());
    let server = TestServer::spawn(info.clone()).await.unwrap();

    let response = server
        .http
        .post(server.url("/rules/set"))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{\"name\": \"spam\",")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(info.calls().is_empty());

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_set_rule_error_mapping() {
    let not_found = Arc::new(RecordingInfo::default().failing(RuleError::NotFound("nope".into())));
    let server = TestServer::spawn(not_found.clone()).await.unwrap();
    let response = server
        .http
        .post(server.url("/rules/set"))
        .json(&json!({"name": "nope", "key": "enabled", "value": "on"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(not_found.calls().len(), 1);
    server.shutdown().await.unwrap();

    let broken = Arc::new(RecordingInfo::default().failing(RuleError::Internal("disk".into())));
    let server = TestServer::spawn(broken).await.unwrap();
    let response = server
        .http
        .post(server.url("/rules/set"))
        .json(&json!({"name": "spam", "key": "enabled", "value": "on"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_wrong_method_is_405() {
    let server = TestServer::spawn(Arc::new(RecordingInfo::default()))
        .await
        .unwrap();

    let cases = [
        (reqwest::Method::POST, "/stats"),
        (reqwest::Method::DELETE, "/stats"),
        (reqwest::Method::HEAD, "/stats"),
        (reqwest::Method::PUT, "/rules"),
        (reqwest::Method::HEAD, "/rules"),
        (reqwest::Method::GET, "/rules/set"),
        (reqwest::Method::PATCH, "/rules/set"),
    ];
    for (method, path) in cases {
        let response = server
            .http
            .request(method.clone(), server.url(path))
            .send()
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::METHOD_NOT_ALLOWED,
            "{method} {path}"
        );
    }

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let server = TestServer::spawn(Arc::new(RecordingInfo::default()))
        .await
        .unwrap();

    for path in ["/", "/metrics", "/rules/get", "/stats/extra"] {
        let response = server.http.get(server.url(path)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
    }

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_lifecycle() {
    let server = TestServer::spawn(Arc::new(RecordingInfo::default()))
        .await
        .unwrap();
    let control = server.control();
    assert!(control.is_listening().await);

    let err = control.start().await.unwrap_err();
    assert!(matches!(err, ControlError::AlreadyStarted(_)));

    control
        .stop(Instant::now() + Duration::from_secs(1))
        .await
        .unwrap();
    control
        .stop(Instant::now() + Duration::from_secs(1))
        .await
        .unwrap();
    assert!(!control.is_listening().await);
    assert!(control.local_addr().await.is_none());

    // Restart on a fresh ephemeral port.
    let addr = control.start().await.unwrap();
    let response = server
        .http
        .get(format!("http://{addr}/rules"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_client_round_trip() {
    let info = Arc::new(
        RecordingInfo::default()
            .with_stats(snapshot())
            .with_rules(vec![spam_rule()]),
    );
    let server = TestServer::spawn(info.clone()).await.unwrap();
    let client = ControlClient::new(&format!("{}/", server.base())).unwrap();

    assert_eq!(client.stats().await.unwrap(), snapshot());
    assert_eq!(client.rules().await.unwrap(), vec![spam_rule()]);
    client.set_rule("spam", "enabled", "off").await.unwrap();
    assert_eq!(
        info.calls(),
        vec![("spam".to_string(), "enabled".to_string(), "off".to_string())]
    );

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_client_error_classification() {
    // Stats unavailable: non-200.
    let server = TestServer::spawn(Arc::new(RecordingInfo::default()))
        .await
        .unwrap();
    let client = ControlClient::new(server.base()).unwrap();
    let err = client.stats().await.unwrap_err();
    assert!(err.to_string().contains("unexpected status"), "{err}");

    // Rule rejected: non-200 carrying the server's message.
    let failing = Arc::new(RecordingInfo::default().failing(RuleError::NotFound("ghost".into())));
    let rejecting = TestServer::spawn(failing).await.unwrap();
    let client = ControlClient::new(rejecting.base()).unwrap();
    let err = client.set_rule("ghost", "enabled", "on").await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("unexpected status"), "{message}");
    assert!(message.contains("ghost"), "{message}");

    server.shutdown().await.unwrap();
    rejecting.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_client_decode_error() {
    // A 200 whose body is not a stats object.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = axum::Router::new().route("/stats", axum::routing::get(|| async { "[1, 2, 3]" }));
    let impostor = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = ControlClient::new(&format!("http://{addr}")).unwrap();
    let err = client.stats().await.unwrap_err();
    assert!(err.to_string().contains("decode"), "{err}");

    impostor.abort();
}

#[tokio::test]
async fn test_stalled_headers_time_out() {
    let server = TestServer::spawn(Arc::new(RecordingInfo::default()))
        .await
        .unwrap();
    let addr = server.control().local_addr().await.unwrap();

    // Headers never finish.
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /rules HTTP/1.1\r\nHost: x\r\n")
        .await
        .unwrap();

    let mut buf = [0u8; 512];
    let limit = READ_TIMEOUT + Duration::from_secs(2);
    let read = tokio::time::timeout(limit, stream.read(&mut buf)).await;
    assert!(read.is_ok(), "connection still open after the header read timeout");

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_stop_closes_stalled_connections() {
    let server = TestServer::spawn(Arc::new(RecordingInfo::default()))
        .await
        .unwrap();
    let addr = server.control().local_addr().await.unwrap();

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"GET /rules HTTP/1.1\r\n").await.unwrap();

    server
        .control()
        .stop(Instant::now() + Duration::from_millis(200))
        .await
        .unwrap();

    let mut buf = [0u8; 512];
    let read = tokio::time::timeout(Duration::from_secs(2), stream.read(&mut buf)).await;
    assert!(read.is_ok(), "connection outlived stop");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stop_drains_in_flight_request() {
    let info = Arc::new(RecordingInfo::default().slow(Duration::from_millis(500)));
    let server = TestServer::spawn(info.clone()).await.unwrap();

    let in_flight = tokio::spawn(
        server
            .http
            .post(server.url("/rules/set"))
            .json(&json!({"name": "spam", "key": "enabled", "value": "off"}))
            .send(),
    );
    info.entered.notified().await;

    let started = std::time::Instant::now();
    server
        .control()
        .stop(Instant::now() + Duration::from_secs(5))
        .await
        .unwrap();
    assert!(started.elapsed() < Duration::from_secs(4));

    let response = in_flight.await.unwrap().unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(info.calls().len(), 1);
    assert!(!server.control().is_listening().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stop_gives_up_at_deadline() {
    let info = Arc::new(RecordingInfo::default().slow(Duration::from_secs(3)));
    let server = TestServer::spawn(info.clone()).await.unwrap();

    let in_flight = tokio::spawn(
        server
            .http
            .post(server.url("/rules/set"))
            .json(&json!({"name": "spam", "key": "enabled", "value": "off"}))
            .send(),
    );
    info.entered.notified().await;

    let started = std::time::Instant::now();
    server
        .control()
        .stop(Instant::now() + Duration::from_millis(200))
        .await
        .unwrap();
    assert!(
        started.elapsed() < Duration::from_secs(2),
        "stop blocked on a stuck request"
    );
    assert!(!server.control().is_listening().await);

    in_flight.abort();
}
