//! End-to-end tests of ApiClient over the reqwest transport.
//!
//! Uses wiremock for HTTP mocking: headers, caching, status mapping,
//! retry and multipart uploads.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pulpit::app::PulpitError;
use pulpit::cache::ResponseCache;
use pulpit::client::{ApiClient, RetryPolicy};
use pulpit::domain::{FormData, RequestOptions};
use pulpit::platform::PlatformCapabilities;
use pulpit::store::SqliteStore;
use pulpit::transport::HttpTransport;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_client(base_url: &str) -> ApiClient {
    let store = Arc::new(SqliteStore::in_memory().expect("in-memory store"));
    let transport = Arc::new(HttpTransport::new().expect("http client"));
    ApiClient::new(
        base_url,
        transport,
        ResponseCache::new(store),
        PlatformCapabilities::web(),
    )
    .with_retry_policy(RetryPolicy::new(2, Duration::from_millis(10)))
}

#[tokio::test]
async fn test_get_sends_headers_and_caches() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/sermons"))
        .and(query_param("page", "1"))
        .and(header("authorization", "Bearer abc"))
        .and(header("content-type", "application/json"))
        .and(header("cache-control", "no-cache"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sermons": [{"id": 1}]})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&format!("{}/api", mock_server.uri()));
    client.set_token("abc");

    let first = client.sermons().list(&[("page", "1")]).await.expect("first call");
    let second = client.sermons().list(&[("page", "1")]).await.expect("cached call");

    assert_eq!(first, json!({"sermons": [{"id": 1}]}));
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Token expired"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&format!("{}/api", mock_server.uri()));
    let logouts = Arc::new(AtomicUsize::new(0));
    let seen = logouts.clone();
    client.set_logout_callback(move || {
        seen.fetch_add(1, Ordering::SeqCst);
    });

    let result = client.current_user().await;

    match result {
        Err(PulpitError::Authentication { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Token expired");
        }
        other => panic!("expected Authentication error, got {:?}", other),
    }
    assert_eq!(logouts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rate_limit_then_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/devotions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"error": "Slow down"})))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/devotions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"devotions": ["today"]})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&format!("{}/api", mock_server.uri()));
    let data = client
        .request("/devotions", RequestOptions::get())
        .await
        .expect("should succeed after retries");

    assert_eq!(data, json!({"devotions": ["today"]}));
}

#[tokio::test]
async fn test_rate_limit_exhausted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/news"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"error": "Slow down"})))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&format!("{}/api", mock_server.uri()));
    let result = client.request("/news", RequestOptions::get()).await;

    assert!(matches!(result, Err(PulpitError::RateLimited { .. })));
}

#[tokio::test]
async fn test_validation_error_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/events"))
        .and(body_string_contains("Revival"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"errors": [{"msg": "Date is required"}]})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&format!("{}/api", mock_server.uri()));
    let err = client
        .events()
        .create(json!({"title": "Revival"}))
        .await
        .expect_err("should fail");

    assert_eq!(err.to_string(), "Date is required");
}

#[tokio::test]
async fn test_upload_is_multipart() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/upload/thumbnail"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .and(body_string_contains("cover.png"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"url": "/uploads/cover.png"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&format!("{}/api", mock_server.uri()));
    let data = client
        .upload_thumbnail("cover.png", Some("image/png"), b"PNG-DATA".to_vec())
        .await
        .expect("upload");

    assert_eq!(data, json!({"url": "/uploads/cover.png"}));
}

#[tokio::test]
async fn test_upload_with_text_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/podcasts/upload"))
        .and(body_string_contains("Morning Word"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 5})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&format!("{}/api", mock_server.uri()));
    let form = FormData::new()
        .text("title", "Morning Word")
        .file("audio", "ep.mp3", Some("audio/mpeg"), vec![0; 16]);

    let data = client.upload("/podcasts/upload", form).await.expect("upload");
    assert_eq!(data, json!({"id": 5}));
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Bind then drop a listener so the port is closed.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("local addr").port()
    };

    let client = create_test_client(&format!("http://127.0.0.1:{}/api", port))
        .with_retry_policy(RetryPolicy::none());
    let result = client.request("/sermons", RequestOptions::get()).await;

    assert!(matches!(result, Err(PulpitError::Network { .. })));
}
