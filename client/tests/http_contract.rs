//! Contract tests against small in-process profile services.

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};

use idsync_client::{ClientError, ProfileServiceClient};

async fn spawn_service(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock service");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve mock service");
    });
    addr
}

fn base_url(addr: SocketAddr) -> String {
    format!("http://{}", addr)
}

#[tokio::test]
async fn health_ok_on_200() {
    let addr = spawn_service(Router::new().route("/health", get(|| async { "ok" }))).await;
    let client = ProfileServiceClient::new();
    client.health(&base_url(addr)).await.expect("healthy");
}

#[tokio::test]
async fn health_rejects_non_200() {
    let addr = spawn_service(Router::new().route(
        "/health",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "down") }),
    ))
    .await;
    let client = ProfileServiceClient::new();
    let err = client.health(&base_url(addr)).await.unwrap_err();
    assert!(matches!(err, ClientError::BadStatus { status: 500, .. }));
}

#[tokio::test]
async fn health_tolerates_trailing_slash_base() {
    let addr = spawn_service(Router::new().route("/health", get(|| async { "ok" }))).await;
    let client = ProfileServiceClient::new();
    client
        .health(&format!("{}/", base_url(addr)))
        .await
        .expect("healthy");
}

#[tokio::test]
async fn fetch_profile_parses_record_and_sends_bearer() {
    let addr = spawn_service(Router::new().route(
        "/profile",
        get(|headers: HeaderMap| async move {
            let auth = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            assert_eq!(auth, "Bearer token-123");
            Json(serde_json::json!({
                "first_name": "John",
                "last_name": "Doe",
                "email": "john@x.com",
                "phone": "1234567890",
                "yoe": 5,
                "company": "Acme",
                "designation": "Eng",
                "github_id": "jd",
                "linkedin_id": "jd",
            }))
        }),
    ))
    .await;

    let client = ProfileServiceClient::new();
    let record = client
        .fetch_profile(&base_url(addr), "token-123")
        .await
        .expect("profile");
    assert_eq!(record.first_name, "John");
    assert_eq!(record.yoe, 5);
    // Fields the service omitted come back zeroed.
    assert_eq!(record.website, "");
}

#[tokio::test]
async fn fetch_profile_maps_401_to_unauthenticated() {
    let addr = spawn_service(Router::new().route(
        "/profile",
        get(|| async { (StatusCode::UNAUTHORIZED, "who are you") }),
    ))
    .await;

    let client = ProfileServiceClient::new();
    let err = client
        .fetch_profile(&base_url(addr), "bad-token")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Unauthenticated(_)));
    assert!(err.is_protocol());
}

#[tokio::test]
async fn fetch_profile_maps_other_status_to_bad_status() {
    let addr = spawn_service(Router::new().route(
        "/profile",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "later") }),
    ))
    .await;

    let client = ProfileServiceClient::new();
    let err = client
        .fetch_profile(&base_url(addr), "token")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::BadStatus { status: 503, .. }));
}

#[tokio::test]
async fn fetch_profile_rejects_malformed_body() {
    let addr = spawn_service(Router::new().route(
        "/profile",
        get(|| async { "this is not json" }),
    ))
    .await;

    let client = ProfileServiceClient::new();
    let err = client
        .fetch_profile(&base_url(addr), "token")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidResponse(_)));
}

#[tokio::test]
async fn send_challenge_round_trips_hash() {
    let addr = spawn_service(Router::new().route(
        "/verification",
        post(|Json(body): Json<serde_json::Value>| async move {
            let salt = body["salt"].as_str().unwrap_or_default().to_string();
            assert!(!salt.is_empty());
            Json(serde_json::json!({ "hash": format!("echo-{}", salt) }))
        }),
    ))
    .await;

    let client = ProfileServiceClient::new();
    let hash = client
        .send_challenge(&base_url(addr), "abc123")
        .await
        .expect("challenge answer");
    assert_eq!(hash, "echo-abc123");
}

#[tokio::test]
async fn send_challenge_empty_object_yields_empty_hash() {
    let addr = spawn_service(Router::new().route(
        "/verification",
        post(|| async { Json(serde_json::json!({})) }),
    ))
    .await;

    let client = ProfileServiceClient::new();
    let hash = client
        .send_challenge(&base_url(addr), "abc123")
        .await
        .expect("challenge answer");
    assert_eq!(hash, "");
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    // Bind then immediately drop to find a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ProfileServiceClient::new();
    let err = client.health(&base_url(addr)).await.unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn slow_service_times_out() {
    let addr = spawn_service(Router::new().route(
        "/health",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "too late"
        }),
    ))
    .await;

    let client = ProfileServiceClient::with_timeout(Duration::from_millis(200));
    let err = client.health(&base_url(addr)).await.unwrap_err();
    assert!(err.is_transport());
}
