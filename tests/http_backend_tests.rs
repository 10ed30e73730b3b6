// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end tests over real HTTP.
//!
//! A local axum server stands in for the backend. It issues and checks
//! HS256 JWTs the way the real token endpoints do, so these tests cover the
//! `reqwest` transport, header encoding, and multipart uploads.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sagitech_client::config::Config;
use sagitech_client::error::GatewayError;
use sagitech_client::models::AnalysisMode;
use sagitech_client::services::ImageUpload;
use sagitech_client::session::{keys, FileStore, MemoryStore, SessionStore};
use sagitech_client::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const SIGNING_KEY: &[u8] = b"mock_backend_key_32_bytes_min!!!";
const PASSWORD: &str = "correct horse";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    kind: String,
    exp: usize,
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// Create a token that expires `ttl_secs` from now (negative = already expired).
fn issue(kind: &str, ttl_secs: i64) -> String {
    let claims = Claims {
        sub: "7".to_string(),
        kind: kind.to_string(),
        exp: (now() + ttl_secs) as usize,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SIGNING_KEY),
    )
    .unwrap()
}

fn verify(token: &str, kind: &str) -> bool {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(SIGNING_KEY),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims.kind == kind)
    .unwrap_or(false)
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

fn not_authenticated() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "detail": "Given token not valid for any token type",
            "code": "token_not_valid"
        })),
    )
}

#[derive(Default)]
struct Backend {
    profile_hits: AtomicUsize,
    refresh_hits: AtomicUsize,
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["email"] == "abena@farm.gh" && body["password"] == PASSWORD {
        (
            StatusCode::OK,
            Json(json!({ "access": issue("access", 300), "refresh": issue("refresh", 3600) })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "No active account found with the given credentials" })),
        )
    }
}

async fn refresh(
    State(backend): State<Arc<Backend>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    backend.refresh_hits.fetch_add(1, Ordering::SeqCst);
    match body["refresh"].as_str() {
        Some(token) if verify(token, "refresh") => (
            StatusCode::OK,
            Json(json!({ "access": issue("access", 300) })),
        ),
        _ => not_authenticated(),
    }
}

async fn profile(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    backend.profile_hits.fetch_add(1, Ordering::SeqCst);
    match bearer(&headers) {
        Some(token) if verify(token, "access") => (
            StatusCode::OK,
            Json(json!({
                "user": {"id": 7, "username": "abena", "email": "abena@farm.gh",
                         "first_name": "Abena", "last_name": "Boateng"},
                "role": "farmer"
            })),
        ),
        _ => not_authenticated(),
    }
}

async fn predict(headers: HeaderMap, body: Bytes) -> (StatusCode, Json<Value>) {
    if !bearer(&headers).is_some_and(|t| verify(t, "access")) {
        return not_authenticated();
    }

    let is_multipart = headers
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));
    let text = String::from_utf8_lossy(&body);
    if !is_multipart || !text.contains("high_recall") || !text.contains("filename=\"bunch.jpg\"") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "No image provided", "details": "Please upload an image file"})),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "id": 501,
            "image_url": "http://backend.test/media/scans/501.jpg",
            "total_count": 1,
            "ripeness_distribution": {"not_mature": 0, "mature": 0, "ripe": 1, "over_ripe": 0},
            "confidence": 0.88,
            "bounding_boxes": [],
            "processed_at": "2025-07-14T10:22:00",
            "processing_metadata": {"analysis_mode": "high_recall"}
        })),
    )
}

/// Start the mock backend; returns its API base URL.
async fn spawn_backend() -> (String, Arc<Backend>) {
    let backend = Arc::new(Backend::default());
    let app = Router::new()
        .route("/api/token/", post(login))
        .route("/api/token/refresh/", post(refresh))
        .route("/api/profiles/me/", get(profile))
        .route("/api/predict/", post(predict))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/api", addr), backend)
}

fn config_for(base_url: &str) -> Config {
    Config {
        api_base_url: base_url.to_string(),
        retry_base_delay: Duration::from_millis(1),
        ..Config::default()
    }
}

fn seeded(access: &str, refresh: &str) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.set(keys::TOKEN, access).unwrap();
    store
        .set(
            keys::TOKENS,
            &json!({ "access": access, "refresh": refresh }).to_string(),
        )
        .unwrap();
    store
        .set(
            keys::USER,
            r#"{"id":7,"username":"abena","email":"abena@farm.gh","firstName":"Abena","lastName":"Boateng","role":"farmer"}"#,
        )
        .unwrap();
    store
}

#[tokio::test]
async fn test_login_persists_to_file_and_fetches_profile() {
    let (base_url, backend) = spawn_backend().await;
    let path = std::env::temp_dir()
        .join(format!("sagitech-e2e-{}-{}", std::process::id(), now()))
        .join("session.json");

    let client = Client::new(&config_for(&base_url), Arc::new(FileStore::open(&path)));
    let session = client.auth.login("abena@farm.gh", PASSWORD).await.unwrap();
    assert_eq!(session.user.username, "abena");

    let profile = client.farm.my_profile().await.unwrap();
    assert_eq!(profile.email, "abena@farm.gh");
    assert_eq!(backend.profile_hits.load(Ordering::SeqCst), 2);
    assert_eq!(backend.refresh_hits.load(Ordering::SeqCst), 0);

    // A fresh process sees the same session
    let reopened = FileStore::open(&path);
    assert_eq!(reopened.get(keys::TOKEN), Some(session.access_token));
    assert!(reopened.get(keys::TOKENS).is_some());
    assert!(reopened.get(keys::USER).is_some());

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[tokio::test]
async fn test_wrong_password_message() {
    let (base_url, _) = spawn_backend().await;
    let store = Arc::new(MemoryStore::new());
    let client = Client::new(&config_for(&base_url), store.clone());

    let err = client
        .auth
        .login("abena@farm.gh", "wrong")
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "No active account found with the given credentials"
    );
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_expired_access_token_refreshed_over_http() {
    let (base_url, backend) = spawn_backend().await;
    let expired = issue("access", -600);
    let store = seeded(&expired, &issue("refresh", 3600));
    let client = Client::new(&config_for(&base_url), store.clone());

    let profile = client.farm.my_profile().await.unwrap();

    assert_eq!(profile.username, "abena");
    assert_eq!(backend.profile_hits.load(Ordering::SeqCst), 2);
    assert_eq!(backend.refresh_hits.load(Ordering::SeqCst), 1);

    let stored = store.get(keys::TOKEN).unwrap();
    assert_ne!(stored, expired);
    assert!(verify(&stored, "access"));
}

#[tokio::test]
async fn test_expired_refresh_token_ends_session() {
    let (base_url, backend) = spawn_backend().await;
    let store = seeded(&issue("access", -600), &issue("refresh", -600));
    let client = Client::new(&config_for(&base_url), store.clone());

    let err = client.farm.my_profile().await.unwrap_err();

    assert!(matches!(err, GatewayError::SessionExpired));
    assert_eq!(backend.profile_hits.load(Ordering::SeqCst), 1);
    assert_eq!(backend.refresh_hits.load(Ordering::SeqCst), 1);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_predict_sends_real_multipart() {
    let (base_url, _) = spawn_backend().await;
    let store = seeded(&issue("access", 300), &issue("refresh", 3600));
    let client = Client::new(&config_for(&base_url), store);

    let upload = ImageUpload {
        file_name: "bunch.jpg".to_string(),
        content_type: "image/jpeg".to_string(),
        bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
    };
    let prediction = client
        .farm
        .predict(&upload, AnalysisMode::HighRecall)
        .await
        .unwrap();

    assert_eq!(prediction.id, 501);
    assert_eq!(prediction.ripeness_distribution.ripe, 1);
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = seeded("tok", "ref");
    let client = Client::new(&config_for(&format!("http://{}/api", addr)), store.clone());

    let err = client.farm.analytics().await.unwrap_err();

    assert!(matches!(err, GatewayError::Transport(_)));
    // No status was ever received, so the session is untouched
    assert_eq!(store.get(keys::TOKEN).as_deref(), Some("tok"));
}
