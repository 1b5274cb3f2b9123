#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::json;

pub const LOGIN: &str = "/auth/login";

/// Unsigned token whose payload expires at `exp`
pub fn token_expiring_at(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({ "exp": exp, "sub": "user-1" }).to_string());
    format!("{}.{}.c2lnbmF0dXJl", header, payload)
}

pub fn live_token() -> String {
    token_expiring_at(chrono::Utc::now().timestamp() + 3600)
}

pub fn expired_token() -> String {
    token_expiring_at(chrono::Utc::now().timestamp() - 60)
}

/// Authorization headers seen by the mock backend, in arrival order
pub type SeenAuth = Arc<Mutex<Vec<Option<String>>>>;

pub struct MockBackend {
    pub base_url: String,
    pub seen_auth: SeenAuth,
}

impl MockBackend {
    pub fn auth_headers(&self) -> Vec<Option<String>> {
        self.seen_auth.lock().unwrap().clone()
    }
}

async fn ok(State(seen): State<SeenAuth>, headers: HeaderMap) -> impl IntoResponse {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    seen.lock().unwrap().push(auth);
    Json(json!({ "success": true, "data": { "posts": [] } }))
}

async fn slow(Path(ms): Path<u64>) -> impl IntoResponse {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    Json(json!({ "success": true, "waited": ms }))
}

async fn unauthorized() -> impl IntoResponse {
    (StatusCode::UNAUTHORIZED, Json(json!({ "message": "token expired" })))
}

async fn slow_unauthorized(Path(ms): Path<u64>) -> impl IntoResponse {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    (StatusCode::UNAUTHORIZED, Json(json!({ "message": "token expired" })))
}

async fn fail() -> impl IntoResponse {
    (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "message": "plan not available" })))
}

/// Backend stand-in listening on an ephemeral local port
pub async fn spawn_backend() -> MockBackend {
    let seen_auth: SeenAuth = Arc::new(Mutex::new(Vec::new()));

    let app = Router::new()
        .route("/ok", get(ok))
        .route("/slow/:ms", get(slow))
        .route("/unauthorized", get(unauthorized))
        .route("/slow-unauthorized/:ms", get(slow_unauthorized))
        .route("/fail", get(fail))
        .with_state(seen_auth.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock backend");
    let addr = listener.local_addr().expect("mock backend address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock backend");
    });

    MockBackend {
        base_url: format!("http://{}", addr),
        seen_auth,
    }
}
