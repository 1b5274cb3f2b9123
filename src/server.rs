use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    handler::HandlerWithoutStateExt,
    http::{header, HeaderValue, StatusCode, Uri},
    middleware,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::gate::{self, Gate};
use crate::middleware::gate_middleware;

/// Full edge application: front-end build behind the gate, plus `/health`
pub fn app(config: &AppConfig) -> Router {
    let static_dir = Path::new(&config.server.static_dir);
    let index = static_dir.join("index.html");
    let shell = move |uri: Uri| app_shell(index.clone(), uri);
    let pages = Router::new().fallback_service(ServeDir::new(static_dir).fallback(shell.into_service()));

    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    let router = gated(Gate::new(config.gate.clone()), pages)
        // Registered after the gate layer, so never gated
        .route("/health", get(health))
        .layer(CorsLayer::new().allow_origin(AllowOrigin::list(origins)));

    if config.server.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Wrap page routes with the gate
pub fn gated(gate: Gate, pages: Router) -> Router {
    pages.layer(middleware::from_fn_with_state(Arc::new(gate), gate_middleware))
}

/// Client-side routes get `index.html`; a missing asset stays a 404
async fn app_shell(index: PathBuf, uri: Uri) -> Response {
    if gate::is_static_asset(uri.path()) {
        return StatusCode::NOT_FOUND.into_response();
    }

    match tokio::fs::read(&index).await {
        Ok(html) => ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html).into_response(),
        Err(e) => {
            tracing::error!("Cannot read {}: {}", index.display(), e);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": chrono::Utc::now(),
        }
    }))
}
