use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;

use crate::gate::{self, Gate};
use crate::session::CookieSession;

/// Runs the gate in front of page rendering
///
/// Paths outside the matcher (assets, backend API, the login page) are
/// forwarded without reading cookies. Redirects carry any credential removal
/// queued by the gate.
pub async fn gate_middleware(
    State(gate): State<Arc<Gate>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    if !gate::matches(&path, gate.config()) {
        return next.run(request).await;
    }

    let session = CookieSession::new(jar, gate.config());
    let decision = gate.check(&path, &session, Utc::now().timestamp());

    match decision.location(gate.config()) {
        None => {
            tracing::trace!(path = %path, "Gate pass");
            next.run(request).await
        }
        Some(location) => {
            tracing::info!(path = %path, decision = decision.label(), location = %location, "Gate redirect");
            (session.into_jar(), Redirect::temporary(&location)).into_response()
        }
    }
}
