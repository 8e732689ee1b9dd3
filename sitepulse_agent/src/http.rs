//! HTTP surface: the primary status pull plus bootstrap and settings endpoints.
//! All routes here require the administrative bearer token.

use axum::{
    body::Bytes,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::state::AppState;
use crate::types::StatsPayload;
use crate::ws::ws_handler;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/stats", get(stats))
        .route("/api/session", get(session))
        .route("/api/settings", get(get_settings).post(post_settings))
        .route("/ws", get(ws_handler))
        .with_state(state)
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

pub fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "code": "forbidden",
            "message": "permission denied",
        })),
    )
        .into_response()
}

fn authorized(state: &AppState, headers: &HeaderMap) -> bool {
    let ok = state.is_admin(bearer(headers));
    if !ok {
        debug!("rejected request without administrative token");
    }
    ok
}

async fn stats(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return forbidden();
    }
    let snap = state.snapshot().await;
    Json(StatsPayload::from(snap.as_ref())).into_response()
}

/// What the dashboard needs before its first poll: the fallback nonce and the
/// current settings (refresh interval, thresholds, chart preferences).
async fn session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return forbidden();
    }
    let settings = state.settings.current().await;
    Json(json!({
        "nonce": state.nonces.issue(),
        "settings": settings,
    }))
    .into_response()
}

async fn get_settings(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return forbidden();
    }
    Json(state.settings.current().await).into_response()
}

async fn post_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !authorized(&state, &headers) {
        return forbidden();
    }
    // any body is accepted; one that is not JSON changes nothing
    let input = serde_json::from_slice::<Value>(&body).unwrap_or_else(|_| json!({}));
    match state.settings.update(&input).await {
        Ok(settings) => {
            // new mode/thresholds should show on the next pull
            state.cache.invalidate().await;
            Json(json!({
                "success": true,
                "message": "Settings saved.",
                "settings": settings,
            }))
            .into_response()
        }
        Err(e) => {
            error!("settings write failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "message": e.to_string() })),
            )
                .into_response()
        }
    }
}
