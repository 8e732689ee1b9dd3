//! WebSocket fallback transport. Guarded by a session nonce instead of the
//! bearer token; replies use a `{success, data}` envelope.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use std::collections::HashMap;
use tracing::debug;

use crate::http::forbidden;
use crate::state::AppState;
use crate::types::StatsPayload;

pub const GET_STATS: &str = "get_stats";

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    match q.get("nonce") {
        Some(n) if state.nonces.verify(n) => {}
        _ => return forbidden(),
    }
    ws.on_upgrade(move |socket| handle_socket(socket, state))
        .into_response()
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    while let Some(Ok(msg)) = socket.next().await {
        match msg {
            Message::Text(text) if text == GET_STATS => {
                let snap = state.snapshot().await;
                let body = json!({
                    "success": true,
                    "data": StatsPayload::from(snap.as_ref()),
                });
                if socket.send(Message::Text(body.to_string())).await.is_err() {
                    break;
                }
            }
            Message::Text(other) => {
                debug!(request = %other, "unknown ws request");
                let body = json!({ "success": false, "data": "unknown request" });
                if socket.send(Message::Text(body.to_string())).await.is_err() {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
}
