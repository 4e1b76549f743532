//! WebSocket upgrade handler.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use coursehub_core::types::id::UserId;

use crate::error::ApiError;
use crate::extractors::ValidatedQuery;
use crate::state::AppState;

/// Query parameter for WebSocket authentication.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// JWT access token.
    pub token: String,
}

/// GET /ws?token={jwt}
pub async fn ws_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    ValidatedQuery(query): ValidatedQuery<WsQuery>,
) -> Result<Response, ApiError> {
    let claims = state.jwt_decoder.decode(&query.token)?;
    let user_id = claims.user_id();
    Ok(ws.on_upgrade(move |socket| handle_ws_connection(state, user_id, socket)))
}

/// Drives one established socket until either side closes.
async fn handle_ws_connection(state: AppState, user_id: UserId, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (handle, mut outbound_rx) = state.realtime.connections.register(user_id);
    let conn_id = handle.id;

    let ping_every = Duration::from_secs(state.realtime.config().ping_interval_seconds.max(1));
    let mut shutdown = state.realtime.shutdown_receiver();

    let closing = handle.clone();
    let mut outbound_task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(ping_every);
        ticker.tick().await;
        loop {
            tokio::select! {
                maybe = outbound_rx.recv() => {
                    let Some(frame) = maybe else { break };
                    let text = match frame.to_json() {
                        Ok(text) => text,
                        Err(e) => {
                            warn!(conn_id = %conn_id, error = %e, "Failed to encode frame");
                            continue;
                        }
                    };
                    if ws_tx.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if ws_tx.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
                _ = closing.closed() => {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
                _ = shutdown.recv() => {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    // The reader stops as soon as the writer task ends.
    loop {
        let result = tokio::select! {
            _ = &mut outbound_task => break,
            next = ws_rx.next() => match next {
                Some(result) => result,
                None => break,
            },
        };
        match result {
            Ok(Message::Text(text)) => {
                if let Some(reply) = state
                    .realtime
                    .connections
                    .handle_inbound(&handle, text.as_str())
                {
                    handle.send(reply);
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    outbound_task.abort();
    state.realtime.connections.unregister(&conn_id);

    info!(conn_id = %conn_id, user_id = %user_id, "WebSocket connection closed");
}
