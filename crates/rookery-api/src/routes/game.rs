//! WebSocket endpoint that carries the game protocol.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use axum::{Router, routing::get};
use futures::{SinkExt, StreamExt};
use rookery_session::domain::seats::ConnectionId;
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::lifecycle::ConnectionLifecycle;
use crate::protocol::ServerMessage;
use crate::state::AppState;

/// Query string accepted on connect.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    /// Resume token from an earlier `currentPlayer` frame.
    pub token: Option<String>,
}

/// GET /ws
#[instrument(skip(ws, state, params))]
async fn game_socket(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<ConnectParams>,
) -> Response {
    // An unreadable token is treated as no token: the client joins fresh.
    let resume_token = params
        .token
        .as_deref()
        .and_then(|raw| raw.trim().parse::<Uuid>().ok());
    ws.on_upgrade(move |socket| serve_socket(socket, state.lifecycle, resume_token))
}

async fn serve_socket(
    socket: WebSocket,
    lifecycle: ConnectionLifecycle,
    resume_token: Option<Uuid>,
) {
    let connection_id = ConnectionId::new();
    let (mut sink, mut stream) = socket.split();
    let (outbox, mut inbox) = mpsc::unbounded_channel::<ServerMessage>();

    let writer = tokio::spawn(async move {
        while let Some(message) = inbox.recv().await {
            if sink.send(Message::Text(message.to_json().into())).await.is_err() {
                break;
            }
        }
    });

    if let Err(e) = lifecycle.connect(connection_id, resume_token, outbox).await {
        warn!(%connection_id, error = %e, "failed to admit connection");
        writer.abort();
        return;
    }

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => lifecycle.receive(connection_id, text.as_str()).await,
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(%connection_id, error = %e, "socket read failed");
                break;
            }
        }
    }

    lifecycle.disconnect(connection_id).await;
    writer.abort();
}

/// Returns the WebSocket router.
pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(game_socket))
}
