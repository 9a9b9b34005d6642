//! WebSocket transport
//!
//! One connection owns one `ChatSession`. Outbound events flow through an
//! unbounded channel drained by a writer task; the reader loop drives the
//! session until the client goes away, then tears it down.

pub mod message;

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::ChatSession;
use crate::AppState;

use message::{ClientEvent, ServerEvent};

/// Handle a WebSocket upgrade request.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id = Uuid::new_v4().to_string();
    info!(conn = %conn_id, "client connected");

    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    let mut session = ChatSession::new(
        conn_id.clone(),
        tx.clone(),
        state.orchestrator.clone(),
        state.personas.clone(),
    );

    // Writer: serialize events until every sender is gone or the socket dies.
    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    warn!("failed to serialize server event: {}", e);
                    continue;
                }
            };
            if ws_tx.send(WsMessage::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(incoming) = ws_rx.next().await {
        match incoming {
            Ok(WsMessage::Text(text)) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => dispatch(event, &mut session).await,
                Err(e) => {
                    debug!(conn = %conn_id, "malformed client event: {}", e);
                    let _ = tx.send(ServerEvent::Error {
                        message: "Invalid message format".into(),
                        details: Some(e.to_string()),
                    });
                }
            },
            Ok(WsMessage::Close(_)) => {
                info!(conn = %conn_id, "client closed connection");
                break;
            }
            Err(e) => {
                warn!(conn = %conn_id, "websocket error: {}", e);
                break;
            }
            // Ping/Pong are answered at the protocol level by axum.
            _ => {}
        }
    }

    session.disconnect();
    // Dropping every sender lets the writer drain and exit.
    drop(session);
    drop(tx);
    let _ = writer.await;
    info!(conn = %conn_id, "connection cleaned up");
}

async fn dispatch(event: ClientEvent, session: &mut ChatSession) {
    match event {
        ClientEvent::JoinPersona { persona_id } => session.join(&persona_id),
        ClientEvent::SendMessage { content } => session.send(content).await,
        ClientEvent::ClearChat => session.clear(),
    }
}
