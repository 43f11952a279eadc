use crate::dispatch::dispatch;
use crate::protocol::frame::CONNECTED_EVENT;
use crate::protocol::{ClientFrame, ServerFrame};
use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<String>(100);

    let connection_id = state.connections.register(tx.clone()).await;
    info!(connection = %connection_id, "connection established");

    // Spawn a task to write to the websocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // The handshake goes to this socket only, never to the current connection
    match ServerFrame::event_text(CONNECTED_EVENT, json!({ "connectionId": connection_id })) {
        Ok(frame) => {
            if tx.send(frame).await.is_err() {
                debug!(connection = %connection_id, "connection closed before handshake");
            }
        }
        Err(err) => error!(connection = %connection_id, error = %err, "failed to encode handshake"),
    }

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientFrame>(text.as_str()) {
                Ok(ClientFrame::Call {
                    id,
                    command,
                    payload,
                }) => {
                    // Each call runs on its own task; replies may complete out of order
                    let workspace = state.workspace.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let result = dispatch(&workspace, &command, payload).await;
                        match serde_json::to_string(&ServerFrame::Reply { id, result }) {
                            Ok(reply) => {
                                if tx.send(reply).await.is_err() {
                                    debug!(id, command = %command, "connection closed before reply");
                                }
                            }
                            Err(err) => error!(id, command = %command, error = %err, "failed to encode reply"),
                        }
                    });
                }
                Err(err) => {
                    warn!(connection = %connection_id, error = %err, "dropping malformed frame");
                }
            },
            Message::Binary(_) => {
                warn!(connection = %connection_id, "ignoring binary frame");
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    state.connections.remove(&connection_id).await;
    info!(connection = %connection_id, "connection closed");

    send_task.abort();
}
