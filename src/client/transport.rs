//! Client half of the call/reply transport.
//!
//! Every call registers a one-shot reply slot keyed by its frame id. A call
//! resolves with the matching reply, with `Timeout` once the configured
//! deadline passes, or with `Disconnected` as soon as the connection drops.

use crate::error::{ErrorCode, FsError};
use crate::protocol::frame::CONNECTED_EVENT;
use crate::protocol::{ClientFrame, CommandKind, ServerFrame};
use futures::{SinkExt, Stream, StreamExt};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite, tungstenite::protocol::Message as WsMessage};
use tracing::{debug, info, warn};

/// Sends one command and waits for its correlated reply.
pub trait Transport: Send + Sync {
    fn call(
        &self,
        command: CommandKind,
        payload: Value,
    ) -> impl Future<Output = Result<Value, FsError>> + Send;
}

#[derive(Default)]
struct Pending {
    closed: bool,
    calls: HashMap<u64, oneshot::Sender<Value>>,
}

type PendingCalls = Arc<Mutex<Pending>>;

pub struct WsTransport {
    outbound: mpsc::Sender<String>,
    pending: PendingCalls,
    next_id: AtomicU64,
    request_timeout: Duration,
    connection_id: watch::Receiver<Option<String>>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl WsTransport {
    pub async fn connect(url: &str, request_timeout: Duration) -> Result<Self, FsError> {
        let (stream, _) = connect_async(url).await.map_err(|err| {
            FsError::new(
                ErrorCode::Disconnected,
                format!("Failed to connect to {}: {}", url, err),
            )
        })?;
        let (mut sink, source) = stream.split();
        let (tx, mut rx) = mpsc::channel::<String>(100);
        let pending = PendingCalls::default();
        let (id_tx, id_rx) = watch::channel(None);

        let writer = tokio::spawn(async move {
            while let Some(frame) = rx.recv().await {
                if sink.send(WsMessage::Text(frame.into())).await.is_err() {
                    break;
                }
            }
            let _ = sink.close().await;
        });
        let reader = tokio::spawn(read_frames(source, pending.clone(), id_tx));

        info!(url, "connected to executor");

        Ok(Self {
            outbound: tx,
            pending,
            next_id: AtomicU64::new(1),
            request_timeout,
            connection_id: id_rx,
            reader,
            writer,
        })
    }

    /// Id the executor assigned to this connection, once announced.
    pub fn connection_id(&self) -> Option<String> {
        self.connection_id.borrow().clone()
    }

    pub async fn is_closed(&self) -> bool {
        self.pending.lock().await.closed
    }
}

impl Transport for WsTransport {
    async fn call(&self, command: CommandKind, payload: Value) -> Result<Value, FsError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let frame = serde_json::to_string(&ClientFrame::Call {
            id,
            command: command.to_string(),
            payload,
        })?;

        let (reply_tx, reply_rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock().await;
            if pending.closed {
                return Err(FsError::disconnected());
            }
            pending.calls.insert(id, reply_tx);
        }

        if self.outbound.send(frame).await.is_err() {
            self.pending.lock().await.calls.remove(&id);
            return Err(FsError::disconnected());
        }

        match tokio::time::timeout(self.request_timeout, reply_rx).await {
            Ok(Ok(result)) => Ok(result),
            // Reply slot dropped by the reader on disconnect
            Ok(Err(_)) => Err(FsError::disconnected()),
            Err(_) => {
                self.pending.lock().await.calls.remove(&id);
                Err(FsError::new(
                    ErrorCode::Timeout,
                    format!("No reply to {} within {:?}", command, self.request_timeout),
                ))
            }
        }
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}

async fn read_frames<S>(
    mut source: S,
    pending: PendingCalls,
    connection_id: watch::Sender<Option<String>>,
) where
    S: Stream<Item = Result<WsMessage, tungstenite::Error>> + Unpin,
{
    while let Some(frame) = source.next().await {
        match frame {
            Ok(WsMessage::Text(text)) => match serde_json::from_str::<ServerFrame>(text.as_str()) {
                Ok(ServerFrame::Reply { id, result }) => {
                    let slot = pending.lock().await.calls.remove(&id);
                    match slot {
                        Some(reply) => {
                            let _ = reply.send(result);
                        }
                        None => debug!(id, "discarding reply without a pending call"),
                    }
                }
                Ok(ServerFrame::Event { event, data }) => {
                    if event == CONNECTED_EVENT {
                        if let Some(id) = data.get("connectionId").and_then(Value::as_str) {
                            connection_id.send_replace(Some(id.to_string()));
                        }
                    }
                    debug!(event = %event, "executor event");
                }
                Err(err) => warn!(error = %err, "dropping malformed frame"),
            },
            Ok(WsMessage::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                warn!(error = %err, "websocket error");
                break;
            }
        }
    }

    let mut pending = pending.lock().await;
    pending.closed = true;
    if !pending.calls.is_empty() {
        warn!(count = pending.calls.len(), "rejecting pending calls after disconnect");
    }
    // Dropping the reply slots wakes every waiting caller
    pending.calls.clear();
}
