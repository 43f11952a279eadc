//! Live executor connections.
//!
//! Server-initiated messages go to the *current* connection: the most
//! recently accepted connection that is still open. When the current
//! connection is evicted, the most recently accepted of the remaining ones
//! takes over.

use crate::protocol::ServerFrame;
use crate::utils::common::generate_id;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};

pub type ConnectionId = String;

pub struct ConnectionHandle {
    outbound: mpsc::Sender<String>,
    sequence: u64,
    connected_at: Instant,
}

#[derive(Default)]
struct Registry {
    connections: HashMap<ConnectionId, ConnectionHandle>,
    current: Option<ConnectionId>,
    next_sequence: u64,
}

#[derive(Default)]
pub struct ConnectionRegistry {
    inner: RwLock<Registry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection whose outgoing frames are fed to `outbound` and
    /// makes it current.
    pub async fn register(&self, outbound: mpsc::Sender<String>) -> ConnectionId {
        let mut guard = self.inner.write().await;
        let registry = &mut *guard;

        let mut id = generate_id();
        while registry.connections.contains_key(&id) {
            id = generate_id();
        }

        let sequence = registry.next_sequence;
        registry.next_sequence += 1;
        registry.connections.insert(
            id.clone(),
            ConnectionHandle {
                outbound,
                sequence,
                connected_at: Instant::now(),
            },
        );
        registry.current = Some(id.clone());
        id
    }

    /// Eviction hook for a closed connection. Returns false if the id was
    /// not registered.
    pub async fn remove(&self, id: &str) -> bool {
        let mut guard = self.inner.write().await;
        let registry = &mut *guard;
        let Some(handle) = registry.connections.remove(id) else {
            return false;
        };
        debug!(connection = id, connected_for = ?handle.connected_at.elapsed(), "connection evicted");

        if registry.current.as_deref() == Some(id) {
            registry.current = registry
                .connections
                .iter()
                .max_by_key(|(_, handle)| handle.sequence)
                .map(|(id, _)| id.clone());
            debug!(current = ?registry.current, "current connection replaced after eviction");
        }
        true
    }

    pub async fn current(&self) -> Option<ConnectionId> {
        self.inner.read().await.current.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.connections.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Fire-and-forget event to the current connection. Returns whether the
    /// frame was handed to a live connection.
    pub async fn emit(&self, event: &str, data: Value) -> bool {
        let target = {
            let registry = self.inner.read().await;
            registry
                .current
                .as_ref()
                .and_then(|id| registry.connections.get(id))
                .map(|handle| handle.outbound.clone())
        };

        let Some(outbound) = target else {
            debug!(event, "no current connection for event");
            return false;
        };

        let text = match ServerFrame::event_text(event, data) {
            Ok(text) => text,
            Err(err) => {
                warn!(event, error = %err, "failed to encode event");
                return false;
            }
        };

        outbound.send(text).await.is_ok()
    }
}
