//! WebSocket text frames. Every frame is a JSON object tagged by `type`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientFrame {
    /// `command` stays a raw string so unknown names can still be answered.
    Call {
        id: u64,
        command: String,
        #[serde(default)]
        payload: Value,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerFrame {
    Reply {
        id: u64,
        result: Value,
    },
    Event {
        event: String,
        #[serde(default)]
        data: Value,
    },
}

pub const CONNECTED_EVENT: &str = "connected";

impl ServerFrame {
    /// Encodes an event frame as websocket text.
    pub fn event_text(event: &str, data: Value) -> Result<String, serde_json::Error> {
        serde_json::to_string(&ServerFrame::Event {
            event: event.to_string(),
            data,
        })
    }
}
