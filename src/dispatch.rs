//! Routes a command name to its operation handler.

use crate::error::FsError;
use crate::protocol::{
    CommandKind, ExistsRequest, MkdirRequest, ReadFileRequest, ReaddirRequest, RenameRequest,
    StatRequest, StatusReply, UnlinkRequest, WriteFileRequest,
};
use crate::utils::path::Workspace;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::future::Future;
use tracing::{debug, warn};

/// A decoded command payload that knows how to perform itself against the
/// filesystem and package the outcome as a reply.
pub trait Operation: DeserializeOwned + Send {
    type Reply: Serialize;

    fn perform(self, workspace: &Workspace) -> impl Future<Output = Self::Reply> + Send;
}

/// Runs one command and returns the reply object to send back.
///
/// Unknown command names answer `UnsupportedCommand` and undecodable payloads
/// answer `InvalidInput`; the caller always gets a reply.
pub async fn dispatch(workspace: &Workspace, command: &str, payload: Value) -> Value {
    let kind = match command.parse::<CommandKind>() {
        Ok(kind) => kind,
        Err(err) => {
            warn!(command, "rejecting unsupported command");
            return encode(&StatusReply::failed(err));
        }
    };

    debug!(command = %kind, "dispatching");

    match kind {
        CommandKind::Exists => run::<ExistsRequest>(workspace, payload).await,
        CommandKind::Stat => run::<StatRequest>(workspace, payload).await,
        CommandKind::Readdir => run::<ReaddirRequest>(workspace, payload).await,
        CommandKind::Mkdir => run::<MkdirRequest>(workspace, payload).await,
        CommandKind::Readfile => run::<ReadFileRequest>(workspace, payload).await,
        CommandKind::Writefile => run::<WriteFileRequest>(workspace, payload).await,
        CommandKind::Rename => run::<RenameRequest>(workspace, payload).await,
        CommandKind::Unlink => run::<UnlinkRequest>(workspace, payload).await,
    }
}

async fn run<O: Operation>(workspace: &Workspace, payload: Value) -> Value {
    match serde_json::from_value::<O>(payload) {
        Ok(operation) => encode(&operation.perform(workspace).await),
        Err(err) => encode(&StatusReply::failed(FsError::invalid_input(format!(
            "Invalid payload: {}",
            err
        )))),
    }
}

fn encode<R: Serialize>(reply: &R) -> Value {
    serde_json::to_value(reply).unwrap_or_else(|err| {
        json!({ "error": { "code": "Io", "message": format!("Failed to encode reply: {}", err) } })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::protocol::{ExistsReply, StatsReply};

    fn error_code(reply: &Value) -> ErrorCode {
        serde_json::from_value(reply["error"]["code"].clone()).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_command_replies_unsupported() {
        let workspace = Workspace::new("/");
        let reply = dispatch(&workspace, "chmod", json!({"path": "/tmp"})).await;
        assert_eq!(error_code(&reply), ErrorCode::UnsupportedCommand);
    }

    #[tokio::test]
    async fn test_bad_payload_replies_invalid_input() {
        let workspace = Workspace::new("/");
        let reply = dispatch(&workspace, "stat", json!({"file": "/tmp"})).await;
        assert_eq!(error_code(&reply), ErrorCode::InvalidInput);

        let reply = dispatch(&workspace, "rename", Value::Null).await;
        assert_eq!(error_code(&reply), ErrorCode::InvalidInput);
    }

    #[tokio::test]
    async fn test_routes_to_handler() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_string_lossy().into_owned();
        let workspace = Workspace::new(dir.path());

        let reply = dispatch(&workspace, "exists", json!({ "path": path })).await;
        let exists: ExistsReply = serde_json::from_value(reply).unwrap();
        assert_eq!(exists.into_result(), Ok(true));

        let reply = dispatch(&workspace, "stat", json!({ "path": path })).await;
        let stats: StatsReply = serde_json::from_value(reply).unwrap();
        let stats = stats.into_result().unwrap();
        assert!(!stats.is_file);
        assert_eq!(stats.real_path, path);
    }
}
