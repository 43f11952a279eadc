//! Editor-side proxy for the executor.
//!
//! [`FsClient`] implements the editor's [`FileSystem`] capability surface by
//! turning each call into a command on a [`Transport`] and mapping the reply
//! back into typed results. Writes to protected paths are acknowledged
//! without ever reaching the transport.

pub mod guard;
pub mod transport;

use crate::error::{ErrorCode, FsError};
use crate::protocol::{
    CommandKind, DirectoryListing, ExistsReply, ExistsRequest, FileContents, MkdirRequest,
    ReadFileReply, ReadFileRequest, ReadOptions, ReaddirReply, ReaddirRequest, RenameRequest,
    StatRequest, StatsReply, StatusReply, UnlinkRequest, WriteFailure, WriteFileReply,
    WriteFileRequest, WriteOptions, WriteOutcome,
};
use crate::stats::StatsDescriptor;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

pub use guard::{ProtectedPaths, SESSION_STATE_PATH};
pub use transport::{Transport, WsTransport};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Executor websocket endpoint, e.g. `ws://127.0.0.1:3000/ws`
    pub url: String,
    pub request_timeout: Duration,
    pub protected_paths: ProtectedPaths,
}

impl ClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            protected_paths: ProtectedPaths::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OpenDialog {
    pub allow_multiple_selection: bool,
    pub choose_directories: bool,
    pub title: String,
    pub initial_path: String,
    pub file_types: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SaveDialog {
    pub title: String,
    pub initial_path: String,
    pub proposed_new_filename: String,
}

/// The filesystem capability surface consumed by the editor.
#[allow(async_fn_in_trait)]
pub trait FileSystem {
    async fn show_open_dialog(&self, dialog: OpenDialog) -> Result<Vec<String>, FsError>;
    async fn show_save_dialog(&self, dialog: SaveDialog) -> Result<String, FsError>;
    async fn exists(&self, path: &str) -> Result<bool, FsError>;
    async fn readdir(&self, path: &str) -> Result<DirectoryListing, FsError>;
    async fn mkdir(&self, path: &str, mode: Option<u32>) -> Result<StatsDescriptor, FsError>;
    async fn rename(&self, old_path: &str, new_path: &str) -> Result<(), FsError>;
    async fn stat(&self, path: &str) -> Result<StatsDescriptor, FsError>;
    async fn read_file(&self, path: &str, options: ReadOptions) -> Result<FileContents, FsError>;
    async fn write_file(
        &self,
        path: &str,
        data: &str,
        options: WriteOptions,
    ) -> Result<WriteOutcome, WriteFailure>;
    async fn unlink(&self, path: &str) -> Result<(), FsError>;
    async fn init_watchers(&self) -> Result<(), FsError>;
    async fn watch_path(&self, path: &str) -> Result<(), FsError>;
    async fn unwatch_path(&self, path: &str) -> Result<(), FsError>;
    async fn unwatch_all(&self) -> Result<(), FsError>;

    fn recursive_watch(&self) -> bool {
        false
    }

    fn normalize_unc_paths(&self) -> bool {
        false
    }
}

pub struct FsClient<T = WsTransport> {
    transport: T,
    protected: ProtectedPaths,
}

impl FsClient<WsTransport> {
    pub async fn connect(config: ClientConfig) -> Result<Self, FsError> {
        let transport = WsTransport::connect(&config.url, config.request_timeout).await?;
        Ok(Self::with_transport(transport, config.protected_paths))
    }

    pub fn connection_id(&self) -> Option<String> {
        self.transport.connection_id()
    }
}

impl<T: Transport> FsClient<T> {
    pub fn with_transport(transport: T, protected: ProtectedPaths) -> Self {
        Self {
            transport,
            protected,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn request<Req, Rep>(&self, command: CommandKind, req: &Req) -> Result<Rep, FsError>
    where
        Req: Serialize,
        Rep: DeserializeOwned,
    {
        let payload = serde_json::to_value(req)?;
        let result = self.transport.call(command, payload).await?;
        serde_json::from_value(result).map_err(|e| {
            FsError::new(
                ErrorCode::InvalidData,
                format!("Malformed {} reply: {}", command, e),
            )
        })
    }
}

fn not_supported(what: &str) -> FsError {
    FsError::new(
        ErrorCode::NotSupported,
        format!("{} is not supported", what),
    )
}

fn not_implemented(what: &str) -> FsError {
    FsError::new(
        ErrorCode::NotImplemented,
        format!("{} is not implemented", what),
    )
}

impl<T: Transport> FileSystem for FsClient<T> {
    async fn show_open_dialog(&self, _dialog: OpenDialog) -> Result<Vec<String>, FsError> {
        Err(not_implemented("Open dialog"))
    }

    async fn show_save_dialog(&self, _dialog: SaveDialog) -> Result<String, FsError> {
        Err(not_implemented("Save dialog"))
    }

    async fn exists(&self, path: &str) -> Result<bool, FsError> {
        debug!(path, "exists");
        let reply: ExistsReply = self
            .request(
                CommandKind::Exists,
                &ExistsRequest {
                    path: path.to_string(),
                },
            )
            .await?;
        reply.into_result()
    }

    async fn readdir(&self, path: &str) -> Result<DirectoryListing, FsError> {
        debug!(path, "readdir");
        let reply: ReaddirReply = self
            .request(
                CommandKind::Readdir,
                &ReaddirRequest {
                    path: path.to_string(),
                },
            )
            .await?;
        reply.into_result()
    }

    async fn mkdir(&self, path: &str, mode: Option<u32>) -> Result<StatsDescriptor, FsError> {
        debug!(path, ?mode, "mkdir");
        let reply: StatsReply = self
            .request(
                CommandKind::Mkdir,
                &MkdirRequest {
                    path: path.to_string(),
                    mode,
                },
            )
            .await?;
        reply.into_result()
    }

    async fn rename(&self, old_path: &str, new_path: &str) -> Result<(), FsError> {
        debug!(old_path, new_path, "rename");
        let reply: StatusReply = self
            .request(
                CommandKind::Rename,
                &RenameRequest {
                    old_path: old_path.to_string(),
                    new_path: new_path.to_string(),
                },
            )
            .await?;
        reply.into_result()
    }

    async fn stat(&self, path: &str) -> Result<StatsDescriptor, FsError> {
        debug!(path, "stat");
        let reply: StatsReply = self
            .request(
                CommandKind::Stat,
                &StatRequest {
                    path: path.to_string(),
                },
            )
            .await?;
        reply.into_result()
    }

    async fn read_file(&self, path: &str, options: ReadOptions) -> Result<FileContents, FsError> {
        debug!(path, "readfile");
        let reply: ReadFileReply = self
            .request(
                CommandKind::Readfile,
                &ReadFileRequest {
                    path: path.to_string(),
                    options,
                },
            )
            .await?;
        reply.into_result()
    }

    async fn write_file(
        &self,
        path: &str,
        data: &str,
        options: WriteOptions,
    ) -> Result<WriteOutcome, WriteFailure> {
        if self.protected.contains(path) {
            debug!(path, "skipping write to protected path");
            return Ok(WriteOutcome::default());
        }

        debug!(path, "writefile");
        let reply: WriteFileReply = self
            .request(
                CommandKind::Writefile,
                &WriteFileRequest {
                    path: path.to_string(),
                    data: data.to_string(),
                    options,
                },
            )
            .await
            .map_err(|error| WriteFailure {
                error,
                created: false,
            })?;
        reply.into_result()
    }

    async fn unlink(&self, path: &str) -> Result<(), FsError> {
        debug!(path, "unlink");
        let reply: StatusReply = self
            .request(
                CommandKind::Unlink,
                &UnlinkRequest {
                    path: path.to_string(),
                },
            )
            .await?;
        reply.into_result()
    }

    async fn init_watchers(&self) -> Result<(), FsError> {
        Err(not_supported("File watching"))
    }

    async fn watch_path(&self, _path: &str) -> Result<(), FsError> {
        Err(not_supported("File watching"))
    }

    async fn unwatch_path(&self, _path: &str) -> Result<(), FsError> {
        Err(not_supported("File watching"))
    }

    async fn unwatch_all(&self) -> Result<(), FsError> {
        Err(not_supported("File watching"))
    }
}
