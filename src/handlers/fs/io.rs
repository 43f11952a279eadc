use super::meta::stat_path;
use super::DEFAULT_FILE_MODE;
use crate::dispatch::Operation;
use crate::error::FsError;
use crate::protocol::{
    Encoding, ReadFileReply, ReadFileRequest, RenameRequest, StatusReply, UnlinkRequest,
    WriteFileReply, WriteFileRequest,
};
use crate::utils::path::Workspace;
use std::io::ErrorKind;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// Reads a file. If the read succeeds but the follow-up stat fails, the
/// contents are still returned with no stats.
pub async fn read_file(workspace: &Workspace, path: &str, encoding: Encoding) -> ReadFileReply {
    let path = match workspace.resolve(path) {
        Ok(path) => path,
        Err(err) => return ReadFileReply::failed(err),
    };

    let data = match fs::read(&path).await {
        Ok(bytes) => match encoding.encode(bytes) {
            Ok(data) => data,
            Err(err) => return ReadFileReply::failed(err),
        },
        Err(err) => return ReadFileReply::failed(err.into()),
    };

    let stats = match stat_path(&path).await {
        Ok(stats) => Some(stats),
        Err(err) => {
            warn!(path = %path, error = %err, "stat after read failed");
            None
        }
    };

    ReadFileReply::read(data, stats)
}

pub async fn write_file(workspace: &Workspace, req: WriteFileRequest) -> WriteFileReply {
    let path = match workspace.resolve(&req.path) {
        Ok(path) => path,
        Err(err) => return WriteFileReply::failed(err),
    };

    let content_bytes = match req.options.encoding.decode(req.data) {
        Ok(bytes) => bytes,
        Err(err) => return WriteFileReply::failed(err),
    };

    let created = match write_contents(&path, &content_bytes, req.options.mode).await {
        Ok(created) => created,
        Err(err) => return WriteFileReply::failed(err),
    };

    match stat_path(&path).await {
        Ok(stats) => WriteFileReply::written(stats, created),
        Err(err) => WriteFileReply::stat_failed(err, created),
    }
}

/// Writes `bytes` to `path`, returning whether the file was created by this
/// write. `mode` only applies to a newly created file.
async fn write_contents(path: &str, bytes: &[u8], mode: Option<u32>) -> Result<bool, FsError> {
    let mut create = fs::OpenOptions::new();
    create.write(true).create_new(true);
    #[cfg(unix)]
    create.mode(mode.unwrap_or(DEFAULT_FILE_MODE));
    #[cfg(not(unix))]
    let _ = mode;

    let (mut file, created) = match create.open(path).await {
        Ok(file) => (file, true),
        Err(err) if err.kind() == ErrorKind::AlreadyExists => (open_truncated(path).await?, false),
        Err(err) => return Err(err.into()),
    };

    file.write_all(bytes).await?;
    file.flush().await?;
    Ok(created)
}

/// Opens an existing file for overwrite. Recreates it if it vanished after
/// the `create_new` attempt.
async fn open_truncated(path: &str) -> Result<fs::File, FsError> {
    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .await?;
    Ok(file)
}

pub async fn rename(workspace: &Workspace, old_path: &str, new_path: &str) -> Result<(), FsError> {
    let old_path = workspace.resolve(old_path)?;
    let new_path = workspace.resolve(new_path)?;
    fs::rename(old_path, new_path).await?;
    Ok(())
}

/// Removes a file, or a directory together with its contents.
pub async fn unlink(workspace: &Workspace, path: &str) -> Result<(), FsError> {
    let path = workspace.resolve(path)?;
    let metadata = fs::symlink_metadata(&path).await?;

    if metadata.is_dir() {
        fs::remove_dir_all(&path).await?;
    } else {
        fs::remove_file(&path).await?;
    }
    Ok(())
}

impl Operation for ReadFileRequest {
    type Reply = ReadFileReply;

    async fn perform(self, workspace: &Workspace) -> ReadFileReply {
        read_file(workspace, &self.path, self.options.encoding).await
    }
}

impl Operation for WriteFileRequest {
    type Reply = WriteFileReply;

    async fn perform(self, workspace: &Workspace) -> WriteFileReply {
        write_file(workspace, self).await
    }
}

impl Operation for RenameRequest {
    type Reply = StatusReply;

    async fn perform(self, workspace: &Workspace) -> StatusReply {
        rename(workspace, &self.old_path, &self.new_path).await.into()
    }
}

impl Operation for UnlinkRequest {
    type Reply = StatusReply;

    async fn perform(self, workspace: &Workspace) -> StatusReply {
        unlink(workspace, &self.path).await.into()
    }
}
