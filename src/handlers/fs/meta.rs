use super::DEFAULT_DIR_MODE;
use crate::dispatch::Operation;
use crate::error::FsError;
use crate::protocol::{ExistsReply, ExistsRequest, MkdirRequest, StatRequest, StatsReply};
use crate::stats::StatsDescriptor;
use crate::utils::path::Workspace;
use std::io::ErrorKind;
use tokio::fs;

/// Only a missing path answers `false`; any other failure to check is an error.
pub async fn exists(workspace: &Workspace, path: &str) -> Result<bool, FsError> {
    let path = workspace.resolve(path)?;
    match fs::metadata(&path).await {
        Ok(_) => Ok(true),
        Err(err) if matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn stat(workspace: &Workspace, path: &str) -> Result<StatsDescriptor, FsError> {
    let path = workspace.resolve(path)?;
    stat_path(&path).await
}

/// Stats an already resolved path.
pub async fn stat_path(path: &str) -> Result<StatsDescriptor, FsError> {
    let metadata = fs::metadata(path).await?;
    Ok(StatsDescriptor::from_metadata(&metadata, path))
}

pub async fn mkdir(
    workspace: &Workspace,
    path: &str,
    mode: Option<u32>,
) -> Result<StatsDescriptor, FsError> {
    let path = workspace.resolve(path)?;

    let mut builder = fs::DirBuilder::new();
    #[cfg(unix)]
    builder.mode(mode.unwrap_or(DEFAULT_DIR_MODE));
    #[cfg(not(unix))]
    let _ = mode;

    builder.create(&path).await?;
    stat_path(&path).await
}

impl Operation for ExistsRequest {
    type Reply = ExistsReply;

    async fn perform(self, workspace: &Workspace) -> ExistsReply {
        exists(workspace, &self.path).await.into()
    }
}

impl Operation for StatRequest {
    type Reply = StatsReply;

    async fn perform(self, workspace: &Workspace) -> StatsReply {
        stat(workspace, &self.path).await.into()
    }
}

impl Operation for MkdirRequest {
    type Reply = StatsReply;

    async fn perform(self, workspace: &Workspace) -> StatsReply {
        mkdir(workspace, &self.path, self.mode).await.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn setup() -> (tempfile::TempDir, Workspace, String) {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path());
        let root = dir.path().to_string_lossy().into_owned();
        (dir, workspace, root)
    }

    #[tokio::test]
    async fn test_exists() {
        let (_dir, workspace, root) = setup();
        std::fs::write(format!("{}/f.txt", root), "x").unwrap();

        assert_eq!(exists(&workspace, &format!("{}/f.txt", root)).await, Ok(true));
        assert_eq!(exists(&workspace, &format!("{}/nope", root)).await, Ok(false));
        // A file used as a directory is simply absent
        assert_eq!(
            exists(&workspace, &format!("{}/f.txt/child", root)).await,
            Ok(false)
        );
        assert_eq!(exists(&workspace, "f.txt").await, Ok(true));
    }

    #[tokio::test]
    async fn test_exists_empty_path_is_error() {
        let (_dir, workspace, _root) = setup();
        let err = exists(&workspace, "").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[tokio::test]
    async fn test_stat_missing() {
        let (_dir, workspace, root) = setup();
        let reply: StatsReply = StatRequest {
            path: format!("{}/missing", root),
        }
        .perform(&workspace)
        .await;
        assert!(reply.stats.is_none());
        assert_eq!(reply.error.unwrap().code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_mkdir_default_mode() {
        let (_dir, workspace, root) = setup();
        let path = format!("{}/a", root);

        let stats = mkdir(&workspace, &path, None).await.unwrap();
        assert!(!stats.is_file);
        assert_eq!(stats.real_path, path);

        let again = stat(&workspace, &path).await.unwrap();
        assert!(!again.is_file);
        assert_eq!(again.hash, stats.hash);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            // umask can only clear bits
            assert_eq!(mode & 0o700, 0o700);
            assert_eq!(mode & 0o022, 0);
        }
    }

    #[tokio::test]
    async fn test_mkdir_existing_fails() {
        let (_dir, workspace, root) = setup();
        let err = mkdir(&workspace, &root, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyExists);
    }

    #[tokio::test]
    async fn test_mkdir_missing_parent_fails() {
        let (_dir, workspace, root) = setup();
        let reply = MkdirRequest {
            path: format!("{}/x/y", root),
            mode: None,
        }
        .perform(&workspace)
        .await;
        assert!(reply.stats.is_none());
        assert_eq!(reply.error.unwrap().code, ErrorCode::NotFound);
    }
}
