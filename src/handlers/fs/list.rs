use super::meta::stat_path;
use crate::dispatch::Operation;
use crate::error::FsError;
use crate::protocol::{EntryStats, ReaddirReply, ReaddirRequest};
use crate::utils::path::{join_child, Workspace};
use futures::future::join_all;
use tokio::fs;

/// Lists a directory and stats every entry concurrently.
///
/// Results keep the enumeration order of the underlying read. An entry whose
/// stat fails is reported inline; only a failure to read the directory
/// itself fails the call.
pub async fn read_dir(workspace: &Workspace, path: &str) -> ReaddirReply {
    let path = match workspace.resolve(path) {
        Ok(path) => path,
        Err(err) => return ReaddirReply::failed(err),
    };

    let names = match list_names(&path).await {
        Ok(names) => names,
        Err(err) => return ReaddirReply::failed(err),
    };

    let stats = join_all(names.iter().map(|name| {
        let child = join_child(&path, name);
        async move { EntryStats::from(stat_path(&child).await) }
    }))
    .await;

    ReaddirReply::listed(names, stats)
}

async fn list_names(path: &str) -> Result<Vec<String>, FsError> {
    let mut entries = fs::read_dir(path).await?;
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

impl Operation for ReaddirRequest {
    type Reply = ReaddirReply;

    async fn perform(self, workspace: &Workspace) -> ReaddirReply {
        read_dir(workspace, &self.path).await
    }
}
