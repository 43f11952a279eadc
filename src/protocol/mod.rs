pub mod frame;

use crate::error::{ErrorCode, FsError};
use crate::stats::StatsDescriptor;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use frame::{ClientFrame, ServerFrame};

/// The closed set of commands the executor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Exists,
    Stat,
    Readdir,
    Mkdir,
    Readfile,
    Writefile,
    Rename,
    Unlink,
}

impl CommandKind {
    pub const ALL: [CommandKind; 8] = [
        CommandKind::Exists,
        CommandKind::Stat,
        CommandKind::Readdir,
        CommandKind::Mkdir,
        CommandKind::Readfile,
        CommandKind::Writefile,
        CommandKind::Rename,
        CommandKind::Unlink,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::Exists => "exists",
            CommandKind::Stat => "stat",
            CommandKind::Readdir => "readdir",
            CommandKind::Mkdir => "mkdir",
            CommandKind::Readfile => "readfile",
            CommandKind::Writefile => "writefile",
            CommandKind::Rename => "rename",
            CommandKind::Unlink => "unlink",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandKind {
    type Err = FsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                FsError::new(
                    ErrorCode::UnsupportedCommand,
                    format!("Unsupported command: {}", s),
                )
            })
    }
}

/// How file contents travel inside the JSON payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    #[serde(alias = "utf-8")]
    Utf8,
    Base64,
}

impl Encoding {
    pub fn encode(self, bytes: Vec<u8>) -> Result<String, FsError> {
        match self {
            Encoding::Utf8 => String::from_utf8(bytes).map_err(|e| {
                FsError::new(ErrorCode::InvalidData, format!("Invalid UTF-8: {}", e))
            }),
            Encoding::Base64 => Ok(general_purpose::STANDARD.encode(bytes)),
        }
    }

    pub fn decode(self, data: String) -> Result<Vec<u8>, FsError> {
        match self {
            Encoding::Utf8 => Ok(data.into_bytes()),
            Encoding::Base64 => general_purpose::STANDARD
                .decode(&data)
                .map_err(|e| FsError::invalid_input(format!("Invalid base64: {}", e))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistsRequest {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatRequest {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaddirRequest {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlinkRequest {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MkdirRequest {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadOptions {
    #[serde(default)]
    pub encoding: Encoding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadFileRequest {
    pub path: String,
    #[serde(default)]
    pub options: ReadOptions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WriteOptions {
    #[serde(default)]
    pub encoding: Encoding,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteFileRequest {
    pub path: String,
    pub data: String,
    #[serde(default)]
    pub options: WriteOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    pub old_path: String,
    pub new_path: String,
}

/// One slot of a directory listing: either the entry's stats or the error
/// that prevented stat-ing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryStats {
    Stats(StatsDescriptor),
    Error(FsError),
}

impl EntryStats {
    pub fn stats(&self) -> Option<&StatsDescriptor> {
        match self {
            EntryStats::Stats(stats) => Some(stats),
            EntryStats::Error(_) => None,
        }
    }
}

impl From<Result<StatsDescriptor, FsError>> for EntryStats {
    fn from(result: Result<StatsDescriptor, FsError>) -> Self {
        match result {
            Ok(stats) => EntryStats::Stats(stats),
            Err(err) => EntryStats::Error(err),
        }
    }
}

// Replies. Every field is optional on the wire so that a bare `{error}`
// reply decodes as any of them.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<FsError>,
}

impl StatusReply {
    pub fn ok() -> Self {
        Self { error: None }
    }

    pub fn failed(error: FsError) -> Self {
        Self { error: Some(error) }
    }

    pub fn into_result(self) -> Result<(), FsError> {
        self.error.map_or(Ok(()), Err)
    }
}

impl From<Result<(), FsError>> for StatusReply {
    fn from(result: Result<(), FsError>) -> Self {
        match result {
            Ok(()) => StatusReply::ok(),
            Err(err) => StatusReply::failed(err),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExistsReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<FsError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exists: Option<bool>,
}

impl ExistsReply {
    pub fn into_result(self) -> Result<bool, FsError> {
        match (self.error, self.exists) {
            (Some(err), _) => Err(err),
            (None, Some(exists)) => Ok(exists),
            (None, None) => Err(missing_field("exists")),
        }
    }
}

impl From<Result<bool, FsError>> for ExistsReply {
    fn from(result: Result<bool, FsError>) -> Self {
        match result {
            Ok(exists) => Self {
                error: None,
                exists: Some(exists),
            },
            Err(err) => Self {
                error: Some(err),
                exists: None,
            },
        }
    }
}

/// Reply for `stat` and `mkdir`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<FsError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatsDescriptor>,
}

impl StatsReply {
    pub fn into_result(self) -> Result<StatsDescriptor, FsError> {
        match (self.error, self.stats) {
            (Some(err), _) => Err(err),
            (None, Some(stats)) => Ok(stats),
            (None, None) => Err(missing_field("stats")),
        }
    }
}

impl From<Result<StatsDescriptor, FsError>> for StatsReply {
    fn from(result: Result<StatsDescriptor, FsError>) -> Self {
        match result {
            Ok(stats) => Self {
                error: None,
                stats: Some(stats),
            },
            Err(err) => Self {
                error: Some(err),
                stats: None,
            },
        }
    }
}

/// Names and stats are positionally aligned, in directory enumeration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReaddirReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<FsError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Vec<EntryStats>>,
}

impl ReaddirReply {
    pub fn listed(names: Vec<String>, stats: Vec<EntryStats>) -> Self {
        Self {
            error: None,
            names: Some(names),
            stats: Some(stats),
        }
    }

    pub fn failed(error: FsError) -> Self {
        Self {
            error: Some(error),
            names: None,
            stats: None,
        }
    }

    pub fn into_result(self) -> Result<DirectoryListing, FsError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let names = self.names.ok_or_else(|| missing_field("names"))?;
        let stats = self.stats.ok_or_else(|| missing_field("stats"))?;
        if names.len() != stats.len() {
            return Err(FsError::new(
                ErrorCode::InvalidData,
                format!(
                    "Malformed reply: {} names but {} stats",
                    names.len(),
                    stats.len()
                ),
            ));
        }
        Ok(DirectoryListing { names, stats })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryListing {
    pub names: Vec<String>,
    pub stats: Vec<EntryStats>,
}

impl DirectoryListing {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &EntryStats)> {
        self.names.iter().map(String::as_str).zip(self.stats.iter())
    }
}

/// A successful read whose post-read stat failed still carries `data`, with
/// `stats` left empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadFileReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<FsError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatsDescriptor>,
}

impl ReadFileReply {
    pub fn read(data: String, stats: Option<StatsDescriptor>) -> Self {
        Self {
            error: None,
            data: Some(data),
            stats,
        }
    }

    pub fn failed(error: FsError) -> Self {
        Self {
            error: Some(error),
            data: None,
            stats: None,
        }
    }

    pub fn into_result(self) -> Result<FileContents, FsError> {
        match (self.error, self.data) {
            (Some(err), _) => Err(err),
            (None, Some(data)) => Ok(FileContents {
                data,
                stats: self.stats,
            }),
            (None, None) => Err(missing_field("data")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileContents {
    pub data: String,
    pub stats: Option<StatsDescriptor>,
}

/// `created` reports whether the write created the file. A post-write stat
/// failure sets `error` but leaves `created` as the write determined it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteFileReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<FsError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatsDescriptor>,
    #[serde(default)]
    pub created: bool,
}

impl WriteFileReply {
    pub fn written(stats: StatsDescriptor, created: bool) -> Self {
        Self {
            error: None,
            stats: Some(stats),
            created,
        }
    }

    pub fn stat_failed(error: FsError, created: bool) -> Self {
        Self {
            error: Some(error),
            stats: None,
            created,
        }
    }

    pub fn failed(error: FsError) -> Self {
        Self::stat_failed(error, false)
    }

    pub fn into_result(self) -> Result<WriteOutcome, WriteFailure> {
        match self.error {
            Some(error) => Err(WriteFailure {
                error,
                created: self.created,
            }),
            None => Ok(WriteOutcome {
                stats: self.stats,
                created: self.created,
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteOutcome {
    pub stats: Option<StatsDescriptor>,
    pub created: bool,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{error}")]
pub struct WriteFailure {
    pub error: FsError,
    pub created: bool,
}

fn missing_field(field: &str) -> FsError {
    FsError::new(
        ErrorCode::InvalidData,
        format!("Malformed reply: missing `{}`", field),
    )
}
