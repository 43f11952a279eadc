//! Normalized per-path metadata.
//!
//! `hash` is a change-detection fingerprint: the millisecond epoch value of
//! `mtime`. An upstream cache treats two descriptors for the same `realPath`
//! as equivalent iff their hashes match.

use serde::{Deserialize, Serialize};
use std::fs::Metadata;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDescriptor {
    pub is_file: bool,
    #[serde(with = "epoch_millis")]
    pub mtime: SystemTime,
    pub size: u64,
    pub real_path: String,
    pub hash: i64,
}

impl StatsDescriptor {
    /// Builds a descriptor, truncating `mtime` to millisecond precision so it
    /// survives the wire unchanged.
    pub fn new(is_file: bool, mtime: SystemTime, size: u64, real_path: impl Into<String>) -> Self {
        let hash = to_epoch_millis(mtime);
        Self {
            is_file,
            mtime: from_epoch_millis(hash),
            size,
            real_path: real_path.into(),
            hash,
        }
    }

    pub fn from_metadata(metadata: &Metadata, real_path: impl Into<String>) -> Self {
        // Platforms without mtime support report the epoch.
        let mtime = metadata.modified().unwrap_or(UNIX_EPOCH);
        Self::new(metadata.is_file(), mtime, metadata.len(), real_path)
    }
}

pub fn to_epoch_millis(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_millis()).unwrap_or(i64::MAX),
        Err(before) => -i64::try_from(before.duration().as_millis()).unwrap_or(i64::MAX),
    }
}

pub fn from_epoch_millis(millis: i64) -> SystemTime {
    if millis >= 0 {
        UNIX_EPOCH + Duration::from_millis(millis as u64)
    } else {
        UNIX_EPOCH - Duration::from_millis(millis.unsigned_abs())
    }
}

mod epoch_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::SystemTime;

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(super::to_epoch_millis(*time))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        i64::deserialize(deserializer).map(super::from_epoch_millis)
    }
}
