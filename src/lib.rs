//! Filesystem bridge between a sandboxed editor and a host-side executor.
//!
//! The executor (`router`, `handlers`, `dispatch`) accepts websocket
//! connections and runs filesystem commands against the real disk. The
//! editor side (`client`) proxies its filesystem capability surface over the
//! same connection.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod protocol;
pub mod response;
pub mod router;
pub mod state;
pub mod stats;
pub mod utils;

pub use client::{ClientConfig, FileSystem, FsClient};
pub use error::{ErrorCode, FsError};
pub use stats::StatsDescriptor;
