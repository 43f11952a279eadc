pub mod connection;

use crate::utils::path::Workspace;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<crate::config::Config>,
    pub workspace: Arc<Workspace>,
    pub connections: Arc<connection::ConnectionRegistry>,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: crate::config::Config) -> Self {
        let workspace = Workspace::new(config.base_path.clone());

        Self {
            config: Arc::new(config),
            workspace: Arc::new(workspace),
            connections: Arc::new(connection::ConnectionRegistry::new()),
            start_time: std::time::Instant::now(),
        }
    }
}
