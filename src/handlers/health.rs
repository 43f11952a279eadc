use crate::response::ApiResponse;
use crate::state::AppState;
use axum::extract::State;
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResponse {
    health_status: String,
    uptime: String,
    version: String,
    connections: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessCheckResponse {
    readiness_status: String,
    base_path: bool,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiResponse<HealthCheckResponse> {
    let uptime = state.start_time.elapsed().as_secs();
    ApiResponse::success(HealthCheckResponse {
        health_status: "ok".to_string(),
        uptime: format!("{}s", uptime),
        version: env!("CARGO_PKG_VERSION").to_string(),
        connections: state.connections.len().await,
    })
}

/// Ready once the configured base path is an accessible directory.
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> ApiResponse<ReadinessCheckResponse> {
    let base_path = &state.config.base_path;
    let accessible = tokio::fs::metadata(base_path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false);

    if accessible {
        ApiResponse::success(ReadinessCheckResponse {
            readiness_status: "ready".to_string(),
            base_path: true,
        })
    } else {
        ApiResponse::not_ready(
            format!("Base path {} is not accessible", base_path.display()),
            ReadinessCheckResponse {
                readiness_status: "not_ready".to_string(),
                base_path: false,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::response::Status;
    use std::path::PathBuf;

    fn state_for(base_path: PathBuf) -> State<Arc<AppState>> {
        State(Arc::new(AppState::new(Config {
            addr: "127.0.0.1:0".to_string(),
            base_path,
            log_level: "info".to_string(),
        })))
    }

    #[tokio::test]
    async fn test_ready_with_existing_base_path() {
        let dir = tempfile::tempdir().unwrap();
        let response = readiness_check(state_for(dir.path().to_path_buf())).await;
        assert_eq!(response.status, Status::Success);
        assert!(response.data.base_path);
    }

    #[tokio::test]
    async fn test_not_ready_with_missing_base_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let response = readiness_check(state_for(missing.clone())).await;
        assert_eq!(response.status, Status::NotReady);
        assert!(!response.data.base_path);
        assert!(response.message.contains(&missing.display().to_string()));
    }

    #[tokio::test]
    async fn test_health_counts_connections() {
        let response = health_check(state_for(PathBuf::from("/"))).await;
        assert_eq!(response.status, Status::Success);
        assert_eq!(response.data.connections, 0);
    }
}
