use futures::{SinkExt, StreamExt};
use hostfs_bridge::client::{ClientConfig, FileSystem, FsClient, ProtectedPaths};
use hostfs_bridge::config::Config;
use hostfs_bridge::protocol::{ReadOptions, ServerFrame, WriteOptions};
use hostfs_bridge::router::create_router;
use hostfs_bridge::state::AppState;
use hostfs_bridge::ErrorCode;
use serde_json::json;
use std::net::SocketAddr;
use std::path::Path;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::protocol::Message;

async fn spawn_server(base_path: &Path) -> SocketAddr {
    let config = Config {
        addr: "127.0.0.1:0".to_string(),
        base_path: base_path.to_path_buf(),
        log_level: "warn".to_string(),
    };
    let app = create_router(AppState::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn connect(addr: SocketAddr, protected_paths: ProtectedPaths) -> FsClient {
    let mut config = ClientConfig::new(format!("ws://{}/ws", addr));
    config.protected_paths = protected_paths;
    FsClient::connect(config).await.unwrap()
}

#[tokio::test]
async fn test_directory_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_server(dir.path()).await;
    let client = connect(addr, ProtectedPaths::default()).await;

    let root = dir.path().to_string_lossy().into_owned();
    let a = format!("{}/a", root);
    let f = format!("{}/a/f.txt", root);
    let g = format!("{}/a/g.txt", root);

    let created_dir = client.mkdir(&a, None).await.unwrap();
    let stats = client.stat(&a).await.unwrap();
    assert!(!stats.is_file);
    assert_eq!(stats.real_path, a);
    assert_eq!(stats.hash, created_dir.hash);

    let written = client
        .write_file(&f, "hello", WriteOptions::default())
        .await
        .unwrap();
    assert!(written.created);
    let written_stats = written.stats.unwrap();
    assert_eq!(written_stats.size, 5);

    let contents = client.read_file(&f, ReadOptions::default()).await.unwrap();
    assert_eq!(contents.data, "hello");
    assert_eq!(contents.stats.unwrap().hash, written_stats.hash);
    assert_eq!(client.stat(&f).await.unwrap().hash, written_stats.hash);

    client.rename(&f, &g).await.unwrap();
    assert!(!client.exists(&f).await.unwrap());
    assert!(client.exists(&g).await.unwrap());

    let listing = client.readdir(&format!("{}/", a)).await.unwrap();
    assert_eq!(listing.names, vec!["g.txt".to_string()]);
    assert_eq!(
        listing.stats[0].stats().unwrap().real_path,
        format!("{}/g.txt", a)
    );

    client.unlink(&g).await.unwrap();
    assert!(!client.exists(&g).await.unwrap());
    let listing = client.readdir(&format!("{}/", a)).await.unwrap();
    assert!(listing.names.is_empty());
    assert!(listing.stats.is_empty());

    let err = client.unlink(&g).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);

    assert!(client.connection_id().is_some());
}

#[tokio::test]
async fn test_protected_path_is_left_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let state_file = dir.path().join("state.json");
    std::fs::write(&state_file, "{\"local\":true}").unwrap();
    let state_path = state_file.to_string_lossy().into_owned();

    let addr = spawn_server(dir.path()).await;
    let client = connect(addr, ProtectedPaths::none().with_path(state_path.clone())).await;

    let outcome = client
        .write_file(&state_path, "{\"remote\":true}", WriteOptions::default())
        .await
        .unwrap();
    assert_eq!(outcome.stats, None);
    assert!(!outcome.created);
    assert_eq!(
        std::fs::read_to_string(&state_file).unwrap(),
        "{\"local\":true}"
    );
}

#[tokio::test]
async fn test_relative_paths_resolve_against_base_path() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_server(dir.path()).await;
    let client = connect(addr, ProtectedPaths::default()).await;

    let written = client
        .write_file("notes.txt", "hi", WriteOptions::default())
        .await
        .unwrap();
    assert_eq!(
        written.stats.unwrap().real_path,
        dir.path().join("notes.txt").to_string_lossy()
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("notes.txt")).unwrap(),
        "hi"
    );
}

#[tokio::test]
async fn test_unknown_command_gets_a_reply() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_server(dir.path()).await;

    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
        .await
        .unwrap();
    ws.send(Message::Text(
        json!({"type": "call", "id": 42, "command": "chmod", "payload": {"path": "/"}})
            .to_string()
            .into(),
    ))
    .await
    .unwrap();

    loop {
        let message = ws.next().await.unwrap().unwrap();
        let frame: ServerFrame = serde_json::from_str(message.to_text().unwrap()).unwrap();
        if let ServerFrame::Reply { id, result } = frame {
            assert_eq!(id, 42);
            assert_eq!(result["error"]["code"], "UnsupportedCommand");
            break;
        }
    }
}

#[tokio::test]
async fn test_health_reports_connections() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_server(dir.path()).await;
    let client = connect(addr, ProtectedPaths::default()).await;
    // Round trip so the server has registered the connection
    client.exists(&dir.path().to_string_lossy()).await.unwrap();

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    tokio::io::AsyncWriteExt::write_all(
        &mut stream,
        b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await
    .unwrap();
    let mut response = String::new();
    tokio::io::AsyncReadExt::read_to_string(&mut stream, &mut response)
        .await
        .unwrap();

    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains("\"connections\":1"));
    assert!(response.contains("\"healthStatus\":\"ok\""));
}

#[tokio::test]
async fn test_each_connection_receives_its_own_id() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_server(dir.path()).await;
    let root = dir.path().to_string_lossy().into_owned();

    let first = connect(addr, ProtectedPaths::default()).await;
    let second = connect(addr, ProtectedPaths::default()).await;

    // The handshake is queued ahead of any reply on the same socket
    first.exists(&root).await.unwrap();
    second.exists(&root).await.unwrap();

    let first_id = first.connection_id().expect("first connection has an id");
    let second_id = second.connection_id().expect("second connection has an id");
    assert_ne!(first_id, second_id);
}
