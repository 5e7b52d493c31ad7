//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use static_alias::config::{finalize_config, ServerConfig};
use static_alias::http::HttpServer;
use static_alias::lifecycle::Shutdown;
use static_alias::routing::AliasRouter;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Create a temporary site. Entries ending in `/` are directories.
#[allow(dead_code)]
pub fn build_site(entries: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (path, contents) in entries {
        let full = dir.path().join(path.trim_start_matches('/'));
        if path.ends_with('/') {
            std::fs::create_dir_all(&full).unwrap();
        } else {
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(&full, contents).unwrap();
        }
    }
    dir
}

/// Configuration serving `root` on an ephemeral port.
#[allow(dead_code)]
pub fn config_for(root: &Path) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.root = root.to_path_buf();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    finalize_config(config).unwrap()
}

/// Start a server around `router` and return its address.
#[allow(dead_code)]
pub async fn start_server(config: ServerConfig, router: AliasRouter) -> (SocketAddr, Shutdown) {
    let server = HttpServer::with_router(config, Arc::new(router));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

/// Plain HTTP client that never goes through a proxy.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
