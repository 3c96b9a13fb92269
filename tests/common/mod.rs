//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use score_board::config::{ServerConfig, StoreConfig, WritePolicy};
use score_board::http::HttpServer;
use score_board::lifecycle::Shutdown;
use score_board::store::RecordStore;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// A server running on an ephemeral port over a temp-dir store.
pub struct TestServer {
    pub addr: SocketAddr,
    pub store: Arc<RecordStore>,
    pub document: PathBuf,
    shutdown: Shutdown,
    _dir: TempDir,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    #[allow(dead_code)]
    pub async fn with_write_policy(policy: WritePolicy) -> Self {
        Self::start_with(|config| config.store.write_policy = policy).await
    }

    #[allow(dead_code)]
    pub async fn start_with(configure: impl FnOnce(&mut ServerConfig)) -> Self {
        let dir = TempDir::new().unwrap();
        let document = dir.path().join("database.json");

        let mut config = ServerConfig::default();
        config.listener.bind_address = "127.0.0.1:0".into();
        config.store = StoreConfig {
            path: document.to_string_lossy().into_owned(),
            ..StoreConfig::default()
        };
        configure(&mut config);

        let store = Arc::new(RecordStore::open(&config.store).unwrap());
        let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
        let addr = listener.local_addr().unwrap();

        let shutdown = Shutdown::new();
        let server = HttpServer::new(config, Arc::clone(&store));
        let server_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, server_shutdown).await;
        });

        Self {
            addr,
            store,
            document,
            shutdown,
            _dir: dir,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap()
    }

    /// The document as currently on disk.
    #[allow(dead_code)]
    pub fn disk(&self) -> serde_json::Map<String, serde_json::Value> {
        let content = std::fs::read_to_string(&self.document).unwrap();
        serde_json::from_str(&content).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}
