//! Score board server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request      ┌──────────────────────────────────────────────┐
//!     ────────────────────┼─▶ axum::serve ─▶ middleware ─▶ handlers      │
//!                         │                                  │    │      │
//!                         │                  GET: stream ◀───┘    │      │
//!                         │                  document             ▼      │
//!                         │                               decode + store │
//!                         │                                       │      │
//!                         │                             database.json    │
//!                         │                                              │
//!                         │  config · observability · lifecycle          │
//!                         └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use score_board::config::{load_config, validate_config, ConfigError, ServerConfig};
use score_board::http::HttpServer;
use score_board::lifecycle::{shutdown_signal, Shutdown};
use score_board::observability::{logging, metrics};
use score_board::store::RecordStore;

#[derive(Parser)]
#[command(name = "score-board")]
#[command(about = "Accepts score submissions and serves the record store", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, overriding `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Port, replacing only the port of the bind address.
    #[arg(short, long)]
    port: Option<u16>,

    /// Store document path, overriding `store.path`.
    #[arg(short, long)]
    store: Option<PathBuf>,
}

impl Cli {
    fn load(&self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ServerConfig::default(),
        };

        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        if let Some(port) = self.port {
            let host = config
                .listener
                .bind_address
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or_else(|| config.listener.bind_address.clone());
            config.listener.bind_address = format!("{}:{}", host, port);
        }
        if let Some(store) = &self.store {
            config.store.path = store.to_string_lossy().into_owned();
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match cli.load() {
        Ok(config) => config,
        Err(e) => {
            logging::init_logging("info");
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    logging::init_logging(&config.observability.log_level);

    tracing::info!("score-board v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        store_path = %config.store.path,
        on_missing = ?config.store.on_missing,
        write_policy = ?config.store.write_policy,
        escape_html = config.response.escape_html,
        "Configuration loaded"
    );

    // The store must load before any socket is opened.
    let store = match RecordStore::open(&config.store) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load record store");
            return Err(e.into());
        }
    };

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = match TcpListener::bind(&config.listener.bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(address = %config.listener.bind_address, error = %e, "Server error");
            return Err(e.into());
        }
    };

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = shutdown.subscribe();
    let signal_shutdown = Arc::clone(&shutdown);
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_shutdown.trigger();
    });

    let server = HttpServer::new(config, store);
    if let Err(e) = server.run(listener, server_shutdown).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
