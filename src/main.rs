//! Versioned configuration store (v1)
//!
//! Stores versioned YAML configuration documents per service and serves them
//! back, optionally rendered as templates.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http (axum router + tower-http layers)
//!                        │
//!                        ▼
//!                     service (ConfigService)
//!                        │   ├── document (decode, validate, render)
//!                        │   └── versioning (assign / select versions)
//!                        ▼
//!                     store (memory | file snapshot)
//!
//!     Cross-cutting: config, observability, lifecycle
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use config_store::config::loader::{load_config, ConfigError};
use config_store::config::validation::validate_config;
use config_store::config::StorageBackend;
use config_store::lifecycle::{signals, startup, Shutdown};
use config_store::observability::{logging, metrics};
use config_store::{HttpServer, ServerConfig};

#[derive(Parser)]
#[command(name = "config-store")]
#[command(about = "Versioned configuration store", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "CONFIG_STORE_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overrides `listener.bind_address`
    #[arg(short, long, env = "CONFIG_STORE_BIND")]
    bind: Option<String>,

    /// Listen port, overrides the port of the bind address
    #[arg(short, long, env = "APP_PORT")]
    port: Option<u16>,

    /// Snapshot file; enables the file backend
    #[arg(short, long, env = "CONFIG_STORE_DATA")]
    data: Option<PathBuf>,
}

fn resolve_config(args: &Args) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    if let Some(bind) = &args.bind {
        config.listener.bind_address = bind.clone();
    }
    if let Some(port) = args.port {
        let mut addr: SocketAddr = config.listener.bind_address.parse()?;
        addr.set_port(port);
        config.listener.bind_address = addr.to_string();
    }
    if let Some(data) = &args.data {
        config.storage.backend = StorageBackend::File;
        config.storage.path = Some(data.display().to_string());
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    logging::init_logging(&config.observability);
    tracing::info!("config-store v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        storage = ?config.storage.backend,
        request_timeout_secs = config.timeouts.request_secs,
        max_body_bytes = config.limits.max_body_bytes,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let store = startup::open_store(&config.storage).await?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config, store);
    server.run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
