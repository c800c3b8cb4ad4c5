//! Product CRUD service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (request id, trace, timeout, metrics)
//!                          │
//!                          ▼
//!                     http::products ── http::path (collection / item)
//!                          │
//!                          ▼
//!                     ProductService ── store::locks (per-id or global)
//!                          │
//!                          ▼
//!                     store::gateway ──▶ MySQL / SQLite
//!
//!     Client Response
//!     ◀────────────── http::response (JSON body or error envelope)
//! ```
//!
//! Startup order: config → logging → metrics → provisioning (with retry)
//! → listener. A provisioning failure exits non-zero before any port binds.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use product_service::config::load_config_with;
use product_service::http::HttpServer;
use product_service::lifecycle::{provision_with_retry, signals, Shutdown};
use product_service::observability::{logging, metrics};
use product_service::products::ProductService;
use product_service::store::Locks;

#[derive(Parser)]
#[command(name = "product-service")]
#[command(about = "CRUD HTTP service for product records", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config_with(args.config.as_deref(), |config| {
        if let Some(bind) = args.bind {
            config.listener.bind_address = bind;
        }
    })?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!("product-service v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        table = %config.database.table,
        lock_mode = ?config.locking.mode,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = provision_with_retry(&config.database, &config.provisioning).await?;
    let service = Arc::new(ProductService::new(
        store.clone(),
        Locks::new(config.locking.mode),
    ));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    let server = HttpServer::new(&config, service);
    server.run(listener, shutdown.subscribe()).await?;

    store.close().await;
    tracing::info!("Shutdown complete");
    Ok(())
}
