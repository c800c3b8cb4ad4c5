//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use product_service::config::ServiceConfig;
use product_service::http::HttpServer;
use product_service::lifecycle::{provision_with_retry, Shutdown};
use product_service::products::ProductService;
use product_service::store::{LockMode, Locks, SqlProductStore};

/// A running service backed by an in-memory SQLite store.
pub struct TestService {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    /// Handle onto the serving pool, for injecting store failures.
    pub store: SqlProductStore,
    shutdown: Shutdown,
}

impl TestService {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestService {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Provision a fresh store and serve it on an ephemeral port.
pub async fn start_service(mode: LockMode) -> TestService {
    let mut config = ServiceConfig::default();
    config.database.url = "sqlite::memory:".into();
    // Each in-memory connection is its own database.
    config.database.max_connections = 1;
    config.listener.bind_address = "127.0.0.1:0".into();
    config.locking.mode = mode;

    let store = provision_with_retry(&config.database, &config.provisioning)
        .await
        .expect("provision in-memory store");
    let service = Arc::new(ProductService::new(store.clone(), Locks::new(mode)));

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, service);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap();

    TestService {
        addr,
        client,
        store,
        shutdown,
    }
}
