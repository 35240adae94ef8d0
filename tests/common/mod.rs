//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bookswap::config::AppConfig;
use bookswap::dashboard::DashboardState;
use bookswap::lifecycle::Shutdown;
use bookswap::observability::MetricsRegistry;
use bookswap::storage::{seed::seed_demo_data, BookStore, MemoryStore};
use bookswap::{AppState, HttpServer};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A running server on an ephemeral local port.
#[allow(dead_code)]
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    pub store: Arc<MemoryStore>,
    pub dashboard: Arc<DashboardState>,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<()>,
}

#[allow(dead_code)]
impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Stop the server and wait for it to drain.
    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not shut down")
            .unwrap();
    }
}

/// Boot the real server with zero processing delay, no sampler and demo data.
pub async fn spawn_app<F: FnOnce(&mut AppConfig)>(configure: F) -> TestApp {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.bidding.fast_path_delay_ms = 0;
    config.bidding.standard_delay_ms = 0;
    config.sampler.enabled = false;
    configure(&mut config);

    let store = Arc::new(MemoryStore::new(None));
    if config.storage.seed_demo_data {
        seed_demo_data(store.as_ref()).await.unwrap();
    }
    let dashboard = Arc::new(DashboardState::new());
    let metrics = Arc::new(MetricsRegistry::new().unwrap());

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let state = AppState::new(
        Arc::new(config),
        store.clone() as Arc<dyn BookStore>,
        metrics,
        dashboard.clone(),
    );
    let shutdown = Shutdown::new();
    let server = HttpServer::new(state);
    let server_shutdown = shutdown.clone();
    let handle = tokio::spawn(async move {
        server.run(listener, server_shutdown).await.unwrap();
    });
    while shutdown.receiver_count() == 0 {
        tokio::task::yield_now().await;
    }

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();

    TestApp {
        addr,
        client,
        store,
        dashboard,
        shutdown,
        handle,
    }
}
