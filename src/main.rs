//! BookSwap backend.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request tracing middleware ──▶ handlers ──▶ AuctionBidEngine ──▶ BookStore
//!                       │ trace id, timing                │                             (CAS)
//!                       ▼                                 ▼
//!                 DashboardState ◀── DashboardLayer   MetricsRegistry ◀── HealthSampler
//!                       │               (tracing)         │                 (CPU gauge)
//!                       └──────────▶ /api/dashboard-stats ◀┘
//!                                     AlertEvaluator
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use bookswap::config::{load_config, load_from_env};
use bookswap::dashboard::DashboardState;
use bookswap::lifecycle::{serve_then_persist, spawn_signal_handler, Shutdown};
use bookswap::observability::{logging, MetricsRegistry};
use bookswap::storage::{seed::seed_demo_data, BookStore, MemoryStore};
use bookswap::{AppState, HttpServer};

#[derive(Parser)]
#[command(name = "bookswap")]
#[command(about = "BookSwap auction backend", long_about = None)]
struct Args {
    /// Path to a TOML config file. Defaults plus environment overrides when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => load_from_env()?,
    };
    let config = Arc::new(config);

    let dashboard = Arc::new(DashboardState::new());
    logging::init_logging(&config.observability, dashboard.clone())?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        one_click_bid_enabled = config.bidding.one_click_enabled,
        latency_threshold_ms = config.dashboard.latency_threshold_ms,
        "BookSwap backend starting"
    );

    let metrics = Arc::new(MetricsRegistry::new()?);

    let store = match &config.storage.snapshot_path {
        Some(path) => MemoryStore::load_from_file(path)?,
        None => MemoryStore::new(None),
    };
    if config.storage.seed_demo_data {
        seed_demo_data(&store).await?;
    }
    let store = Arc::new(store);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    let state = AppState::new(
        config.clone(),
        store.clone() as Arc<dyn BookStore>,
        metrics,
        dashboard,
    );
    serve_then_persist(HttpServer::new(state).run(listener, shutdown), &store).await?;
    tracing::info!("Shutdown complete");
    Ok(())
}
