//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request tracing, timeout, body limit, panic capture)
//! - Start the health sampler alongside the listener
//! - Serve until the shutdown broadcast fires

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
};

use crate::auction::AuctionBidEngine;
use crate::config::AppConfig;
use crate::dashboard::{AlertEvaluator, DashboardState};
use crate::health::HealthSampler;
use crate::http::handlers::{auth, bid, books, dashboard};
use crate::http::middleware::{request_tracing_middleware, TracingState};
use crate::lifecycle::Shutdown;
use crate::observability::MetricsRegistry;
use crate::storage::BookStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn BookStore>,
    pub metrics: Arc<MetricsRegistry>,
    pub dashboard: Arc<DashboardState>,
    pub engine: Arc<AuctionBidEngine>,
    pub alerts: AlertEvaluator,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<dyn BookStore>,
        metrics: Arc<MetricsRegistry>,
        dashboard: Arc<DashboardState>,
    ) -> Self {
        let engine = Arc::new(AuctionBidEngine::new(
            store.clone(),
            metrics.clone(),
            config.bidding.clone(),
            Duration::from_millis(config.timeouts.storage_ms),
        ));
        let alerts = AlertEvaluator::new(config.dashboard.latency_threshold_ms);

        Self {
            config,
            store,
            metrics,
            dashboard,
            engine,
            alerts,
        }
    }
}

/// HTTP server for the BookSwap API.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    pub fn new(state: AppState) -> Self {
        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Request tracing is outermost so timeouts, oversized bodies and
    /// panics are all counted and carry a trace id.
    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        let config = state.config.clone();
        let tracing_state = TracingState {
            dashboard: state.dashboard.clone(),
            latency_threshold_ms: config.dashboard.latency_threshold_ms,
        };

        Router::new()
            .route("/bid", post(bid::place_bid))
            .route("/login", post(auth::login))
            .route("/api/dashboard-stats", get(dashboard::dashboard_stats))
            .route("/api/books", get(books::list_books).post(books::create_book))
            .route("/api/books/{id}", get(books::get_book))
            .route("/metrics", get(dashboard::metrics))
            .route("/health", get(dashboard::health))
            .with_state(state)
            .layer(CatchPanicLayer::new())
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(middleware::from_fn_with_state(
                tracing_state,
                request_tracing_middleware,
            ))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let sampler = if self.state.config.sampler.enabled {
            let sampler = HealthSampler::new(self.state.metrics.clone(), &self.state.config.sampler);
            Some(tokio::spawn(sampler.run(shutdown.subscribe())))
        } else {
            tracing::info!("Health sampler disabled");
            None
        };

        let mut stop = shutdown.subscribe();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
            })
            .await?;

        if let Some(handle) = sampler {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Health sampler task failed");
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
