//! Dashboard polling, Prometheus scrape and liveness endpoints.

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::dashboard::{Alert, LogEntry};
use crate::http::server::AppState;

/// Target shown next to the latency figure on the dashboard.
const P95_THRESHOLD_MS: u64 = 200;
/// Target shown next to the CPU figure on the dashboard.
const CPU_THRESHOLD_PERCENT: u64 = 90;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub availability: f64,
    pub error_budget_used: u64,
    /// Latest request latency; the name is what the dashboard expects.
    pub p95_latency: u64,
    pub p95_threshold: u64,
    pub cpu_usage: f64,
    pub cpu_threshold: u64,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub metrics: DashboardMetrics,
    pub logs: Vec<LogEntry>,
    pub alerts: Vec<Alert>,
}

pub async fn dashboard_stats(State(state): State<AppState>) -> Json<DashboardStats> {
    let snapshot = state.dashboard.snapshot();
    let cpu = state.metrics.cpu_usage();
    let report = state.alerts.evaluate(&snapshot, cpu);

    Json(DashboardStats {
        metrics: DashboardMetrics {
            availability: round_to(report.availability, 2),
            error_budget_used: report.error_budget_used,
            p95_latency: snapshot.latest_latency_ms as u64,
            p95_threshold: P95_THRESHOLD_MS,
            cpu_usage: round_to(cpu, 1),
            cpu_threshold: CPU_THRESHOLD_PERCENT,
        },
        logs: snapshot.logs,
        alerts: report.alerts,
    })
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
