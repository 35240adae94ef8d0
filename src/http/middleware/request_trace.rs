//! Request tracing middleware.
//!
//! Wraps every request: assigns a [`TraceContext`], runs the handler inside
//! the `request` span, then records the outcome in [`DashboardState`] and
//! stamps `X-Trace-ID` on the response. Panics are turned into 500s by the
//! inner `CatchPanicLayer`, so finalization runs for every request.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

use crate::dashboard::DashboardState;
use crate::observability::{TraceContext, X_TRACE_ID};

#[derive(Clone)]
pub struct TracingState {
    pub dashboard: Arc<DashboardState>,
    pub latency_threshold_ms: f64,
}

pub async fn request_tracing_middleware(
    State(state): State<TracingState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let ctx = TraceContext::generate();
    let start = Instant::now();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let span = ctx.request_span(&method, &path);

    let mut response = next.run(request).instrument(span.clone()).await;

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    let status = response.status();
    state.dashboard.record_request(status.as_u16(), elapsed_ms);

    span.in_scope(|| {
        if status.is_server_error() {
            tracing::warn!(
                event = "server_error",
                path = %path,
                status = status.as_u16(),
                "Server error on {}: {}",
                path,
                status.as_u16()
            );
        }
        if elapsed_ms > state.latency_threshold_ms {
            tracing::warn!(
                event = "high_latency",
                path = %path,
                latency_ms = round2(elapsed_ms),
                threshold_ms = state.latency_threshold_ms,
                "High latency on {}: {:.2}ms",
                path,
                elapsed_ms
            );
        }
        tracing::info!(
            status = status.as_u16(),
            process_time_ms = round2(elapsed_ms),
            "{} {} - {}",
            method,
            path,
            status.as_u16()
        );
    });

    if let Some(value) = ctx.header_value() {
        response.headers_mut().insert(X_TRACE_ID, value);
    }
    response
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
