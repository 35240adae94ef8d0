//! Per-request trace context.
//!
//! # Responsibilities
//! - Generate a random trace id for every inbound request
//! - Carry it through the request (span) and out as `X-Trace-ID`
//!
//! # Design Decisions
//! - The context is owned by one request; nothing global holds it
//! - Log lines pick the id up from the enclosing `request` span, so handlers
//!   never pass it around explicitly
//! - The span is created at ERROR level so it stays enabled under any filter
//!   that lets this crate's events through

use axum::http::{HeaderName, HeaderValue, Method};
use tracing::Span;
use uuid::Uuid;

/// Response header carrying the trace id.
pub const X_TRACE_ID: HeaderName = HeaderName::from_static("x-trace-id");

/// Correlation id for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    trace_id: String,
}

impl TraceContext {
    /// Create a context with a fresh UUID v4.
    pub fn generate() -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string(),
        }
    }

    /// Span that every log line emitted while handling the request inherits.
    pub fn request_span(&self, method: &Method, path: &str) -> Span {
        tracing::error_span!(
            "request",
            trace_id = %self.trace_id,
            method = %method,
            path = %path,
        )
    }

    pub fn header_value(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.trace_id).ok()
    }
}
