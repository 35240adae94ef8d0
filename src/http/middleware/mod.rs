//! Axum middleware.

pub mod request_trace;

pub use request_trace::{request_tracing_middleware, TracingState};
