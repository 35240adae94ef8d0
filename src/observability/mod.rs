//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request tracing middleware
//!     → trace.rs (trace id, request span, X-Trace-ID)
//!     → logging.rs (console lines + dashboard log ring)
//!
//! Bid flow, login, CPU sampler
//!     → metrics.rs (histogram, counter, gauge)
//!
//! Consumers:
//!     → stdout (JSON lines)
//!     → GET /metrics (Prometheus scrape)
//!     → GET /api/dashboard-stats
//! ```

pub mod logging;
pub mod metrics;
pub mod trace;

pub use self::metrics::{HistogramTimer, MetricsRegistry};
pub use self::trace::{TraceContext, X_TRACE_ID};
