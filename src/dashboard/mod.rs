//! Live service-health dashboard.
//!
//! # Data Flow
//! ```text
//! Request tracing middleware
//!     → state.rs (request/error counters, latest latency)
//! Logging sink (observability::logging::DashboardLayer)
//!     → state.rs (bounded log ring)
//!
//! GET /api/dashboard-stats
//!     → state.rs snapshot + CPU gauge
//!     → alerts.rs (availability, error budget, alerts)
//! ```

pub mod alerts;
pub mod state;

pub use alerts::{Alert, AlertEvaluator, AlertLevel, HealthReport};
pub use state::{DashboardSnapshot, DashboardState, LogEntry, LogLevel, LOG_CAPACITY};
