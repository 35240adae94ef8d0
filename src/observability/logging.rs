//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber (env filter, console output)
//! - Mirror this crate's INFO/WARN/ERROR events into the dashboard log ring
//!
//! # Design Decisions
//! - JSON format for production, pretty format for development
//! - The trace id reaches console lines through the enclosing `request` span
//! - Dashboard entries keep only level, time of day and message
//! - `WARNING`, `CRITICAL` and `FATAL` are accepted as level names; an unknown
//!   level is an error, never a fallback filter

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::ObservabilityConfig;
use crate::dashboard::{DashboardState, LogLevel};

/// Events from targets outside this prefix never reach the dashboard.
const DASHBOARD_TARGET: &str = "bookswap";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("unknown log level '{0}'")]
    UnknownLevel(String),

    #[error("invalid log filter '{directive}': {source}")]
    Filter {
        directive: String,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Init(#[from] TryInitError),
}

/// Install the global subscriber.
pub fn init_logging(
    config: &ObservabilityConfig,
    dashboard: Arc<DashboardState>,
) -> Result<(), LoggingError> {
    let filter = build_filter(&config.log_level)?;

    let console = if config.json_logs {
        json_layer(std::io::stdout)
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(DashboardLayer::new(dashboard))
        .try_init()?;
    Ok(())
}

/// Parse a configured log level into an [`EnvFilter`].
pub fn build_filter(log_level: &str) -> Result<EnvFilter, LoggingError> {
    let directive = filter_directive(log_level)?;
    EnvFilter::try_new(&directive).map_err(|source| LoggingError::Filter { directive, source })
}

/// A bare level applies to this crate only; anything else is used verbatim.
fn filter_directive(log_level: &str) -> Result<String, LoggingError> {
    let level = log_level.trim();
    if level.contains('=') || level.contains(',') {
        return Ok(level.to_string());
    }
    let name = level_name(level).ok_or_else(|| LoggingError::UnknownLevel(level.to_string()))?;
    Ok(format!("bookswap={},tower_http=warn", name))
}

fn level_name(level: &str) -> Option<&'static str> {
    match level.to_ascii_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" | "critical" | "fatal" => Some("error"),
        "off" => Some("off"),
        _ => None,
    }
}

/// JSON lines carrying the fields of the innermost span (the trace id).
fn json_layer<S, W>(make_writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(false)
        .with_writer(make_writer)
        .boxed()
}

/// Layer that feeds log events into [`DashboardState`].
pub struct DashboardLayer {
    state: Arc<DashboardState>,
}

impl DashboardLayer {
    pub fn new(state: Arc<DashboardState>) -> Self {
        Self { state }
    }
}

impl<S: Subscriber> Layer<S> for DashboardLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with(DASHBOARD_TARGET) {
            return;
        }

        let level = match *metadata.level() {
            Level::ERROR => LogLevel::Error,
            Level::WARN => LogLevel::Warning,
            Level::INFO => LogLevel::Info,
            _ => return,
        };

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.state.push_log(level, visitor.message);
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::TraceContext;
    use axum::http::Method;
    use std::io;
    use std::sync::Mutex;

    fn with_dashboard<F: FnOnce()>(state: &Arc<DashboardState>, f: F) {
        let subscriber = tracing_subscriber::registry().with(DashboardLayer::new(state.clone()));
        tracing::subscriber::with_default(subscriber, f);
    }

    #[test]
    fn test_levels_are_mapped() {
        let state = Arc::new(DashboardState::new());
        with_dashboard(&state, || {
            tracing::info!("Successful login");
            tracing::warn!(reason = "Invalid password", "Failed login attempt");
            tracing::error!(book_id = 7, is_timeout = true, "Failed to save bid for book_id {}", 7);
            tracing::debug!("not shown");
        });

        let logs = state.snapshot().logs;
        assert_eq!(logs.len(), 3);
        assert_eq!(logs[0].level, LogLevel::Error);
        assert_eq!(logs[0].message, "Failed to save bid for book_id 7");
        assert_eq!(logs[1].level, LogLevel::Warning);
        assert_eq!(logs[1].message, "Failed login attempt");
        assert_eq!(logs[2].level, LogLevel::Info);
    }

    #[test]
    fn test_foreign_targets_are_ignored() {
        let state = Arc::new(DashboardState::new());
        with_dashboard(&state, || {
            tracing::info!(target: "hyper::proto", "connection closed");
            tracing::info!("kept");
        });

        let logs = state.snapshot().logs;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].message, "kept");
    }

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive("INFO").unwrap(), "bookswap=info,tower_http=warn");
        assert_eq!(filter_directive("WARNING").unwrap(), "bookswap=warn,tower_http=warn");
        assert_eq!(filter_directive("CRITICAL").unwrap(), "bookswap=error,tower_http=warn");
        assert_eq!(filter_directive("fatal").unwrap(), "bookswap=error,tower_http=warn");
        assert_eq!(filter_directive("bookswap=trace").unwrap(), "bookswap=trace");
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        assert!(matches!(
            build_filter("verbose"),
            Err(LoggingError::UnknownLevel(level)) if level == "verbose"
        ));
        assert!(matches!(build_filter("bookswap=loud"), Err(LoggingError::Filter { .. })));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_warn_filter_keeps_trace_id_on_warnings() {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::registry()
            .with(build_filter("WARNING").unwrap())
            .with(json_layer(captured.clone()));

        let ctx = TraceContext::generate();
        let trace_id = ctx.header_value().unwrap().to_str().unwrap().to_string();
        tracing::subscriber::with_default(subscriber, || {
            let span = ctx.request_span(&Method::GET, "/bid");
            let _entered = span.enter();
            tracing::info!("dropped below warn");
            tracing::warn!(event = "high_latency", "High latency on /bid: 612.40ms");
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 1, "{}", output);

        let line: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(line["level"], "WARN");
        assert_eq!(line["fields"]["event"], "high_latency");
        assert_eq!(line["span"]["name"], "request");
        assert_eq!(line["span"]["trace_id"], trace_id.as_str());
    }
}
