//! Rolling in-memory dashboard state.
//!
//! # Responsibilities
//! - Count requests and server errors
//! - Remember the latency of the most recent request
//! - Keep the last [`LOG_CAPACITY`] log entries for the dashboard log panel
//!
//! # Design Decisions
//! - One mutex guards every field so `snapshot()` is always consistent
//! - The ring is a `VecDeque` with newest entries at the front
//! - Nothing is persisted; a restart starts from zero

use std::collections::VecDeque;
use std::sync::Mutex;

use serde::Serialize;

/// Number of log entries kept for the dashboard.
pub const LOG_CAPACITY: usize = 20;

/// Log severity as shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

/// A simplified log line for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    #[serde(rename = "type")]
    pub level: LogLevel,
    /// UTC time of day, `HH:MM:SS`.
    pub time: String,
    #[serde(rename = "msg")]
    pub message: String,
}

/// Point-in-time copy of the dashboard state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub total_requests: u64,
    pub total_errors: u64,
    pub latest_latency_ms: f64,
    /// Newest first.
    pub logs: Vec<LogEntry>,
}

#[derive(Debug, Default)]
struct Inner {
    total_requests: u64,
    total_errors: u64,
    latest_latency_ms: f64,
    logs: VecDeque<LogEntry>,
}

/// Process-wide dashboard aggregate, shared through `Arc`.
#[derive(Debug, Default)]
pub struct DashboardState {
    inner: Mutex<Inner>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished request.
    ///
    /// Any 5xx status counts as an error. The latency overwrites the
    /// previous value; it is not averaged.
    pub fn record_request(&self, status: u16, elapsed_ms: f64) {
        let mut inner = self.inner.lock().expect("dashboard mutex poisoned");
        inner.total_requests += 1;
        if status >= 500 {
            inner.total_errors += 1;
        }
        inner.latest_latency_ms = elapsed_ms;
    }

    /// Insert a log entry stamped with the current UTC time of day.
    pub fn push_log(&self, level: LogLevel, message: impl Into<String>) {
        let time = chrono::Utc::now().format("%H:%M:%S").to_string();
        self.push_entry(LogEntry {
            level,
            time,
            message: message.into(),
        });
    }

    /// Insert a prepared entry, evicting the oldest when full.
    pub fn push_entry(&self, entry: LogEntry) {
        let mut inner = self.inner.lock().expect("dashboard mutex poisoned");
        inner.logs.push_front(entry);
        inner.logs.truncate(LOG_CAPACITY);
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let inner = self.inner.lock().expect("dashboard mutex poisoned");
        DashboardSnapshot {
            total_requests: inner.total_requests,
            total_errors: inner.total_errors,
            latest_latency_ms: inner.latest_latency_ms,
            logs: inner.logs.iter().cloned().collect(),
        }
    }
}
