//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bookswap_bid_latency_seconds` (histogram): full bid flow latency, any outcome
//! - `bookswap_login_errors_total` (counter): failed logins by `error_code`
//! - `bookswap_cpu_usage_percent` (gauge): last sampled host CPU usage
//!
//! # Design Decisions
//! - The registry owns its own Prometheus recorder instead of installing a
//!   global one, so it is constructed once at startup and passed around
//! - Handles are registered up front; updates are atomic operations
//! - The CPU gauge value is mirrored locally because gauges are write-only
//!   through the `metrics` facade and the alert evaluator needs to read it

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use metrics::{Counter, Gauge, Histogram, Key, KeyName, Label, Level, Metadata, Recorder};
use metrics_exporter_prometheus::{
    BuildError, Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder,
};

pub const BID_LATENCY: &str = "bookswap_bid_latency_seconds";
pub const LOGIN_ERRORS: &str = "bookswap_login_errors_total";
pub const CPU_USAGE: &str = "bookswap_cpu_usage_percent";

/// Error code label for a wrong password.
pub const INVALID_PASSWORD: &str = "401_INVALID_PASSWORD";

/// Histogram buckets for the bid flow (seconds).
const BID_LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

static METADATA: Metadata<'static> =
    Metadata::new(module_path!(), Level::INFO, Some(module_path!()));

/// Process-wide metrics registry.
pub struct MetricsRegistry {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
    bid_latency: Histogram,
    cpu_usage: Gauge,
    cpu_value: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self, BuildError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(Matcher::Full(BID_LATENCY.to_string()), BID_LATENCY_BUCKETS)?
            .build_recorder();

        recorder.describe_histogram(
            KeyName::from_const_str(BID_LATENCY),
            None,
            "Latency of the bid flow in seconds".into(),
        );
        recorder.describe_counter(
            KeyName::from_const_str(LOGIN_ERRORS),
            None,
            "Total number of login errors".into(),
        );
        recorder.describe_gauge(
            KeyName::from_const_str(CPU_USAGE),
            None,
            "Current CPU usage of the application host".into(),
        );

        let bid_latency =
            recorder.register_histogram(&Key::from_static_name(BID_LATENCY), &METADATA);
        let cpu_usage = recorder.register_gauge(&Key::from_static_name(CPU_USAGE), &METADATA);
        cpu_usage.set(0.0);

        let handle = recorder.handle();
        Ok(Self {
            recorder,
            handle,
            bid_latency,
            cpu_usage,
            cpu_value: AtomicU64::new(0f64.to_bits()),
        })
    }

    /// Start a timer that records into the bid latency histogram when dropped.
    pub fn time_bid(&self) -> HistogramTimer {
        HistogramTimer {
            histogram: self.bid_latency.clone(),
            start: Instant::now(),
        }
    }

    /// Increment the login error counter for `error_code`.
    pub fn increment_login_error(&self, error_code: &str) {
        self.counter(LOGIN_ERRORS, error_code).increment(1);
    }

    fn counter(&self, name: &'static str, error_code: &str) -> Counter {
        let key = Key::from_parts(name, vec![Label::new("error_code", error_code.to_string())]);
        self.recorder.register_counter(&key, &METADATA)
    }

    pub fn set_cpu_usage(&self, percent: f64) {
        self.cpu_usage.set(percent);
        self.cpu_value.store(percent.to_bits(), Ordering::Relaxed);
    }

    pub fn cpu_usage(&self) -> f64 {
        f64::from_bits(self.cpu_value.load(Ordering::Relaxed))
    }

    /// Render every metric in the Prometheus text exposition format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Scoped timer from [`MetricsRegistry::time_bid`].
///
/// Records on drop, so early returns and `?` exits are observed too.
#[must_use = "the timer records when dropped"]
pub struct HistogramTimer {
    histogram: Histogram,
    start: Instant,
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.record(self.start.elapsed().as_secs_f64());
    }
}

/// Read a single sample value (e.g. `name_count`) from rendered output.
///
/// Returns `None` when the series has not been rendered yet.
pub fn sample_value(rendered: &str, series: &str) -> Option<f64> {
    rendered
        .lines()
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| {
            let (name, value) = line.rsplit_once(' ')?;
            (name == series).then(|| value.parse().ok()).flatten()
        })
}
