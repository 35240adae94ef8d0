//! Background CPU sampler.
//!
//! # Responsibilities
//! - Measure host CPU utilization over a fixed window
//! - Publish the value into the `bookswap_cpu_usage_percent` gauge
//!
//! # Design Decisions
//! - Paced: one window of measurement, then an idle gap (`idle_ms = 0`
//!   samples back to back)
//! - A failed reading keeps the previous gauge value
//! - Exits on the shutdown broadcast, including mid-window

use std::sync::Arc;
use std::time::Duration;

use sysinfo::System;
use tokio::sync::broadcast;
use tokio::time;

use crate::config::SamplerConfig;
use crate::observability::MetricsRegistry;

/// Source of CPU readings.
pub trait CpuProbe: Send + 'static {
    /// Start a measurement window.
    fn refresh(&mut self);

    /// Global CPU usage in percent since the last refresh, if available.
    fn usage_percent(&mut self) -> Option<f64>;
}

/// Host CPU readings through `sysinfo`.
pub struct SystemCpuProbe {
    system: System,
}

impl SystemCpuProbe {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu();
        Self { system }
    }
}

impl Default for SystemCpuProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuProbe for SystemCpuProbe {
    fn refresh(&mut self) {
        self.system.refresh_cpu();
    }

    fn usage_percent(&mut self) -> Option<f64> {
        self.system.refresh_cpu();
        if self.system.cpus().is_empty() {
            return None;
        }
        let usage = f64::from(self.system.global_cpu_info().cpu_usage());
        usage.is_finite().then_some(usage)
    }
}

pub struct HealthSampler<P: CpuProbe = SystemCpuProbe> {
    probe: P,
    metrics: Arc<MetricsRegistry>,
    window: Duration,
    idle: Duration,
}

impl HealthSampler<SystemCpuProbe> {
    pub fn new(metrics: Arc<MetricsRegistry>, config: &SamplerConfig) -> Self {
        Self::with_probe(SystemCpuProbe::new(), metrics, config)
    }
}

impl<P: CpuProbe> HealthSampler<P> {
    pub fn with_probe(probe: P, metrics: Arc<MetricsRegistry>, config: &SamplerConfig) -> Self {
        Self {
            probe,
            metrics,
            window: Duration::from_millis(config.window_ms),
            idle: Duration::from_millis(config.idle_ms),
        }
    }

    /// Close the current window and publish the reading.
    ///
    /// Returns the value written, or `None` if the probe failed.
    pub fn sample_once(&mut self) -> Option<f64> {
        match self.probe.usage_percent() {
            Some(percent) => {
                self.metrics.set_cpu_usage(percent);
                tracing::debug!(cpu_percent = percent, "CPU sampled");
                Some(percent)
            }
            None => {
                tracing::debug!(
                    last = self.metrics.cpu_usage(),
                    "CPU sample unavailable, keeping last value"
                );
                None
            }
        }
    }

    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            window_ms = self.window.as_millis() as u64,
            idle_ms = self.idle.as_millis() as u64,
            "Health sampler starting"
        );

        loop {
            self.probe.refresh();
            tokio::select! {
                _ = time::sleep(self.window) => {}
                _ = shutdown.recv() => break,
            }

            self.sample_once();

            if !self.idle.is_zero() {
                tokio::select! {
                    _ = time::sleep(self.idle) => {}
                    _ = shutdown.recv() => break,
                }
            }
        }

        tracing::info!("Health sampler received shutdown signal, exiting loop");
    }
}
