//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the backend.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the BookSwap backend.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Bid flow settings, including the one-click feature flag.
    pub bidding: BiddingConfig,

    /// Dashboard and alerting settings.
    pub dashboard: DashboardConfig,

    /// Background CPU sampler settings.
    pub sampler: SamplerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Book/user store settings.
    pub storage: StorageConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Upper bound for a single storage call in milliseconds.
    pub storage_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            storage_ms: 5_000,
        }
    }
}

/// Bid flow configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BiddingConfig {
    /// "One-Click Bid" fast path. Overridden by `ONE_CLICK_BID_ENABLED`.
    pub one_click_enabled: bool,

    /// Processing delay when the fast path is on, in milliseconds.
    pub fast_path_delay_ms: u64,

    /// Processing delay for the traditional multi-step flow, in milliseconds.
    pub standard_delay_ms: u64,
}

impl Default for BiddingConfig {
    fn default() -> Self {
        Self {
            one_click_enabled: true,
            fast_path_delay_ms: 50,
            standard_delay_ms: 300,
        }
    }
}

/// Dashboard and alerting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Requests slower than this are logged as `high_latency` and raise
    /// the latency alert. Overridden by `LATENCY_THRESHOLD_MS`.
    pub latency_threshold_ms: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            latency_threshold_ms: 500.0,
        }
    }
}

/// CPU sampler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Run the background sampler.
    pub enabled: bool,

    /// Measurement window for one CPU sample in milliseconds.
    pub window_ms: u64,

    /// Idle time between samples in milliseconds (0 = sample continuously).
    pub idle_ms: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_ms: 1_000,
            idle_ms: 5_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter
    /// directive. Overridden by `LOG_LEVEL`.
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: true,
        }
    }
}

/// Store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON snapshot loaded at startup and written at shutdown.
    pub snapshot_path: Option<String>,

    /// Seed a demo seller and a few books into an empty store.
    pub seed_demo_data: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            seed_demo_data: true,
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8000");
        assert!(config.bidding.one_click_enabled);
        assert_eq!(config.bidding.fast_path_delay_ms, 50);
        assert_eq!(config.bidding.standard_delay_ms, 300);
        assert_eq!(config.dashboard.latency_threshold_ms, 500.0);
        assert_eq!(config.sampler.idle_ms, 5_000);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [bidding]
            one_click_enabled = false

            [storage]
            snapshot_path = "books.json"
            "#,
        )
        .unwrap();

        assert!(!config.bidding.one_click_enabled);
        assert_eq!(config.bidding.standard_delay_ms, 300);
        assert_eq!(config.storage.snapshot_path.as_deref(), Some("books.json"));
        assert!(config.storage.seed_demo_data);
        assert_eq!(config.timeouts.storage_ms, 5_000);
    }
}
