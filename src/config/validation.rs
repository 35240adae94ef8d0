//! Configuration validation.
//!
//! Serde handles syntax; this checks value ranges and addresses. All errors
//! are collected rather than stopping at the first one.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::AppConfig;
use crate::observability::logging::build_filter;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.timeouts.storage_ms == 0 {
        errors.push(ValidationError::new("timeouts.storage_ms", "must be greater than 0"));
    }

    let threshold = config.dashboard.latency_threshold_ms;
    if !threshold.is_finite() || threshold <= 0.0 {
        errors.push(ValidationError::new(
            "dashboard.latency_threshold_ms",
            "must be a positive number",
        ));
    }

    if config.sampler.window_ms == 0 {
        errors.push(ValidationError::new("sampler.window_ms", "must be greater than 0"));
    }

    if let Err(e) = build_filter(&config.observability.log_level) {
        errors.push(ValidationError::new("observability.log_level", e.to_string()));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
