//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value '{value}' for environment variable {var}")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load a TOML file, apply environment overrides, then validate.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: AppConfig = toml::from_str(&content)?;

    apply_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Defaults plus environment overrides, for running without a config file.
pub fn load_from_env() -> Result<AppConfig, ConfigError> {
    let mut config = AppConfig::default();

    apply_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply the recognised environment variables using `lookup`.
///
/// Recognised: `LOG_LEVEL`, `ONE_CLICK_BID_ENABLED`, `LATENCY_THRESHOLD_MS`,
/// `BIND_ADDRESS`. The flag is enabled only by the literal `true`
/// (any case); every other value disables it.
pub fn apply_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(level) = lookup("LOG_LEVEL") {
        config.observability.log_level = level.to_lowercase();
    }

    if let Some(flag) = lookup("ONE_CLICK_BID_ENABLED") {
        config.bidding.one_click_enabled = flag.trim().eq_ignore_ascii_case("true");
    }

    if let Some(raw) = lookup("LATENCY_THRESHOLD_MS") {
        config.dashboard.latency_threshold_ms =
            raw.trim().parse().map_err(|_| ConfigError::Env {
                var: "LATENCY_THRESHOLD_MS",
                value: raw.clone(),
            })?;
    }

    if let Some(addr) = lookup("BIND_ADDRESS") {
        config.listener.bind_address = addr;
    }

    Ok(())
}
