//! Logging System
//!
//! Structured diagnostics via the `tracing` crate. Diagnostics go to stderr
//! so stdout stays reserved for the operator progress lines; level and format
//! come from CLI flags with `SCOUR_LOG` / `SCOUR_LOG_FORMAT` environment
//! overrides.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,

    /// Enable colored output (text format only)
    #[serde(default = "default_true")]
    pub color: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
            color: default_true(),
        }
    }
}

/// Initialize the logging system.
///
/// Priority order (highest to lowest):
/// 1. `SCOUR_LOG` / `SCOUR_LOG_FORMAT` environment variables
/// 2. The provided config (built from CLI flags)
/// 3. Defaults
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = build_env_filter(config)?;
    let format = determine_format(config)?;

    let base_subscriber = Registry::default().with(filter);

    if format == "json" {
        base_subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        base_subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(config.color)
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    Ok(())
}

/// Build environment filter from config or the `SCOUR_LOG` variable.
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, ConfigError> {
    if let Ok(filter) = EnvFilter::try_from_env("SCOUR_LOG") {
        return Ok(filter);
    }

    if config.level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    EnvFilter::try_new(&config.level).map_err(|e| ConfigError::InvalidValue {
        field: "log_level",
        message: e.to_string(),
    })
}

/// Determine output format from config or environment.
fn determine_format(config: &LoggingConfig) -> Result<String, ConfigError> {
    if let Ok(format) = std::env::var("SCOUR_LOG_FORMAT") {
        if format == "json" || format == "text" {
            return Ok(format);
        }
    }

    if config.format != "json" && config.format != "text" {
        return Err(ConfigError::InvalidValue {
            field: "log_format",
            message: format!("{} (must be 'json' or 'text')", config.format),
        });
    }

    Ok(config.format.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logging_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
        assert_eq!(config.format, "text");
        assert!(config.color);
    }

    #[test]
    fn test_determine_format_rejects_unknown() {
        let config = LoggingConfig {
            format: "yaml".to_string(),
            ..LoggingConfig::default()
        };
        assert!(determine_format(&config).is_err());
    }

    #[test]
    fn test_build_env_filter_accepts_level_names() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            ..LoggingConfig::default()
        };
        assert!(build_env_filter(&config).is_ok());
    }

    #[test]
    fn test_build_env_filter_off() {
        let config = LoggingConfig {
            level: "off".to_string(),
            ..LoggingConfig::default()
        };
        assert!(build_env_filter(&config).is_ok());
    }
}
