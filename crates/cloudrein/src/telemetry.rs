//! Tracing subscriber setup.

use cloudrein_error::{CloudreinResult, ConfigError};
use std::env;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Configuration for log output.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Log level filter (e.g., "info", "cloudrein_throttle=debug")
    pub log_level: String,
    /// Enable JSON-formatted logs
    pub json_logs: bool,
}

impl TracingConfig {
    /// Create a configuration from `RUST_LOG`, falling back to `info`.
    pub fn new() -> Self {
        Self {
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            json_logs: false,
        }
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable JSON-formatted logs.
    pub fn with_json_logs(mut self, enabled: bool) -> Self {
        self.json_logs = enabled;
        self
    }

    fn filter(&self) -> CloudreinResult<EnvFilter> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.log_level))
            .map_err(|e| {
                ConfigError::new(format!("Invalid log filter '{}': {}", self.log_level, e))
            })?;
        Ok(filter)
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Install a global subscriber with the default configuration.
pub fn init_tracing() -> CloudreinResult<()> {
    init_tracing_with_config(TracingConfig::default())
}

/// Install a global subscriber.
///
/// # Errors
///
/// Fails on an unparseable filter or if a global subscriber is already set.
pub fn init_tracing_with_config(config: TracingConfig) -> CloudreinResult<()> {
    let env_filter = config.filter()?;

    let fmt_layer = if config.json_logs {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_level(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| ConfigError::new(format!("Failed to install subscriber: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_methods() {
        let config = TracingConfig::new()
            .with_log_level("cloudrein_throttle=debug")
            .with_json_logs(true);
        assert_eq!(config.log_level, "cloudrein_throttle=debug");
        assert!(config.json_logs);
    }

    #[test]
    fn test_second_init_fails() {
        let _ = init_tracing_with_config(TracingConfig::new().with_log_level("warn"));
        let second = init_tracing_with_config(TracingConfig::new().with_log_level("warn"));
        assert!(second.is_err());
    }
}
