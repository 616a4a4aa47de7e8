//! Layered configuration for throttling and waiting.
//!
//! Configuration is merged from three places, lowest precedence first:
//! - Bundled defaults (`include_str!` of the workspace `cloudrein.toml`)
//! - `~/.config/cloudrein/cloudrein.toml`
//! - `./cloudrein.toml`
//!
//! ```toml
//! [wait]
//! initial_delay_ms = 2000
//! factor = 1.5
//! jitter = 1.0
//! max_attempts = 100
//!
//! [[throttle.services.ec2.operations]]
//! operations = ["Describe", "Get", "List"]
//! refill_rate = 20.0
//! burst = 100
//! ```

use cloudrein_error::{CloudreinResult, ConfigError};
use cloudrein_throttle::{ServiceLimiterRegistry, ThrottleConfig};
use cloudrein_wait::{BackoffConfig, BackoffPolicy, RetryEngine};
use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../../../cloudrein.toml");

/// Limiter tables plus the default wait policy.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct CloudreinConfig {
    /// Per-service limiter tables
    #[serde(default)]
    pub throttle: ThrottleConfig,
    /// Backoff policy for resource waits
    #[serde(default)]
    pub wait: BackoffConfig,
}

impl CloudreinConfig {
    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be parsed.
    pub fn load() -> CloudreinResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/cloudrein/cloudrein.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("cloudrein").required(false));

        Self::deserialize_from(builder)
    }

    /// The bundled defaults alone, ignoring any user files.
    pub fn bundled() -> CloudreinResult<Self> {
        Self::deserialize_from(
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml)),
        )
    }

    /// Load configuration from a single file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> CloudreinResult<Self> {
        debug!("Loading configuration from file");
        Self::deserialize_from(Config::builder().add_source(File::from(path.as_ref())))
    }

    fn deserialize_from(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> CloudreinResult<Self> {
        let config = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;
        Ok(config)
    }

    /// Build the limiter registry described by the `throttle` tables.
    pub fn build_registry(&self) -> CloudreinResult<ServiceLimiterRegistry> {
        Ok(ServiceLimiterRegistry::from_config(&self.throttle)?)
    }

    /// The validated `wait` policy.
    pub fn backoff_policy(&self) -> CloudreinResult<BackoffPolicy> {
        Ok(BackoffPolicy::try_from(&self.wait)?)
    }

    /// A retry engine running the `wait` policy.
    pub fn retry_engine(&self) -> CloudreinResult<RetryEngine> {
        Ok(RetryEngine::new(self.backoff_policy()?))
    }
}
