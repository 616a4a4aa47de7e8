//! Static limiter tables.
//!
//! Describes, per service, the ordered list of operation limits used to build
//! a [`ServiceLimiterRegistry`](crate::ServiceLimiterRegistry):
//!
//! ```toml
//! [[services.ec2.operations]]
//! operations = ["Describe", "Get", "List"]
//! refill_rate = 20.0
//! burst = 100
//!
//! [[services.ec2.operations]]
//! operations = ["RunInstances"]
//! refill_rate = 2.0
//! burst = 5
//! ```

use crate::multi_operation_match;
use cloudrein_error::{ConfigError, ThrottleResult};
use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// One rate limit covering one or more operation prefixes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, derive_getters::Getters)]
pub struct OperationLimitConfig {
    /// Operation prefixes (regular expressions) sharing this bucket
    operations: Vec<String>,
    /// Tokens added per second
    refill_rate: f64,
    /// Bucket capacity
    burst: u32,
}

impl OperationLimitConfig {
    /// Create a limit for the given operation prefixes.
    pub fn new<S: Into<String>>(
        operations: impl IntoIterator<Item = S>,
        refill_rate: f64,
        burst: u32,
    ) -> Self {
        Self {
            operations: operations.into_iter().map(Into::into).collect(),
            refill_rate,
            burst,
        }
    }

    /// The pattern the matcher is compiled from.
    ///
    /// A single prefix is used as written; several are joined into one
    /// alternation.
    pub fn pattern(&self) -> String {
        match self.operations.as_slice() {
            [single] => single.clone(),
            many => {
                let refs: Vec<&str> = many.iter().map(String::as_str).collect();
                multi_operation_match(&refs)
            }
        }
    }
}

/// Ordered operation limits for one service.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Limits in evaluation order (first match wins)
    #[serde(default)]
    pub operations: Vec<OperationLimitConfig>,
}

/// Limiter tables for every throttled service.
///
/// # Example
///
/// ```no_run
/// use cloudrein_throttle::{ServiceLimiterRegistry, ThrottleConfig};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ThrottleConfig::from_file("limits.toml")?;
/// let registry = ServiceLimiterRegistry::from_config(&config)?;
/// assert!(registry.lookup("ec2").is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ThrottleConfig {
    /// Map of service id to its limiter table
    #[serde(default)]
    pub services: HashMap<String, ServiceConfig>,
}

impl ThrottleConfig {
    /// Load limiter tables from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        debug!("Loading limiter tables from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                ConfigError::new(format!(
                    "Failed to read limiter tables from {}: {}",
                    path.as_ref().display(),
                    e
                ))
            })?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse limiter tables: {}", e)))
    }

    /// Add or replace the table for `service`.
    pub fn with_service(
        mut self,
        service: impl Into<String>,
        operations: Vec<OperationLimitConfig>,
    ) -> Self {
        self.services
            .insert(service.into(), ServiceConfig { operations });
        self
    }

    /// Check every pattern and limit without building a registry.
    pub fn validate(&self) -> ThrottleResult<()> {
        crate::ServiceLimiterRegistry::from_config(self).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_single_and_many() {
        let single = OperationLimitConfig::new(["RunInstances"], 2.0, 5);
        assert_eq!(single.pattern(), "RunInstances");

        let many = OperationLimitConfig::new(["Describe", "Get", "List"], 20.0, 100);
        assert_eq!(many.pattern(), "(Describe|Get|List)");
    }

    #[test]
    fn test_validate_rejects_bad_pattern() {
        let config = ThrottleConfig::default()
            .with_service("ec2", vec![OperationLimitConfig::new(["Describe["], 1.0, 1)]);
        assert!(config.validate().is_err());
    }
}
