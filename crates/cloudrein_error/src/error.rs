//! Top-level error wrapper types.

use crate::{BackoffPolicyError, ConfigError, ErrorCode, ProviderError, ThrottleError};

/// Every error the Cloudrein crates can produce on their own.
///
/// # Examples
///
/// ```
/// use cloudrein_error::{CloudreinError, ProviderError};
///
/// let err: CloudreinError = ProviderError::new("Throttling", "Rate exceeded").into();
/// assert!(format!("{}", err).contains("Provider Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum CloudreinErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Rate limiter error
    #[from(ThrottleError)]
    Throttle(ThrottleError),
    /// Invalid backoff policy
    #[from(BackoffPolicyError)]
    Backoff(BackoffPolicyError),
    /// Error reported by the remote API
    #[from(ProviderError)]
    Provider(ProviderError),
}

/// Cloudrein error with kind discrimination.
///
/// # Examples
///
/// ```
/// use cloudrein_error::{CloudreinResult, ConfigError};
///
/// fn might_fail() -> CloudreinResult<()> {
///     Err(ConfigError::new("Missing [services] table"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Cloudrein Error: {}", _0)]
pub struct CloudreinError(Box<CloudreinErrorKind>);

impl CloudreinError {
    /// Create a new error from a kind.
    pub fn new(kind: CloudreinErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &CloudreinErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to CloudreinErrorKind
impl<T> From<T> for CloudreinError
where
    T: Into<CloudreinErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

impl ErrorCode for CloudreinError {
    fn error_code(&self) -> Option<&str> {
        match self.kind() {
            CloudreinErrorKind::Provider(err) => err.error_code(),
            _ => None,
        }
    }
}

/// Result type for Cloudrein operations.
pub type CloudreinResult<T> = std::result::Result<T, CloudreinError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ThrottleErrorKind, classify};

    #[test]
    fn test_only_provider_errors_expose_codes() {
        let provider: CloudreinError =
            ProviderError::new("RequestLimitExceeded", "Request limit exceeded.").into();
        assert_eq!(classify(&provider), Some("RequestLimitExceeded"));

        let throttle: CloudreinError =
            ThrottleError::new(ThrottleErrorKind::Cancelled("RunInstances".into())).into();
        assert_eq!(classify(&throttle), None);
    }
}
