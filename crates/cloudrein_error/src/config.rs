//! Configuration error types.

/// Configuration loading or parsing error with source location.
///
/// Raised when a limiter table or backoff section cannot be read or
/// deserialized. Invalid values inside an otherwise well-formed table surface
/// as [`ThrottleError`](crate::ThrottleError) or
/// [`BackoffPolicyError`](crate::BackoffPolicyError) instead.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// Error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError with the given message at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use cloudrein_error::ConfigError;
    ///
    /// let err = ConfigError::new("Failed to parse cloudrein.toml");
    /// assert!(err.message.contains("cloudrein.toml"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
