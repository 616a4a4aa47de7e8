//! Provider error codes and classification.

/// Capability for errors that may carry a stable provider error code.
///
/// Retry decisions depend only on whether an error exposes a code and which
/// one, never on its concrete type. Errors that did not originate from the
/// provider (I/O failures, bugs, local validation) return `None` and are
/// never retried.
///
/// # Examples
///
/// ```
/// use cloudrein_error::{ErrorCode, ProviderError, classify};
///
/// let err = ProviderError::new("InvalidVpcID.NotFound", "vpc-123 does not exist");
/// assert_eq!(classify(&err), Some("InvalidVpcID.NotFound"));
///
/// let io = std::io::Error::other("socket closed");
/// assert_eq!(classify(&io), None);
/// ```
pub trait ErrorCode {
    /// The provider error code, or `None` if this is not a provider error.
    fn error_code(&self) -> Option<&str>;
}

/// Classify an error as `(code, is_provider_error)` in one step.
///
/// Returns `Some(code)` for provider errors and `None` for anything else.
pub fn classify<E: ErrorCode + ?Sized>(err: &E) -> Option<&str> {
    err.error_code()
}

impl ErrorCode for std::io::Error {
    fn error_code(&self) -> Option<&str> {
        None
    }
}

impl<E: ErrorCode + ?Sized> ErrorCode for Box<E> {
    fn error_code(&self) -> Option<&str> {
        (**self).error_code()
    }
}

impl<E: ErrorCode + ?Sized> ErrorCode for &E {
    fn error_code(&self) -> Option<&str> {
        (**self).error_code()
    }
}

/// An error reported by the remote API, carrying its error code.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Provider Error: {}: {} at line {} in {}", code, message, line, file)]
pub struct ProviderError {
    /// Stable error code, e.g. `Throttling` or `InvalidSubnetID.NotFound`
    pub code: String,
    /// Human readable message from the provider
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ProviderError {
    /// Create a new provider error at the current location.
    #[track_caller]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            code: code.into(),
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// True if the code belongs to the not-found family.
    pub fn is_not_found(&self) -> bool {
        crate::codes::is_not_found(&self.code)
    }

    /// True if the provider is throttling the client.
    pub fn is_throttling(&self) -> bool {
        crate::codes::is_throttling(&self.code)
    }
}

impl ErrorCode for ProviderError {
    fn error_code(&self) -> Option<&str> {
        Some(&self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boxed_errors_keep_their_code() {
        let err: Box<ProviderError> = Box::new(ProviderError::new("Throttling", "slow down"));
        assert_eq!(classify(&err), Some("Throttling"));
        assert!(err.is_throttling());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_io_errors_are_not_provider_errors() {
        let err = std::io::Error::new(std::io::ErrorKind::TimedOut, "read timed out");
        assert!(classify(&err).is_none());
    }
}
