//! Throttling error types.

/// Throttling error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ThrottleErrorKind {
    /// An operation pattern failed to compile.
    #[display("Invalid operation pattern '{}': {}", pattern, reason)]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Compiler message
        reason: String,
    },
    /// A refill rate or burst size cannot produce tokens.
    #[display("Invalid limit for '{}': {}", pattern, reason)]
    InvalidLimit {
        /// Pattern the limit was declared for
        pattern: String,
        /// Why the limit was rejected
        reason: String,
    },
    /// The caller cancelled while waiting for a token.
    #[display("Cancelled while waiting for a token for '{}'", _0)]
    Cancelled(String),
}

/// Throttling error with location tracking.
///
/// # Examples
///
/// ```
/// use cloudrein_error::{ThrottleError, ThrottleErrorKind};
///
/// let err = ThrottleError::new(ThrottleErrorKind::Cancelled("DescribeInstances".into()));
/// assert!(err.is_cancelled());
/// assert!(format!("{}", err).contains("DescribeInstances"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Throttle Error: {} at line {} in {}", kind, line, file)]
pub struct ThrottleError {
    kind: ThrottleErrorKind,
    line: u32,
    file: &'static str,
}

impl ThrottleError {
    /// Create a new throttling error with caller location tracking.
    #[track_caller]
    pub fn new(kind: ThrottleErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ThrottleErrorKind {
        &self.kind
    }

    /// True when the error reports a cancelled wait rather than bad configuration.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, ThrottleErrorKind::Cancelled(_))
    }
}

impl From<ThrottleErrorKind> for ThrottleError {
    #[track_caller]
    fn from(kind: ThrottleErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Result type for throttling operations.
pub type ThrottleResult<T> = std::result::Result<T, ThrottleError>;
