//! Backoff policy validation errors.

/// Specific reasons a backoff policy is rejected.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum BackoffPolicyErrorKind {
    /// Growth factor below one would shrink delays between attempts.
    #[display("factor must be >= 1, got {}", _0)]
    Factor(f64),
    /// Jitter fraction outside `[0, 1]`.
    #[display("jitter must be within [0, 1], got {}", _0)]
    Jitter(f64),
    /// At least one attempt is required.
    #[display("max_attempts must be positive")]
    MaxAttempts,
    /// Builder reported a missing or malformed field.
    #[display("{}", _0)]
    Builder(String),
}

/// Backoff policy error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Backoff Policy Error: {} at line {} in {}", kind, line, file)]
pub struct BackoffPolicyError {
    kind: BackoffPolicyErrorKind,
    line: u32,
    file: &'static str,
}

impl BackoffPolicyError {
    /// Create a new backoff policy error with caller location tracking.
    #[track_caller]
    pub fn new(kind: BackoffPolicyErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &BackoffPolicyErrorKind {
        &self.kind
    }
}

impl From<BackoffPolicyErrorKind> for BackoffPolicyError {
    #[track_caller]
    fn from(kind: BackoffPolicyErrorKind) -> Self {
        Self::new(kind)
    }
}
