//! Outcomes of a failed wait.

use cloudrein_error::ErrorCode;
use std::fmt;

/// Why a wait ended without the condition being met.
///
/// The three cases are deliberately distinct: running out of attempts is
/// [`Timeout`](WaitError::Timeout), never the last transient error.
#[derive(Debug)]
pub enum WaitError<E> {
    /// Every attempt ran without success or a permanent error.
    Timeout {
        /// Number of times the condition was evaluated
        attempts: u32,
    },
    /// The cancellation token fired or the deadline passed.
    Cancelled,
    /// The condition failed with a non-retryable error.
    Condition(E),
}

impl<E> WaitError<E> {
    /// True if the attempt budget ran out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::Timeout { .. })
    }

    /// True if the wait was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, WaitError::Cancelled)
    }

    /// The condition's own error, if that is what ended the wait.
    pub fn into_condition(self) -> Option<E> {
        match self {
            WaitError::Condition(err) => Some(err),
            _ => None,
        }
    }
}

impl<E: fmt::Display> fmt::Display for WaitError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitError::Timeout { attempts } => {
                write!(f, "Timed out waiting for condition after {} attempts", attempts)
            }
            WaitError::Cancelled => write!(f, "Wait cancelled"),
            WaitError::Condition(err) => write!(f, "Condition failed: {}", err),
        }
    }
}

impl<E> std::error::Error for WaitError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WaitError::Condition(err) => Some(err),
            _ => None,
        }
    }
}

impl<E: ErrorCode> ErrorCode for WaitError<E> {
    fn error_code(&self) -> Option<&str> {
        match self {
            WaitError::Condition(err) => err.error_code(),
            _ => None,
        }
    }
}
