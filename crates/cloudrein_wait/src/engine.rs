//! Poll-until-true retry loop.

use crate::{BackoffPolicy, WaitError};
use cloudrein_error::{ErrorCode, classify};
use std::future::Future;
use tokio::time::Instant;
use tokio_retry2::{Retry, RetryError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// What to do with one attempt's error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Back off and evaluate the condition again.
    Retry,
    /// Stop and hand the error to the caller.
    Fail,
}

/// Decide whether an error with `code` is worth another attempt.
///
/// Errors without a provider code are never retried; coded errors are
/// retried only when the caller listed the code.
///
/// ```
/// use cloudrein_wait::{Decision, decide};
///
/// assert_eq!(decide(Some("Throttling"), &["Throttling"]), Decision::Retry);
/// assert_eq!(decide(Some("Throttling"), &["Other"]), Decision::Fail);
/// assert_eq!(decide(None, &["Throttling"]), Decision::Fail);
/// ```
pub fn decide(code: Option<&str>, retryable: &[&str]) -> Decision {
    match code {
        Some(code) if retryable.contains(&code) => Decision::Retry,
        _ => Decision::Fail,
    }
}

// Carried through tokio-retry2; transient variants end up as a timeout.
enum Attempt<E> {
    NotReady,
    Retryable(E),
    Failed(E),
}

/// Drives a condition through a [`BackoffPolicy`].
///
/// Holds the policy plus an optional cancellation token and deadline. Each
/// [`run`](Self::run) is independent; the engine keeps no state between
/// runs and can be reused or shared.
///
/// # Example
///
/// ```rust,ignore
/// use cloudrein_error::codes;
/// use cloudrein_wait::{BackoffPolicy, RetryEngine};
///
/// RetryEngine::new(BackoffPolicy::default())
///     .with_cancellation(shutdown.clone())
///     .run(
///         || async { ec2.subnet_is_available(&subnet_id).await },
///         &[codes::SUBNET_NOT_FOUND],
///     )
///     .await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct RetryEngine {
    policy: BackoffPolicy,
    cancel: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl RetryEngine {
    /// Create an engine for `policy` with no cancellation and no deadline.
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            policy,
            cancel: None,
            deadline: None,
        }
    }

    /// Abort runs when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Abort runs that are still going at `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// The policy this engine applies.
    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Evaluate `condition` until it returns `Ok(true)`.
    ///
    /// The first evaluation happens immediately. `Ok(false)` and errors
    /// whose provider code is listed in `retryable` lead to another attempt
    /// after the policy's delay; any other error is returned at once as
    /// [`WaitError::Condition`]. After `max_attempts` evaluations the result
    /// is [`WaitError::Timeout`]. Cancellation or the deadline abort the run
    /// with [`WaitError::Cancelled`], even mid-sleep.
    #[instrument(skip(self, condition), fields(max_attempts = *self.policy.max_attempts()))]
    pub async fn run<F, Fut, E>(
        &self,
        mut condition: F,
        retryable: &[&str],
    ) -> Result<(), WaitError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool, E>>,
        E: ErrorCode,
    {
        let mut attempt: u32 = 0;
        let action = || {
            attempt += 1;
            let current = attempt;
            let pending = condition();
            async move {
                match pending.await {
                    Ok(true) => {
                        debug!(attempt = current, "Condition met");
                        Ok(())
                    }
                    Ok(false) => {
                        debug!(attempt = current, "Condition not met yet");
                        Err(RetryError::Transient {
                            err: Attempt::NotReady,
                            retry_after: None,
                        })
                    }
                    Err(err) => {
                        let code = classify(&err);
                        match decide(code, retryable) {
                            Decision::Retry => {
                                debug!(attempt = current, code, "Retryable error");
                                Err(RetryError::Transient {
                                    err: Attempt::Retryable(err),
                                    retry_after: None,
                                })
                            }
                            Decision::Fail => {
                                debug!(attempt = current, code, "Permanent error");
                                Err(RetryError::Permanent(Attempt::Failed(err)))
                            }
                        }
                    }
                }
            }
        };

        let retry = Retry::spawn(self.policy.schedule(), action);
        let cancelled = async {
            match &self.cancel {
                Some(token) => token.cancelled().await,
                None => std::future::pending().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        let outcome = tokio::select! {
            biased;
            _ = cancelled => {
                debug!("Wait cancelled");
                return Err(WaitError::Cancelled);
            }
            _ = expired => {
                debug!("Wait deadline passed");
                return Err(WaitError::Cancelled);
            }
            outcome = retry => outcome,
        };

        let attempts = attempt;
        match outcome {
            Ok(()) => Ok(()),
            Err(Attempt::Failed(err)) => Err(WaitError::Condition(err)),
            Err(Attempt::NotReady) => {
                warn!(attempts, "Timed out waiting for condition");
                Err(WaitError::Timeout { attempts })
            }
            Err(Attempt::Retryable(last)) => {
                warn!(
                    attempts,
                    last_code = classify(&last),
                    "Timed out waiting for condition"
                );
                Err(WaitError::Timeout { attempts })
            }
        }
    }
}

/// Poll `condition` under `policy`, retrying errors whose code is listed.
///
/// Shorthand for `RetryEngine::new(policy).run(condition, retryable)`.
pub async fn wait_for_with_retryable<F, Fut, E>(
    policy: BackoffPolicy,
    condition: F,
    retryable: &[&str],
) -> Result<(), WaitError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: ErrorCode,
{
    RetryEngine::new(policy).run(condition, retryable).await
}

/// Poll `condition` under `policy`; every error is permanent.
pub async fn wait_for<F, Fut, E>(policy: BackoffPolicy, condition: F) -> Result<(), WaitError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: ErrorCode,
{
    wait_for_with_retryable(policy, condition, &[]).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_table() {
        assert_eq!(
            decide(Some("InvalidSubnetID.NotFound"), &["InvalidSubnetID.NotFound"]),
            Decision::Retry
        );
        assert_eq!(decide(Some("InvalidSubnetID.NotFound"), &[]), Decision::Fail);
        assert_eq!(decide(None, &[]), Decision::Fail);
        assert_eq!(decide(Some(""), &["Throttling"]), Decision::Fail);
    }
}
