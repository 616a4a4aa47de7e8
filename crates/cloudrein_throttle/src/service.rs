//! Per-service, first-match-wins limiter lists.

use crate::OperationMatcher;
use cloudrein_error::{ThrottleResult, codes};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace};

/// Ordered operation matchers for one service.
///
/// Order matters: the first matcher whose pattern matches an operation owns
/// that operation, so specific patterns go before catch-alls. Operations
/// that match nothing are not throttled at all.
///
/// # Example
///
/// ```rust,ignore
/// use cloudrein_throttle::{OperationMatcher, ServiceLimiter, multi_operation_match};
///
/// let ec2 = ServiceLimiter::new(vec![
///     OperationMatcher::new(multi_operation_match(&["Describe", "Get", "List"]), 20.0, 100)?,
///     OperationMatcher::new("RunInstances", 2.0, 5)?,
///     OperationMatcher::new(".*", 5.0, 200)?,
/// ]);
///
/// ec2.limit_request("DescribeSubnets", &cancel).await?;
/// // ... send the request ...
/// ec2.review_response("DescribeSubnets", Some("RequestLimitExceeded"));
/// ```
#[derive(Debug)]
pub struct ServiceLimiter {
    matchers: Vec<OperationMatcher>,
}

impl ServiceLimiter {
    /// Create a limiter evaluating `matchers` in order.
    pub fn new(matchers: Vec<OperationMatcher>) -> Self {
        Self { matchers }
    }

    /// The matchers in evaluation order.
    pub fn matchers(&self) -> &[OperationMatcher] {
        &self.matchers
    }

    /// The first matcher that applies to `operation`, if any.
    pub fn matching(&self, operation: &str) -> Option<&OperationMatcher> {
        self.matchers.iter().find(|m| m.matches(operation))
    }

    /// Wait until `operation` may be sent.
    ///
    /// Blocks on the first matching bucket. Unmatched operations return
    /// immediately.
    ///
    /// # Errors
    ///
    /// Returns a cancellation error if `cancel` fires while waiting.
    #[instrument(skip(self, cancel))]
    pub async fn limit_request(
        &self,
        operation: &str,
        cancel: &CancellationToken,
    ) -> ThrottleResult<()> {
        match self.matching(operation) {
            Some(matcher) => {
                trace!(pattern = matcher.operation(), "Operation matched");
                matcher.bucket().acquire(cancel).await
            }
            None => {
                trace!("No matcher, request is not throttled");
                Ok(())
            }
        }
    }

    /// Inspect the outcome of a sent request.
    ///
    /// If the provider answered with a throttling code, the bucket of the
    /// first matching matcher is drained. Returns true when a bucket was
    /// drained. Every other code is left for the caller's retry logic.
    #[instrument(skip(self))]
    pub fn review_response(&self, operation: &str, error_code: Option<&str>) -> bool {
        let Some(code) = error_code else {
            return false;
        };
        if !codes::is_throttling(code) {
            return false;
        }

        match self.matching(operation) {
            Some(matcher) => {
                debug!(pattern = matcher.operation(), code, "Throttled by provider");
                matcher.bucket().drain();
                true
            }
            None => false,
        }
    }
}
