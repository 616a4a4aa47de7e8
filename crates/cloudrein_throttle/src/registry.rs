//! Service id to limiter lookup.

use crate::{OperationMatcher, ServiceLimiter, ThrottleConfig};
use cloudrein_error::{ErrorCode, ThrottleError, ThrottleErrorKind, ThrottleResult};
use std::collections::HashMap;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// What the limiter needs to know about an outbound API request.
pub trait ThrottledRequest {
    /// Service id, e.g. `ec2`.
    fn service(&self) -> &str;
    /// Operation name, e.g. `DescribeInstances`.
    fn operation(&self) -> &str;
    /// Token that aborts the request (and any wait for admission).
    fn cancellation(&self) -> &CancellationToken;
}

/// Every service limiter the process uses, keyed by service id.
///
/// Built once at startup and read-only afterwards, so it can be shared
/// behind an `Arc` without locking. Each bucket synchronises itself.
///
/// # Example
///
/// ```rust,ignore
/// use cloudrein_throttle::{ServiceLimiterRegistry, ThrottleConfig};
///
/// let registry = ServiceLimiterRegistry::from_config(&config)?;
/// registry.limit_request("ec2", "DescribeInstances", &cancel).await?;
/// ```
#[derive(Debug, Default)]
pub struct ServiceLimiterRegistry {
    services: HashMap<String, ServiceLimiter>,
}

impl ServiceLimiterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from static limiter tables.
    ///
    /// # Errors
    ///
    /// Fails on the first pattern that does not compile, the first unusable
    /// rate or burst, or an entry with no operations.
    #[instrument(skip(config), fields(services = config.services.len()))]
    pub fn from_config(config: &ThrottleConfig) -> ThrottleResult<Self> {
        let mut registry = Self::new();
        for (service, table) in &config.services {
            let mut matchers = Vec::with_capacity(table.operations.len());
            for limit in &table.operations {
                if limit.operations().is_empty() {
                    return Err(ThrottleError::new(ThrottleErrorKind::InvalidPattern {
                        pattern: String::new(),
                        reason: format!("service '{}' has a limit with no operations", service),
                    }));
                }
                matchers.push(OperationMatcher::new(
                    limit.pattern(),
                    *limit.refill_rate(),
                    *limit.burst(),
                )?);
            }
            debug!(service = %service, matchers = matchers.len(), "Registered service limiter");
            registry.insert(service.clone(), ServiceLimiter::new(matchers));
        }
        Ok(registry)
    }

    /// Register (or replace) the limiter for `service`.
    pub fn insert(&mut self, service: impl Into<String>, limiter: ServiceLimiter) {
        self.services.insert(service.into(), limiter);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_service(mut self, service: impl Into<String>, limiter: ServiceLimiter) -> Self {
        self.insert(service, limiter);
        self
    }

    /// The limiter for `service`, if one is configured.
    pub fn lookup(&self, service: &str) -> Option<&ServiceLimiter> {
        self.services.get(service)
    }

    /// Ids of every configured service.
    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// Wait until `operation` on `service` may be sent.
    ///
    /// Unknown services are not throttled.
    pub async fn limit_request(
        &self,
        service: &str,
        operation: &str,
        cancel: &CancellationToken,
    ) -> ThrottleResult<()> {
        match self.lookup(service) {
            Some(limiter) => limiter.limit_request(operation, cancel).await,
            None => Ok(()),
        }
    }

    /// Feed a response's error code back to the service's limiter.
    pub fn review_response(&self, service: &str, operation: &str, error_code: Option<&str>) -> bool {
        self.lookup(service)
            .is_some_and(|limiter| limiter.review_response(operation, error_code))
    }

    /// Run `call` for `request` under the limiter.
    ///
    /// Waits for admission, performs the call, and on failure reviews the
    /// error's provider code so a throttled response drains the bucket. The
    /// call's own error is returned unchanged.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let output = registry
    ///     .execute(&request, || async { client.send(&request).await })
    ///     .await?;
    /// ```
    #[instrument(skip_all, fields(service = request.service(), operation = request.operation()))]
    pub async fn execute<R, F, Fut, T, E>(&self, request: &R, call: F) -> Result<T, E>
    where
        R: ThrottledRequest + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: ErrorCode + From<ThrottleError>,
    {
        self.limit_request(request.service(), request.operation(), request.cancellation())
            .await?;

        let result = call().await;
        if let Err(err) = &result {
            self.review_response(request.service(), request.operation(), err.error_code());
        }
        result
    }
}
