//! Client-side reliability for rate-limited, eventually consistent cloud APIs.
//!
//! Cloudrein bundles two independent tools:
//!
//! - **Throttling** ([`cloudrein_throttle`]): per-operation token buckets
//!   that hold requests back before they are sent, and punish a bucket when
//!   the provider answers with a throttling code.
//! - **Waiting** ([`cloudrein_wait`]): exponential backoff polling that
//!   retries only the error codes the caller names.
//!
//! [`CloudreinConfig`] loads both from layered TOML, and [`init_tracing`]
//! installs a log subscriber.
//!
//! # Example
//!
//! ```rust,ignore
//! use cloudrein::{CloudreinConfig, codes};
//!
//! let config = CloudreinConfig::load()?;
//! let registry = config.build_registry()?;
//! let engine = config.retry_engine()?;
//!
//! registry.limit_request("ec2", "CreateSubnet", &cancel).await?;
//! let subnet = ec2.create_subnet(&request).await?;
//!
//! engine
//!     .run(
//!         || async { ec2.describe_subnet(&subnet.id).await.map(|s| s.is_available()) },
//!         &[codes::SUBNET_NOT_FOUND],
//!     )
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod telemetry;

pub use config::CloudreinConfig;
pub use telemetry::{TracingConfig, init_tracing, init_tracing_with_config};

pub use cloudrein_error::{
    BackoffPolicyError, BackoffPolicyErrorKind, CloudreinError, CloudreinErrorKind,
    CloudreinResult, ConfigError, ErrorCode, ProviderError, ThrottleError, ThrottleErrorKind,
    ThrottleResult, classify, codes,
};
pub use cloudrein_throttle::{
    OperationLimitConfig, OperationMatcher, ServiceConfig, ServiceLimiter, ServiceLimiterRegistry,
    ThrottleConfig, ThrottledRequest, TokenBucket, multi_operation_match,
};
pub use cloudrein_wait::{
    BackoffConfig, BackoffPolicy, BackoffPolicyBuilder, BackoffPolicyBuilderError, Decision,
    Delays, RetryEngine, WaitError, decide, wait_for, wait_for_with_retryable,
};
pub use tokio_util::sync::CancellationToken;
