//! Per-operation rate limiting for cloud API clients.
//!
//! This crate throttles outbound calls before they are sent, so a client
//! stays under the provider's published rate limits instead of discovering
//! them through throttling errors.
//!
//! ## Layout
//!
//! - [`TokenBucket`]: continuous-refill bucket with blocking acquire and a
//!   punitive drain
//! - [`OperationMatcher`]: binds a bucket to an anchored operation-name pattern
//! - [`ServiceLimiter`]: ordered matchers for one service, first match wins
//! - [`ServiceLimiterRegistry`]: service id to limiter, built once from
//!   [`ThrottleConfig`]
//!
//! ## Per call
//!
//! ```rust,ignore
//! use cloudrein_throttle::ServiceLimiterRegistry;
//!
//! registry.limit_request("ec2", "DescribeInstances", &cancel).await?;
//! let result = client.describe_instances().await;
//! if let Err(err) = &result {
//!     registry.review_response("ec2", "DescribeInstances", err.error_code());
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bucket;
mod config;
mod matcher;
mod registry;
mod service;

pub use bucket::TokenBucket;
pub use config::{OperationLimitConfig, ServiceConfig, ThrottleConfig};
pub use matcher::{OperationMatcher, multi_operation_match};
pub use registry::{ServiceLimiterRegistry, ThrottledRequest};
pub use service::ServiceLimiter;
