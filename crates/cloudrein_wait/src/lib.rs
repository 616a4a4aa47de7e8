//! Waiting for eventually consistent cloud resources.
//!
//! Many cloud operations return before their effect is visible: a subnet
//! that was just created may still be reported as not found, a deleted load
//! balancer may still show up. This crate polls a condition with exponential
//! backoff until it holds, treating only the error codes the caller names as
//! transient.
//!
//! - [`BackoffPolicy`] describes the schedule (initial delay, growth factor,
//!   jitter, attempt budget)
//! - [`RetryEngine`] runs a condition under a policy, with optional
//!   cancellation and deadline
//! - [`wait_for_with_retryable`] and [`wait_for`] are the one-call forms
//!
//! ```rust,ignore
//! use cloudrein_error::codes;
//! use cloudrein_wait::{BackoffPolicy, wait_for_with_retryable};
//!
//! wait_for_with_retryable(
//!     BackoffPolicy::default(),
//!     || async { tag_route_table(&client, &id).await.map(|_| true) },
//!     &[codes::ROUTE_TABLE_NOT_FOUND],
//! )
//! .await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backoff;
mod engine;
mod error;

pub use backoff::{
    BackoffConfig, BackoffPolicy, BackoffPolicyBuilder, BackoffPolicyBuilderError, Delays,
};
pub use engine::{Decision, RetryEngine, decide, wait_for, wait_for_with_retryable};
pub use error::WaitError;
