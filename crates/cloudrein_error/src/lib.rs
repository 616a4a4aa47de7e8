//! Error types for the Cloudrein library.
//!
//! This crate provides the foundation error types used throughout the Cloudrein ecosystem,
//! along with the [`ErrorCode`] capability used to classify provider errors for retry.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use cloudrein_error::{CloudreinResult, ConfigError};
//!
//! fn load() -> CloudreinResult<String> {
//!     Err(ConfigError::new("missing [throttle] table"))?
//! }
//!
//! match load() {
//!     Ok(data) => println!("Got: {}", data),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backoff;
pub mod codes;
mod config;
mod error;
mod provider;
mod throttle;

pub use backoff::{BackoffPolicyError, BackoffPolicyErrorKind};
pub use config::ConfigError;
pub use error::{CloudreinError, CloudreinErrorKind, CloudreinResult};
pub use provider::{ErrorCode, ProviderError, classify};
pub use throttle::{ThrottleError, ThrottleErrorKind, ThrottleResult};
