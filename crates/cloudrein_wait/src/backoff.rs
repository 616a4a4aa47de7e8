//! Backoff schedules.

use cloudrein_error::{BackoffPolicyError, BackoffPolicyErrorKind};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long to wait between polls, and how many polls to make.
///
/// The first attempt always runs immediately. Before attempt `k` (1-based
/// retry index) the base delay is `initial_delay × factor^(k-1)`; with
/// `jitter > 0` the actual sleep is drawn uniformly from
/// `[delay, delay × (1 + jitter)]`. Growth happens on every retry,
/// whatever caused it.
///
/// # Example
///
/// ```
/// use cloudrein_wait::BackoffPolicyBuilder;
/// use std::time::Duration;
///
/// let policy = BackoffPolicyBuilder::default()
///     .initial_delay(Duration::from_millis(500))
///     .factor(2.0)
///     .jitter(0.0)
///     .max_attempts(4u32)
///     .build()
///     .unwrap();
///
/// let delays: Vec<_> = policy.delays().collect();
/// assert_eq!(
///     delays,
///     [Duration::from_millis(500), Duration::from_secs(1), Duration::from_secs(2)]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, derive_getters::Getters, derive_builder::Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct BackoffPolicy {
    /// Delay before the first retry
    #[builder(default = "Duration::from_secs(2)")]
    initial_delay: Duration,
    /// Multiplier applied to the delay after every retry (>= 1)
    #[builder(default = "1.5")]
    factor: f64,
    /// Extra random fraction of the delay, within [0, 1]
    #[builder(default = "1.0")]
    jitter: f64,
    /// Total number of condition evaluations, including the first
    #[builder(default = "100")]
    max_attempts: u32,
}

impl BackoffPolicyBuilder {
    fn validate(&self) -> Result<(), String> {
        check(
            self.factor.unwrap_or(1.5),
            self.jitter.unwrap_or(1.0),
            self.max_attempts.unwrap_or(100),
        )
        .map_err(|e| e.kind().to_string())
    }
}

impl From<BackoffPolicyBuilderError> for BackoffPolicyError {
    #[track_caller]
    fn from(err: BackoffPolicyBuilderError) -> Self {
        BackoffPolicyError::new(BackoffPolicyErrorKind::Builder(err.to_string()))
    }
}

#[track_caller]
fn check(factor: f64, jitter: f64, max_attempts: u32) -> Result<(), BackoffPolicyError> {
    if !(factor >= 1.0 && factor.is_finite()) {
        return Err(BackoffPolicyError::new(BackoffPolicyErrorKind::Factor(factor)));
    }
    if !(0.0..=1.0).contains(&jitter) {
        return Err(BackoffPolicyError::new(BackoffPolicyErrorKind::Jitter(jitter)));
    }
    if max_attempts == 0 {
        return Err(BackoffPolicyError::new(BackoffPolicyErrorKind::MaxAttempts));
    }
    Ok(())
}

impl Default for BackoffPolicy {
    /// 2s initial delay, factor 1.5, full jitter, 100 attempts.
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(2),
            factor: 1.5,
            jitter: 1.0,
            max_attempts: 100,
        }
    }
}

impl BackoffPolicy {
    /// Create a validated policy.
    ///
    /// # Errors
    ///
    /// Rejects `factor < 1`, `jitter` outside `[0, 1]`, and zero attempts.
    #[track_caller]
    pub fn new(
        initial_delay: Duration,
        factor: f64,
        jitter: f64,
        max_attempts: u32,
    ) -> Result<Self, BackoffPolicyError> {
        check(factor, jitter, max_attempts)?;
        Ok(Self {
            initial_delay,
            factor,
            jitter,
            max_attempts,
        })
    }

    /// Base (un-jittered) delays before each retry, in order.
    ///
    /// Yields `max_attempts - 1` values, one per gap between attempts.
    pub fn delays(&self) -> Delays {
        Delays {
            next: self.initial_delay,
            factor: self.factor,
            remaining: self.max_attempts.saturating_sub(1),
        }
    }

    /// Apply this policy's jitter to a base delay.
    pub fn jittered(&self, delay: Duration) -> Duration {
        if self.jitter <= 0.0 {
            return delay;
        }
        let extra = rand::thread_rng().gen_range(0.0..=self.jitter);
        scale(delay, 1.0 + extra)
    }

    /// The sleeps a run would actually make, jitter included.
    pub(crate) fn schedule(&self) -> impl Iterator<Item = Duration> + '_ {
        self.delays().map(|delay| self.jittered(delay))
    }
}

/// Iterator over a policy's base delays. See [`BackoffPolicy::delays`].
#[derive(Debug, Clone)]
pub struct Delays {
    next: Duration,
    factor: f64,
    remaining: u32,
}

impl Iterator for Delays {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = self.next;
        self.next = scale(current, self.factor);
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Delays {}

// Saturates instead of panicking once the schedule outgrows Duration.
fn scale(delay: Duration, by: f64) -> Duration {
    Duration::try_from_secs_f64(delay.as_secs_f64() * by).unwrap_or(Duration::MAX)
}

/// Serializable form of a [`BackoffPolicy`].
///
/// ```toml
/// [wait]
/// initial_delay_ms = 2000
/// factor = 1.5
/// jitter = 1.0
/// max_attempts = 100
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Delay before the first retry, in milliseconds
    pub initial_delay_ms: u64,
    /// Growth factor per retry
    pub factor: f64,
    /// Jitter fraction
    pub jitter: f64,
    /// Total attempts
    pub max_attempts: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        let policy = BackoffPolicy::default();
        Self {
            initial_delay_ms: policy.initial_delay.as_millis() as u64,
            factor: policy.factor,
            jitter: policy.jitter,
            max_attempts: policy.max_attempts,
        }
    }
}

impl TryFrom<&BackoffConfig> for BackoffPolicy {
    type Error = BackoffPolicyError;

    fn try_from(config: &BackoffConfig) -> Result<Self, Self::Error> {
        BackoffPolicy::new(
            Duration::from_millis(config.initial_delay_ms),
            config.factor,
            config.jitter,
            config.max_attempts,
        )
    }
}
