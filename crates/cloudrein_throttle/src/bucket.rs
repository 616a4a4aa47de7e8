//! Continuous-refill token bucket.
//!
//! Refill is computed lazily whenever the bucket is touched, so a registry
//! with hundreds of operations never runs a single background timer. Time is
//! read from [`tokio::time::Instant`], the same clock `acquire` sleeps on, so
//! a paused test runtime drives refill and waiting together.

use cloudrein_error::{ThrottleError, ThrottleErrorKind, ThrottleResult};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace, warn};

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket limiting a single operation (or operation family).
///
/// Holds at most `burst` tokens and gains `refill_rate` tokens per second.
/// Each admitted call consumes one token. A bucket starts full.
///
/// # Example
///
/// ```rust,ignore
/// use cloudrein_throttle::TokenBucket;
/// use tokio_util::sync::CancellationToken;
///
/// let bucket = TokenBucket::new("DescribeInstances", 20.0, 100)?;
/// bucket.acquire(&CancellationToken::new()).await?;
/// ```
#[derive(Debug)]
pub struct TokenBucket {
    name: String,
    refill_rate: f64,
    burst: f64,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    /// Create a full bucket.
    ///
    /// # Errors
    ///
    /// Returns [`ThrottleErrorKind::InvalidLimit`] if `refill_rate` is not a
    /// positive finite number or `burst` is zero.
    pub fn new(name: impl Into<String>, refill_rate: f64, burst: u32) -> ThrottleResult<Self> {
        let name = name.into();
        if !refill_rate.is_finite() || refill_rate <= 0.0 {
            return Err(ThrottleError::new(ThrottleErrorKind::InvalidLimit {
                pattern: name,
                reason: format!("refill rate must be positive, got {}", refill_rate),
            }));
        }
        if burst == 0 {
            return Err(ThrottleError::new(ThrottleErrorKind::InvalidLimit {
                pattern: name,
                reason: "burst must be at least 1".to_string(),
            }));
        }

        Ok(Self {
            name,
            refill_rate,
            burst: f64::from(burst),
            state: Mutex::new(BucketState {
                tokens: f64::from(burst),
                last_refill: Instant::now(),
            }),
        })
    }

    /// Name of the operation pattern this bucket limits.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tokens gained per second.
    pub fn refill_rate(&self) -> f64 {
        self.refill_rate
    }

    /// Maximum number of stored tokens.
    pub fn burst(&self) -> f64 {
        self.burst
    }

    /// Current fill level, after accounting for elapsed time.
    pub fn available(&self) -> f64 {
        let mut state = self.lock();
        self.refill(&mut state);
        state.tokens
    }

    /// Wait for a token and consume it.
    ///
    /// Suspends only the calling task. If `cancel` fires first, returns
    /// [`ThrottleErrorKind::Cancelled`] without consuming anything.
    #[instrument(skip(self, cancel), fields(operation = %self.name))]
    pub async fn acquire(&self, cancel: &CancellationToken) -> ThrottleResult<()> {
        loop {
            if cancel.is_cancelled() {
                return Err(self.cancelled());
            }

            let Some(wait) = self.take_or_wait() else {
                trace!("Token acquired");
                return Ok(());
            };

            debug!(?wait, "Bucket empty, waiting for refill");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(self.cancelled()),
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }

    /// Consume a token if one is available right now.
    pub fn try_acquire(&self) -> bool {
        self.take_or_wait().is_none()
    }

    /// Throw away every stored token.
    ///
    /// Used when the provider reports that it is throttling us: a confirmed
    /// throttle costs the whole current allowance, not just one call.
    pub fn drain(&self) {
        let mut state = self.lock();
        self.refill(&mut state);
        warn!(
            operation = %self.name,
            discarded = state.tokens,
            "Draining token bucket after throttling signal"
        );
        state.tokens = 0.0;
    }

    /// Take a token, or report how long until one exists.
    fn take_or_wait(&self) -> Option<Duration> {
        let mut state = self.lock();
        self.refill(&mut state);
        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            None
        } else {
            let deficit = 1.0 - state.tokens;
            // The timer cannot sleep for less than a millisecond.
            let wait = Duration::try_from_secs_f64(deficit / self.refill_rate)
                .unwrap_or(Duration::MAX)
                .max(Duration::from_millis(1));
            Some(wait)
        }
    }

    fn refill(&self, state: &mut BucketState) {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(state.last_refill);
        state.tokens = (state.tokens + self.refill_rate * elapsed.as_secs_f64()).min(self.burst);
        state.last_refill = now;
    }

    fn lock(&self) -> MutexGuard<'_, BucketState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[track_caller]
    fn cancelled(&self) -> ThrottleError {
        ThrottleError::new(ThrottleErrorKind::Cancelled(self.name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_starts_full() {
        let bucket = TokenBucket::new("Describe", 2.0, 5).unwrap();
        assert_close(bucket.available(), 5.0);
    }

    #[test]
    fn test_rejects_unusable_limits() {
        assert!(TokenBucket::new("x", 0.0, 1).is_err());
        assert!(TokenBucket::new("x", -1.0, 1).is_err());
        assert!(TokenBucket::new("x", f64::NAN, 1).is_err());
        assert!(TokenBucket::new("x", 1.0, 0).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refill_is_linear_and_capped() {
        let bucket = TokenBucket::new("Describe", 2.0, 5).unwrap();
        for _ in 0..5 {
            assert!(bucket.try_acquire());
        }
        assert_close(bucket.available(), 0.0);

        advance(Duration::from_millis(750)).await;
        assert_close(bucket.available(), 1.5);

        advance(Duration::from_secs(1)).await;
        assert_close(bucket.available(), 3.5);

        advance(Duration::from_secs(60)).await;
        assert_close(bucket.available(), 5.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokens_stay_within_bounds() {
        let bucket = TokenBucket::new("Describe", 3.0, 4).unwrap();
        let steps = [0u64, 10, 400, 0, 0, 1500, 90, 0, 5000, 3, 0, 0, 250];
        for (i, ms) in steps.iter().enumerate() {
            advance(Duration::from_millis(*ms)).await;
            if i % 3 == 0 {
                bucket.drain();
            } else {
                let _ = bucket.try_acquire();
                let _ = bucket.try_acquire();
            }
            let tokens = bucket.available();
            assert!((0.0..=4.0).contains(&tokens), "tokens out of bounds: {tokens}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_empties_regardless_of_fill() {
        let bucket = TokenBucket::new("Describe", 1.0, 10).unwrap();
        bucket.drain();
        assert_close(bucket.available(), 0.0);
        assert!(!bucket.try_acquire());

        advance(Duration::from_millis(999)).await;
        assert!(!bucket.try_acquire());

        advance(Duration::from_millis(2)).await;
        assert!(bucket.try_acquire());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_try_acquire_consumes_nothing() {
        let bucket = TokenBucket::new("Describe", 4.0, 1).unwrap();
        assert!(bucket.try_acquire());
        advance(Duration::from_millis(125)).await;
        assert!(!bucket.try_acquire());
        assert_close(bucket.available(), 0.5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_sleeps_once_on_the_runtime_clock() {
        let bucket = TokenBucket::new("RunInstances", 1.0, 1).unwrap();
        bucket.drain();

        let start = Instant::now();
        let real_start = std::time::Instant::now();
        bucket.acquire(&CancellationToken::new()).await.unwrap();

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(1), "woke early: {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(1010), "overslept: {:?}", elapsed);
        assert!(real_start.elapsed() < Duration::from_millis(500));
        assert!(bucket.available() < 0.01);
    }
}
