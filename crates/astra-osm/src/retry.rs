//! Same-provider retry policy.
//!
//! A transient failure earns exactly one more attempt against the same
//! provider after a short fixed delay. A little jitter is added so that
//! concurrent requests hitting the same overloaded mirror do not retry in
//! lockstep.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Default delay before the retry.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(600);

/// Retries granted per provider for transient failures.
pub const RETRIES_PER_PROVIDER: u32 = 1;

/// Upper bound of the random extra delay, as a share of the base delay.
const DEFAULT_JITTER_RATIO: f64 = 0.2;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    delay: Duration,
    jitter_ratio: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_DELAY)
    }
}

impl RetryPolicy {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            jitter_ratio: DEFAULT_JITTER_RATIO,
        }
    }

    /// Exact delay, no jitter. Mostly useful in tests.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            delay,
            jitter_ratio: 0.0,
        }
    }

    /// Total attempts one provider may receive.
    pub fn max_attempts(&self) -> u32 {
        RETRIES_PER_PROVIDER + 1
    }

    /// Delay to sleep before the retry: the base delay plus up to
    /// `jitter_ratio` of it again.
    pub fn next_delay(&self) -> Duration {
        self.delay + self.max_jitter().mul_f64(clock_fraction())
    }

    fn max_jitter(&self) -> Duration {
        if self.jitter_ratio.is_finite() && self.jitter_ratio > 0.0 {
            self.delay.mul_f64(self.jitter_ratio.min(1.0))
        } else {
            Duration::ZERO
        }
    }
}

/// Cheap pseudo-random value in `[0, 1)` taken from the wall clock.
fn clock_fraction() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| f64::from(d.subsec_nanos()) / 1_000_000_000.0)
        .unwrap_or(0.0)
}
