//! Retry and pacing policies for order submission.
//!
//! Both are plain values so the dispatcher can be driven by a fake clock in
//! tests. Neither sleeps on its own.

use std::time::Duration;

use rand::Rng;

/// Delay schedule between failed submission attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backoff {
    /// Retry immediately.
    None,
    /// Same delay after every failure.
    Constant(Duration),
    /// `attempt * step` after failed attempt number `attempt` (1-based).
    Linear(Duration),
}

impl Backoff {
    /// Delay to wait after failed attempt `attempt` (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            Backoff::None => Duration::ZERO,
            Backoff::Constant(d) => d,
            Backoff::Linear(step) => step.saturating_mul(attempt),
        }
    }
}

/// Bounded retry with a backoff schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Delay before the next attempt after `attempt` failed, or `None` when
    /// the attempt budget is spent.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            None
        } else {
            Some(self.backoff.delay(attempt))
        }
    }
}

impl Default for RetryPolicy {
    /// Three attempts, sleeping 1s then 2s between them.
    fn default() -> Self {
        Self::new(3, Backoff::Linear(Duration::from_secs(1)))
    }
}

/// Randomized courtesy delay between consecutive successful submissions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PacingPolicy {
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl PacingPolicy {
    pub const fn new(min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            min_delay,
            max_delay,
        }
    }

    /// No pacing at all.
    pub const fn disabled() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Draw a delay uniformly from `[min_delay, max_delay]`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.max_delay <= self.min_delay {
            return self.min_delay;
        }
        let secs = rng.gen_range(self.min_delay.as_secs_f64()..=self.max_delay.as_secs_f64());
        Duration::from_secs_f64(secs).clamp(self.min_delay, self.max_delay)
    }
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(10))
    }
}
