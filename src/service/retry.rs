//! Retry with exponential backoff.

use crate::error::{Error, Result};
use std::time::Duration;

/// Retry policy applied uniformly to every submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total submissions allowed, including the first (minimum 1)
    pub max_attempts: u32,

    /// Delay after the first failed attempt
    pub initial_backoff: Duration,

    /// Upper bound on any single delay
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

impl RetryPolicy {
    /// Create a policy with the default backoff (500 ms doubling, capped at 8 s).
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
        }
    }

    /// A policy that submits once and never retries.
    pub fn no_retry() -> Self {
        Self::new(1)
    }

    /// Override the backoff schedule.
    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    /// Delay before the attempt following failed attempt `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1u32 << shift)
            .min(self.max_backoff)
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    ///
    /// `op` receives the 1-based attempt number. `on_retry` is called with the
    /// failed attempt number, its error and the upcoming delay before each
    /// retry. Returns the final outcome and the number of attempts made.
    pub fn run<T, F, R>(&self, mut op: F, mut on_retry: R) -> (Result<T>, u32)
    where
        F: FnMut(u32) -> Result<T>,
        R: FnMut(u32, &Error, Duration),
    {
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return (Ok(value), attempt),
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.backoff(attempt);
                    on_retry(attempt, &err, delay);
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                    attempt += 1;
                }
                Err(err) => return (Err(err), attempt),
            }
        }
    }
}
