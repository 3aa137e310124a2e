//! Bounded retry around an arbitrary fallible call.
//!
//! Sleeps block the calling thread. There is no jitter; the delay schedule is
//! fully determined by the policy.
use crate::error::SyncError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_DELAY_SECS: u64 = 5;

/// How the delay grows between attempts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backoff {
    #[default]
    Fixed,
    Exponential,
}

impl Backoff {
    /// Delay to wait after the `attempt`-th failure (1-based).
    pub fn delay_after(self, base: Duration, attempt: u32) -> Duration {
        match self {
            Backoff::Fixed => base,
            Backoff::Exponential => {
                let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
                base.saturating_mul(factor)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: Duration::from_secs(DEFAULT_DELAY_SECS),
            backoff: Backoff::Fixed,
        }
    }
}

impl RetryPolicy {
    /// Invoke `operation` until it succeeds or the attempt budget is spent.
    ///
    /// Every failure is logged with its attempt number. Exhaustion yields
    /// [`SyncError::RetriesExhausted`] as context on top of the last failure,
    /// so the underlying cause can still be downcast.
    pub fn call<T, F>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match operation() {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::info!(attempt, "retry succeeded");
                    }
                    return Ok(value);
                }
                Err(err) => {
                    tracing::warn!(attempt, max_attempts, error = %format!("{err:#}"), "attempt failed");
                    if attempt >= max_attempts {
                        return Err(err.context(SyncError::RetriesExhausted {
                            attempts: max_attempts,
                        }));
                    }
                    let delay = self.backoff.delay_after(self.delay, attempt);
                    tracing::info!(delay_secs = delay.as_secs_f64(), "retrying");
                    std::thread::sleep(delay);
                    attempt += 1;
                }
            }
        }
    }
}
