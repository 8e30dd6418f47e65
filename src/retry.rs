//! Bounded retry with a fixed delay.
//!
//! Token acquisition and interactive login share this policy. There is no
//! exponential backoff: every pause between attempts is the same length.

use std::future::Future;
use std::time::Duration;

use tracing::{error, info};

use crate::error::HarnessError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Pause between consecutive attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delay {
    None,
    Fixed(Duration),
}

impl Delay {
    pub fn duration(&self) -> Duration {
        match self {
            Delay::None => Duration::ZERO,
            Delay::Fixed(d) => *d,
        }
    }
}

/// Why [`RetryPolicy::run`] gave up.
#[derive(Debug)]
pub enum RetryFailure {
    /// Every allowed attempt failed; `last` is the final error.
    Exhausted { attempts: u32, last: HarnessError },
    /// The predicate rejected an error, so no further attempt was made.
    Aborted(HarnessError),
}

#[derive(Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Delay,
    retryable: fn(&HarnessError) -> bool,
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

fn always(_: &HarnessError) -> bool {
    true
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY)
    }
}

impl RetryPolicy {
    /// At least one attempt is always made.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay: if delay.is_zero() { Delay::None } else { Delay::Fixed(delay) },
            retryable: always,
        }
    }

    pub fn with_retryable(mut self, retryable: fn(&HarnessError) -> bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Delay {
        self.delay
    }

    pub async fn pause(&self) {
        if let Delay::Fixed(d) = self.delay {
            tokio::time::sleep(d).await;
        }
    }

    /// Run `attempt` until it succeeds, the predicate rejects its error, or
    /// `max_attempts` is reached. The closure receives the 1-based attempt
    /// number.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut attempt: F) -> Result<T, RetryFailure>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, HarnessError>>,
    {
        let mut n = 1;
        loop {
            info!("{}: attempt {} / {}", operation, n, self.max_attempts);
            match attempt(n).await {
                Ok(value) => return Ok(value),
                Err(e) if !(self.retryable)(&e) => {
                    error!("{}: attempt {} failed and will not be retried. Error: {}", operation, n, e);
                    return Err(RetryFailure::Aborted(e));
                }
                Err(e) => {
                    error!("{}: attempt {} failed. Error: {}", operation, n, e);
                    if n >= self.max_attempts {
                        return Err(RetryFailure::Exhausted { attempts: n, last: e });
                    }
                    info!("Retrying after {} ms...", self.delay.duration().as_millis());
                    self.pause().await;
                    n += 1;
                }
            }
        }
    }
}
