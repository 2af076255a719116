//! Bounded retry with linear backoff.
//!
//! [`RetryPolicy::run`] drives an attempt closure until it succeeds or
//! `retries + 1` attempts have failed. After failed attempt `n`
//! (1-based) it sleeps `step × n` before the next one. There is no
//! jitter and no cap beyond the retry count.

use std::future::Future;
use std::time::Duration;

pub const BACKOFF_STEP: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub step: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(retries: u32) -> Self {
        Self {
            retries,
            step: BACKOFF_STEP,
        }
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Delay after the given failed attempt (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.step.saturating_mul(attempt)
    }

    /// Run `op` until it succeeds or attempts run out. `op` receives the
    /// 1-based attempt number. On exhaustion returns the last error with
    /// the number of attempts made.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<(T, u32), Exhausted<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;
            match op(attempt).await {
                Ok(value) => return Ok((value, attempt)),
                Err(e) => {
                    if attempt >= self.max_attempts() {
                        return Err(Exhausted {
                            attempts: attempt,
                            last_error: e,
                        });
                    }
                    let delay = self.delay_after(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts(),
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "attempt failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[derive(Debug)]
pub struct Exhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}
