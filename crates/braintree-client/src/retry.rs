//! Backoff policy for gateway transport failures.
//!
//! A response that arrives is final, whatever its status; the gateway may
//! already have acted on it. A failure to get any response is attempted
//! again only when the caller's `retryable` check allows it, which for
//! writes means the request never left this host.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Retries after the first attempt when none is configured.
pub(crate) const DEFAULT_MAX_RETRIES: u32 = 3;

const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(200);

/// How many times, and how patiently, to repeat a failed send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}

impl RetryPolicy {
    pub(crate) fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }

    #[cfg(test)]
    fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Pause before retry number `retry` (0-based): base, 2x base, 4x base...
    pub(crate) fn delay(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(retry))
    }

    /// Run `attempt` until it succeeds, fails with an error `retryable`
    /// refuses, or the retries are spent. `attempt` must build a fresh
    /// request each call.
    pub(crate) async fn run<F, Fut, T, E, R>(&self, endpoint: &str, retryable: R, attempt: F) -> Result<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        R: Fn(&E) -> bool,
    {
        let mut retry = 0;
        loop {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(e) if retry < self.max_retries && retryable(&e) => {
                    let delay = self.delay(retry);
                    retry += 1;
                    tracing::warn!(
                        %endpoint,
                        attempt = retry,
                        max_retries = self.max_retries,
                        ?delay,
                        "gateway transport error, retrying: {e}"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
