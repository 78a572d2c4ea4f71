use std::{future::Future, time::Duration};

use tokio::time::sleep;

use crate::error::{Result, SyncError};

/// One retry policy for every Web API call.
///
/// Rate limited responses are always retried after the server supplied delay
/// (never less than `rate_limit_floor`) and do not count as attempts.
/// Transient failures back off exponentially from `base_delay`, doubling up to
/// `max_delay`, and give up after `max_attempts` when bounded. Anything else is
/// returned immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub rate_limit_floor: Duration,
    /// Response header carrying the rate limit delay in seconds
    pub retry_after_header: &'static str,
    /// `None` retries transient failures forever
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(16),
            rate_limit_floor: Duration::from_secs(2),
            retry_after_header: "retry-after",
            max_attempts: Some(5),
        }
    }
}

impl RetryPolicy {
    /// Same delays as the default policy but never gives up on transient errors.
    pub fn unbounded() -> Self {
        Self {
            max_attempts: None,
            ..Self::default()
        }
    }

    /// Delay before the retry that follows the `failures`-th transient failure
    /// (1-based): 1s, 2s, 4s, 8s, 16s, 16s, ...
    pub fn backoff_delay(&self, failures: u32) -> Duration {
        let factor = 2u32.saturating_pow(failures.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    pub fn rate_limit_delay(&self, retry_after_secs: u64) -> Duration {
        Duration::from_secs(retry_after_secs).max(self.rate_limit_floor)
    }

    /// Runs `operation` until it succeeds or fails in a way the policy gives up on.
    pub async fn run<T, F, Fut>(&self, operation_name: &str, operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.run_with(operation_name, SyncError::is_transient, operation)
            .await
    }

    /// Like [`run`](Self::run), with `retryable` deciding which failures
    /// back off and retry. Rate limiting is always retried.
    pub async fn run_with<T, F, Fut>(
        &self,
        operation_name: &str,
        retryable: fn(&SyncError) -> bool,
        mut operation: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut failures = 0u32;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(SyncError::RateLimited { retry_after_secs }) => {
                    let delay = self.rate_limit_delay(retry_after_secs);
                    log::warn!(
                        "{operation_name} rate limited. Retrying after {}s",
                        delay.as_secs()
                    );
                    sleep(delay).await;
                }
                Err(err) if retryable(&err) => {
                    failures += 1;
                    if self.max_attempts.is_some_and(|max| failures >= max) {
                        log::warn!("{operation_name} failed after {failures} attempts: {err}");
                        return Err(err);
                    }

                    let delay = self.backoff_delay(failures);
                    log::warn!(
                        "{operation_name} transient error ({err}). Retrying in {:.1}s",
                        delay.as_secs_f64()
                    );
                    sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
