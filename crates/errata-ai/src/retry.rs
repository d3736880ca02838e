//! Rate-limit retry policy.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::ProviderError;

/// Retry policy for rate-limited requests.
///
/// Backoff is linear: after failed attempt `n` the policy sleeps
/// `n * base_delay` before trying again. Errors other than rate limiting are
/// returned immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay after failed attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// Run `op`, retrying while it fails with a retryable error.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        "Attempt {}/{} failed ({}), retrying in {:?}",
                        attempt, max_attempts, err, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn instant() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_retries_rate_limit_then_succeeds() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = instant()
            .run(move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(ProviderError::RateLimited(429))
                } else {
                    Ok("done")
                }
            })
            .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), _> = instant()
            .run(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ProviderError::RateLimited(429))
            })
            .await;
        assert!(matches!(result, Err(ProviderError::RateLimited(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_other_errors_abort_immediately() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), _> = instant()
            .run(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ProviderError::Api {
                    status: 500,
                    message: "boom".into(),
                })
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleeps_between_attempts() {
        let start = tokio::time::Instant::now();
        let _: Result<(), _> = RetryPolicy::default()
            .run(|| async { Err(ProviderError::RateLimited(429)) })
            .await;
        assert!(start.elapsed() >= Duration::from_secs(3));
    }
}
