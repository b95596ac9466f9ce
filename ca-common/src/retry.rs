//! Retry with exponential backoff
//!
//! Hardens calls to external providers against transient failures.
//!
//! **Schedule:** after failed attempt `n` (1-based) the caller sleeps
//! `initial_delay * 2^(n-1)` before attempt `n + 1`. With the defaults
//! (3 attempts, 1000ms) the observed delays are 1000ms then 2000ms.
//! When attempts are exhausted the last error is returned unchanged.

use std::future::Future;
use std::time::Duration;

/// Default maximum number of attempts (initial call included)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay before the first retry
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 1000;

/// Backoff parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, initial call included. Values below 1 behave as 1.
    pub max_attempts: u32,
    /// Delay after the first failure; doubles after each further failure
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
        }
    }

    /// Delay to wait after failed attempt `attempt` (1-based)
    ///
    /// # Examples
    ///
    /// ```
    /// use ca_common::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::default();
    /// assert_eq!(policy.delay_for(1), Duration::from_millis(1000));
    /// assert_eq!(policy.delay_for(2), Duration::from_millis(2000));
    /// ```
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.initial_delay.saturating_mul(1u32 << exponent)
    }
}

/// Run `operation`, retrying every failure per `policy`.
///
/// # Arguments
/// * `operation_name` - Name for logging (e.g., "llm generate", "send report email")
/// * `policy` - Attempt count and initial delay
/// * `operation` - Async closure performing the call
pub async fn retry<F, Fut, T, E>(operation_name: &str, policy: RetryPolicy, operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    retry_if(operation_name, policy, |_| true, operation).await
}

/// Run `operation`, retrying only failures for which `should_retry` is true.
///
/// A failure rejected by `should_retry` is returned immediately.
pub async fn retry_if<F, Fut, T, E, P>(
    operation_name: &str,
    policy: RetryPolicy,
    should_retry: P,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        if attempt > 1 {
            tracing::debug!(operation = operation_name, attempt, "Retrying operation");
        }

        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(
                        operation = operation_name,
                        attempt,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(value);
            }
            Err(err) => {
                if !should_retry(&err) {
                    tracing::debug!(
                        operation = operation_name,
                        attempt,
                        error = %err,
                        "Operation failed with non-retryable error"
                    );
                    return Err(err);
                }

                if attempt >= max_attempts {
                    tracing::error!(
                        operation = operation_name,
                        attempt,
                        error = %err,
                        "Operation failed: retry attempts exhausted"
                    );
                    return Err(err);
                }

                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    backoff_ms = delay.as_millis() as u64,
                    error = %err,
                    "Operation failed, will retry after backoff"
                );

                tokio::time::sleep(delay).await;
            }
        }
    }
}
