//! Resilient request executor
//!
//! Wraps a single outbound call with bounded exponential-backoff retry.
//!
//! **Policy:**
//! - Up to `max_retries` retries after the first attempt (default 4, so 5 attempts)
//! - Retry on transport failures (including the per-attempt timeout), 429 and 5xx
//! - Any other 4xx fails immediately
//! - Before retry `n` (0-based) sleep `base_delay × 2^n + jitter(0..max_jitter)`
//! - On exhaustion the last observed error is returned unchanged

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::{Error, Result};

/// Default retry count (attempts = retries + 1)
pub const DEFAULT_MAX_RETRIES: u32 = 4;
/// Default base backoff delay
pub const DEFAULT_BASE_DELAY_MS: u64 = 1500;
/// Default upper bound (exclusive) of the random jitter
pub const DEFAULT_MAX_JITTER_MS: u64 = 500;
/// Default per-attempt timeout
pub const DEFAULT_ATTEMPT_TIMEOUT_SECS: u64 = 45;

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay multiplied by `2^retry`
    pub base_delay: Duration,
    /// Exclusive upper bound of the random jitter added to every delay
    pub max_jitter: Duration,
    /// Bound on a single attempt; `None` leaves it to the transport
    pub attempt_timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            max_jitter: Duration::from_millis(DEFAULT_MAX_JITTER_MS),
            attempt_timeout: Some(Duration::from_secs(DEFAULT_ATTEMPT_TIMEOUT_SECS)),
        }
    }
}

impl RetryPolicy {
    /// Total number of attempts allowed
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Deterministic part of the delay before retry `retry` (0-based)
    pub fn base_backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.base_delay.saturating_mul(factor)
    }

    /// Full delay before retry `retry`, jitter included
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let jitter_ms = self.max_jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..jitter_ms)
        };

        self.base_backoff(retry) + Duration::from_millis(jitter)
    }
}

/// Run `operation` under `policy`.
///
/// `operation` is invoked once per attempt, so it must rebuild any
/// non-reusable request state (multipart forms, streams) on every call.
pub async fn with_retry<F, Fut, T>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error: Option<Error> = None;

    for attempt in 0..policy.max_attempts() {
        if attempt > 0 {
            let delay = policy.backoff_delay(attempt - 1);
            tracing::warn!(
                operation = operation_name,
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                error = %last_error.as_ref().map(|e| e.to_string()).unwrap_or_default(),
                "Transient failure, retrying after backoff"
            );
            tokio::time::sleep(delay).await;
        }

        let outcome = match policy.attempt_timeout {
            Some(limit) => match tokio::time::timeout(limit, operation()).await {
                Ok(result) => result,
                Err(_) => Err(Error::Transport(format!(
                    "{} timed out after {} ms",
                    operation_name,
                    limit.as_millis()
                ))),
            },
            None => operation().await,
        };

        match outcome {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!(
                        operation = operation_name,
                        attempts = attempt + 1,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(value);
            }
            Err(err) if err.is_retryable() => {
                last_error = Some(err);
            }
            Err(err) => {
                tracing::debug!(
                    operation = operation_name,
                    error = %err,
                    "Non-retryable failure"
                );
                return Err(err);
            }
        }
    }

    tracing::error!(
        operation = operation_name,
        attempts = policy.max_attempts(),
        "Retries exhausted"
    );

    Err(last_error.unwrap_or_else(|| {
        Error::Internal(format!("{} failed without a recorded error", operation_name))
    }))
}
