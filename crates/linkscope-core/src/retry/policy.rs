use std::time::Duration;

use crate::config::RetryConfig;

/// High-level classification of an error for retry purposes.
///
/// Callers map HTTP status codes, curl errors, or source failures into these
/// kinds; [`RetryPolicy::decide`] only looks at the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read).
    Timeout,
    /// Server asked us to slow down (e.g. 429, 503).
    Throttled,
    /// Network-level failure (connection reset, DNS, etc.).
    Connection,
    /// HTTP status that is retryable but not strictly throttling (5xx).
    Http5xx(u16),
    /// Credentials were rejected or access is forbidden (401, 403).
    Auth,
    /// The resource does not exist (404, 410).
    Gone,
    /// Any other error (not retried).
    Other,
}

impl ErrorKind {
    /// True for kinds a later attempt may succeed on.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::Timeout | ErrorKind::Throttled | ErrorKind::Connection | ErrorKind::Http5xx(_)
        )
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Simple exponential backoff policy with caps.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Base delay for backoff.
    pub base_delay: Duration,
    /// Upper bound on backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        let max_delay = Duration::from_secs(cfg.max_delay_secs);
        // NaN and negatives become zero; infinite or overflowing values cap out.
        let base_delay = Duration::try_from_secs_f64(cfg.base_delay_secs.max(0.0))
            .unwrap_or(max_delay)
            .min(max_delay);
        Self {
            max_attempts: cfg.max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }
}

impl RetryPolicy {
    /// Compute the next backoff delay for a given attempt and error kind.
    ///
    /// `attempt` is 1-based (1 = first attempt). Returns `RetryDecision::NoRetry`
    /// when we should stop retrying.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts || !kind.is_retryable() {
            return RetryDecision::NoRetry;
        }
        // base * 2^(attempt-1), capped.
        let exp = 1u32 << attempt.saturating_sub(1).min(8);
        let delay = self.base_delay.saturating_mul(exp).min(self.max_delay);
        RetryDecision::RetryAfter(delay)
    }
}
