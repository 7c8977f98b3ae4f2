//! Retry loops: run an operation until success or the policy says stop.

use super::classify::Classify;
use super::policy::{RetryDecision, RetryPolicy};
use crate::feed::{FeedEngine, FeedError, FeedReport, FeedSource, RegistrationSink};

/// Runs a closure until it succeeds or the retry policy says to stop.
/// On retryable failure, sleeps for the backoff duration then tries again.
pub fn run_with_retry<T, E, F>(policy: &RetryPolicy, mut f: F) -> Result<T, E>
where
    E: Classify + std::fmt::Display,
    F: FnMut() -> Result<T, E>,
{
    let mut attempt = 1u32;
    loop {
        match f() {
            Ok(v) => return Ok(v),
            Err(e) => match policy.decide(attempt, e.error_kind()) {
                RetryDecision::NoRetry => return Err(e),
                RetryDecision::RetryAfter(d) => {
                    tracing::debug!(attempt, delay_ms = d.as_millis() as u64, error = %e, "retrying");
                    std::thread::sleep(d);
                    attempt += 1;
                }
            },
        }
    }
}

/// Runs a feed, resuming it from the failed page after transient errors.
///
/// The first attempt starts a fresh run; later attempts continue the
/// interrupted one, so posts seen or registered before a failure are not
/// processed twice. Fatal errors are returned immediately.
pub fn run_feed_with_retry<S, K>(
    policy: &RetryPolicy,
    engine: &mut FeedEngine<S, K>,
) -> Result<FeedReport, FeedError>
where
    S: FeedSource,
    K: RegistrationSink,
{
    let mut attempt = 1u32;
    let mut result = engine.run();
    loop {
        let e = match result {
            Ok(report) => return Ok(report),
            Err(e) => e,
        };
        match policy.decide(attempt, e.error_kind()) {
            RetryDecision::NoRetry => return Err(e),
            RetryDecision::RetryAfter(d) => {
                tracing::warn!(
                    feed = e.feed(),
                    attempt,
                    delay_ms = d.as_millis() as u64,
                    "feed failed, resuming after backoff"
                );
                std::thread::sleep(d);
                attempt += 1;
                result = engine.resume();
            }
        }
    }
}
