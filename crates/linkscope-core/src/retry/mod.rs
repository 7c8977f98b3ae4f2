//! Retry and backoff policy.
//!
//! Classifies transport failures (timeouts, throttling, connection errors,
//! rejected credentials) into [`ErrorKind`]s and turns them into exponential
//! backoff decisions. The feed engine never retries on its own; callers that
//! want retries wrap a run with [`run_with_retry`] or [`run_feed_with_retry`].

mod classify;
mod policy;
mod run;

pub use classify::{classify_curl_error, classify_http_status, Classify};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::{run_feed_with_retry, run_with_retry};
