//! Retry and backoff policy.
//!
//! Fetcher failures are classified (timeouts, throttling, connection
//! failures, 5xx) into transient kinds that are retried with exponential
//! backoff, and everything else, which fails the task immediately.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_http_status, classify_message};
pub use error::FetchError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
