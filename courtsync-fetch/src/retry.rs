//! Bounded retry for fallible fetch operations.
//!
//! Replaces the retry-loop-with-sleep control flow scattered across earlier
//! drafts with one policy invoked by a generic helper: max attempts plus a
//! fixed backoff, transient errors only.

use std::time::Duration;

use crate::error::FetchError;

/// Bounded-attempt policy with a fixed sleep between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(5),
        }
    }
}

/// Run `op` until it succeeds, a permanent error surfaces, or attempts run
/// out.
///
/// Permanent failures (4xx, malformed payload) are returned immediately —
/// retrying them only hammers the upstream. When the final attempt fails with
/// a transient error, the result is [`FetchError::Exhausted`] carrying the
/// attempt count and the last underlying error.
pub fn retry<T, F>(policy: &RetryPolicy, mut op: F) -> Result<T, FetchError>
where
    F: FnMut(u32) -> Result<T, FetchError>,
{
    let max = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_transient() => return Err(err),
            Err(err) if attempt >= max => {
                return Err(FetchError::Exhausted {
                    attempts: attempt,
                    source: Box::new(err),
                })
            }
            Err(err) => {
                log::warn!(
                    "fetch attempt {attempt}/{max} failed: {err}; retrying in {:?}",
                    policy.backoff
                );
                std::thread::sleep(policy.backoff);
            }
        }
    }
}
