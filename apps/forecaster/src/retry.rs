//! Bounded exponential backoff shared by every outbound API client.
//!
//! Callers classify their errors through `Transient`; anything not transient
//! returns on the first failure.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use tracing::warn;

/// Errors that may succeed when the same request is sent again later.
pub trait Transient {
    fn is_transient(&self) -> bool;

    /// Server-supplied wait before the next attempt, if any.
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 means a single attempt).
    pub max_retries: u32,
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub multiplier: f64,
    pub randomization_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_interval: Duration::from_secs(15),
            max_interval: Duration::from_secs(15 * 60),
            multiplier: 2.0,
            randomization_factor: 0.2,
        }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_interval)
            .with_max_interval(self.max_interval)
            .with_multiplier(self.multiplier)
            .with_randomization_factor(self.randomization_factor)
            // bounded by max_retries instead
            .with_max_elapsed_time(None)
            .build()
    }

    /// Next wait: the backoff step, or the server's Retry-After when longer
    /// (capped at `max_interval`).
    fn delay(&self, step: Option<Duration>, retry_after: Option<Duration>) -> Duration {
        let step = step.unwrap_or(self.max_interval);
        match retry_after {
            Some(hint) => step.max(hint.min(self.max_interval)),
            None => step,
        }
    }
}

/// Runs `attempt` until it succeeds, fails with a non-transient error, or
/// `policy.max_retries` retries are used up.
pub async fn retry_transient<T, E, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut attempt: F,
) -> Result<T, E>
where
    E: Transient + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut backoff = policy.backoff();
    let mut retries = 0;

    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && retries < policy.max_retries => {
                let delay = policy.delay(backoff.next_backoff(), e.retry_after());
                retries += 1;
                warn!(
                    "{label} failed ({e}), retry {retries}/{} in {delay:?}",
                    policy.max_retries
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Reads a delta-seconds Retry-After header. The HTTP-date form is ignored.
pub fn retry_after_header(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_retry_after)
}

fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
