// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded retry
//!
//! [`with_retry`] re-invokes an operation until it succeeds or the policy
//! declines another attempt, then returns the last error. The default
//! policy, [`Attempts`], retries every error immediately; [`Backoff`] and
//! [`TransientOnly`] layer delays and error classification on top.

use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Decides whether a failed attempt is retried
pub trait RetryPolicy<E>: Send + Sync {
    /// Whether to try again after `attempt` (1-based) failed with `error`
    fn should_retry(&self, attempt: u32, error: &E) -> bool;

    /// Pause before the attempt following `attempt`
    fn delay(&self, _attempt: u32) -> Duration {
        Duration::ZERO
    }
}

/// Errors that know whether they are worth retrying
pub trait Classify {
    fn is_transient(&self) -> bool;
}

/// Up to `n` attempts, no delay, every error retried
///
/// `Attempts(0)` behaves as `Attempts(1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempts(pub u32);

impl<E> RetryPolicy<E> for Attempts {
    fn should_retry(&self, attempt: u32, _error: &E) -> bool {
        attempt < self.0.max(1)
    }
}

/// Bounded attempts with exponential delay between them
#[derive(Debug, Clone, PartialEq)]
pub struct Backoff {
    pub attempts: u32,
    pub initial: Duration,
    pub max: Duration,
    pub multiplier: f64,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            attempts: 3,
            initial: Duration::from_millis(100),
            max: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

impl<E> RetryPolicy<E> for Backoff {
    fn should_retry(&self, attempt: u32, _error: &E) -> bool {
        attempt < self.attempts.max(1)
    }

    fn delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.initial.as_secs_f64() * self.multiplier.powi(exp);
        if !secs.is_finite() || secs >= self.max.as_secs_f64() {
            return self.max;
        }
        Duration::from_secs_f64(secs.max(0.0))
    }
}

/// Retries only errors classified as transient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransientOnly<P>(pub P);

impl<E: Classify, P: RetryPolicy<E>> RetryPolicy<E> for TransientOnly<P> {
    fn should_retry(&self, attempt: u32, error: &E) -> bool {
        error.is_transient() && self.0.should_retry(attempt, error)
    }

    fn delay(&self, attempt: u32) -> Duration {
        self.0.delay(attempt)
    }
}

/// Run `operation` under `policy`, returning the first success or the last error
pub async fn with_retry<P, E, T, F, Fut>(policy: &P, mut operation: F) -> Result<T, E>
where
    P: RetryPolicy<E> + ?Sized,
    E: fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0u32;
    loop {
        attempt = attempt.saturating_add(1);
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if !policy.should_retry(attempt, &error) {
            tracing::warn!(attempts = attempt, error = %error, "giving up");
            return Err(error);
        }

        let delay = policy.delay(attempt);
        tracing::debug!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "retrying"
        );
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
