//! Bounded retry with backoff for fallible async operations.
//!
//! Tuned for re-polling eventually consistent read models, not for riding out
//! network partitions: a handful of attempts with a short delay.
//!
//! Each call to [`retry`] is independent; nothing is shared between calls.
//! Delays are `tokio::time::sleep`, so other tasks keep running meanwhile.
//! Dropping the returned future stops further attempts (an attempt already in
//! flight is dropped with it).

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, sleep};

/// Decides whether a failure is worth another attempt.
pub type RetryPredicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Delay between consecutive attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayPolicy {
    /// Same delay after every failed attempt.
    Fixed(Duration),
    /// `initial * multiplier^(n-1)` after the n-th failed attempt, capped at `max`.
    Exponential {
        initial: Duration,
        multiplier: u32,
        max: Duration,
    },
}

impl DelayPolicy {
    /// Delay to wait after the given failed attempt (1-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        match *self {
            DelayPolicy::Fixed(delay) => delay,
            DelayPolicy::Exponential {
                initial,
                multiplier,
                max,
            } => {
                let factor = multiplier.saturating_pow(attempt - 1);
                initial.saturating_mul(factor).min(max)
            }
        }
    }
}

/// How many times to try, how long to wait in between, and what to retry.
pub struct RetryOptions<E> {
    /// Total attempts including the first one. `0` is treated as `1`.
    pub max_attempts: u32,
    pub delay: DelayPolicy,
    /// Wall-clock budget measured from the first attempt. A retry whose delay
    /// would overrun it is not started.
    pub deadline: Option<Duration>,
    retry_if: Option<RetryPredicate<E>>,
}

impl<E> RetryOptions<E> {
    pub fn new(max_attempts: u32, delay: DelayPolicy) -> Self {
        Self {
            max_attempts,
            delay,
            deadline: None,
            retry_if: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Only retry failures matching `predicate`; anything else is returned at once.
    pub fn retry_if(mut self, predicate: impl Fn(&E) -> bool + Send + Sync + 'static) -> Self {
        self.retry_if = Some(Arc::new(predicate));
        self
    }

    /// Keep the existing predicate (if any) and additionally require `predicate`.
    pub fn narrowed(self, predicate: impl Fn(&E) -> bool + Send + Sync + 'static) -> Self
    where
        E: 'static,
    {
        let existing = self.retry_if.clone();
        self.retry_if(move |error| predicate(error) && existing.as_ref().is_none_or(|p| p(error)))
    }

    pub fn should_retry(&self, error: &E) -> bool {
        self.retry_if.as_ref().is_none_or(|p| p(error))
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

impl<E> Default for RetryOptions<E> {
    fn default() -> Self {
        Self::new(5, DelayPolicy::Fixed(Duration::from_millis(100)))
    }
}

impl<E> Clone for RetryOptions<E> {
    fn clone(&self) -> Self {
        Self {
            max_attempts: self.max_attempts,
            delay: self.delay,
            deadline: self.deadline,
            retry_if: self.retry_if.clone(),
        }
    }
}

impl<E> core::fmt::Debug for RetryOptions<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RetryOptions")
            .field("max_attempts", &self.max_attempts)
            .field("delay", &self.delay)
            .field("deadline", &self.deadline)
            .field("retry_if", &self.retry_if.is_some())
            .finish()
    }
}

/// Invoke `operation` until it succeeds or the options say stop.
///
/// The failure returned on exhaustion (attempts or deadline) or on a
/// non-retryable error is the last one observed, unchanged.
pub async fn retry<T, E, F, Fut>(mut operation: F, options: &RetryOptions<E>) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: core::fmt::Display,
{
    let max_attempts = options.attempts();
    let started = Instant::now();
    let mut attempt = 0;

    loop {
        attempt += 1;

        let error = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!(attempt, "operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) => error,
        };

        if !options.should_retry(&error) {
            tracing::debug!(attempt, error = %error, "failure is not retryable");
            return Err(error);
        }

        if attempt >= max_attempts {
            tracing::warn!(attempt, error = %error, "retry attempts exhausted");
            return Err(error);
        }

        let delay = options.delay.delay_for_attempt(attempt);
        if let Some(deadline) = options.deadline {
            if started.elapsed().saturating_add(delay) > deadline {
                tracing::warn!(
                    attempt,
                    deadline_ms = deadline.as_millis() as u64,
                    error = %error,
                    "retry deadline reached"
                );
                return Err(error);
            }
        }

        tracing::debug!(
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "operation failed, retrying after delay"
        );
        drop(error);

        sleep(delay).await;
    }
}
