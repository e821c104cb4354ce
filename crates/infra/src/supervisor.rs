//! Connection supervisor: retry with exponential backoff.
//!
//! Applied to broker connection establishment at process startup. Only
//! connection-class failures (refused, unreachable) are retried; anything
//! else propagates immediately. After exhausting its attempts the failure
//! is fatal — the process must not silently run without a broker.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;
use tracing::warn;

/// Classification hook for retriable failures.
///
/// An error advertises whether it is connection-class; the supervisor never
/// guesses from message text.
pub trait RetryClass {
    fn is_connection_error(&self) -> bool;
}

/// Backoff policy: `base * 2^(attempt-1)`, capped at `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the given failed attempt (1-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let base_ms = self.base_delay.as_millis() as u64;
        let max_ms = self.max_delay.as_millis() as u64;

        let factor = 1u64 << (attempt - 1).min(32);
        let delay_ms = base_ms.saturating_mul(factor).min(max_ms);

        Duration::from_millis(delay_ms)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SupervisorError<E> {
    /// Every attempt failed with a connection-class error.
    #[error("gave up after {attempts} connection attempts: {cause}")]
    RetriesExhausted { attempts: u32, cause: E },

    /// A non-connection failure surfaced; it was not retried.
    #[error("connection attempt failed: {0}")]
    Fatal(E),
}

/// Run `connect` until it succeeds, a non-retriable error surfaces, or the
/// policy's attempts are exhausted.
///
/// A warning is emitted before every backoff sleep.
pub async fn connect_with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    mut connect: F,
) -> Result<T, SupervisorError<E>>
where
    E: RetryClass + core::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1u32;

    loop {
        match connect().await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_connection_error() => {
                return Err(SupervisorError::Fatal(err));
            }
            Err(err) => {
                if attempt >= policy.max_attempts {
                    return Err(SupervisorError::RetriesExhausted {
                        attempts: attempt,
                        cause: err,
                    });
                }

                let delay = policy.delay_for_attempt(attempt);
                warn!(
                    attempt,
                    delay_secs = delay.as_secs_f64(),
                    error = %err,
                    "connection failed; backing off before retry"
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use proptest::prelude::*;
    use tokio::time::Instant;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum FakeError {
        Refused,
        BadCredentials,
    }

    impl core::fmt::Display for FakeError {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            match self {
                Self::Refused => write!(f, "connection refused"),
                Self::BadCredentials => write!(f, "bad credentials"),
            }
        }
    }

    impl RetryClass for FakeError {
        fn is_connection_error(&self) -> bool {
            matches!(self, Self::Refused)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_third_attempt_with_growing_delays() {
        let attempts = AtomicU32::new(0);
        let timestamps: Mutex<Vec<Instant>> = Mutex::new(Vec::new());

        let result = connect_with_retry(&RetryPolicy::default(), || {
            let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            timestamps.lock().unwrap().push(Instant::now());
            async move {
                if n < 3 {
                    Err(FakeError::Refused)
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);

        // Delay between attempts must not decrease: 2s then 4s.
        let stamps = timestamps.lock().unwrap();
        let first_gap = stamps[1] - stamps[0];
        let second_gap = stamps[2] - stamps[1];
        assert_eq!(first_gap, Duration::from_secs(2));
        assert_eq!(second_gap, Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_five_connection_failures() {
        let attempts = AtomicU32::new(0);

        let result: Result<(), _> = connect_with_retry(&RetryPolicy::default(), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(FakeError::Refused) }
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 5);
        assert!(matches!(
            result.unwrap_err(),
            SupervisorError::RetriesExhausted { attempts: 5, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn non_connection_failure_propagates_without_retry() {
        let attempts = AtomicU32::new(0);

        let result: Result<(), _> = connect_with_retry(&RetryPolicy::default(), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(FakeError::BadCredentials) }
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(matches!(
            result.unwrap_err(),
            SupervisorError::Fatal(FakeError::BadCredentials)
        ));
    }

    #[test]
    fn default_policy_delays_double_then_cap() {
        let policy = RetryPolicy::default();
        let delays: Vec<u64> = (1..=4).map(|a| policy.delay_for_attempt(a).as_secs()).collect();
        assert_eq!(delays, vec![2, 4, 8, 10]);
    }

    proptest! {
        #[test]
        fn delays_never_decrease_and_respect_the_cap(attempt in 1u32..40) {
            let policy = RetryPolicy::default();
            let current = policy.delay_for_attempt(attempt);
            let next = policy.delay_for_attempt(attempt + 1);
            prop_assert!(next >= current);
            prop_assert!(current <= policy.max_delay);
        }
    }
}
