//! Capped exponential backoff for exporter attempts.
//!
//! Exporters run each network attempt through a [`Retrier`]. The attempt
//! function classifies its own outcome — success, permanent failure, or
//! retryable failure — and the retrier sleeps `base * 2^attempt` between
//! retryable attempts until the budget is exhausted.

use std::fmt;
use std::time::Duration;

use crate::otel_warn;

/// Outcome of a single export attempt, as classified by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The attempt succeeded; stop immediately.
    Success,
    /// The attempt failed permanently; stop immediately.
    Failure,
    /// The attempt failed transiently; retry after backoff.
    Retry,
}

/// Terminal result of a retried operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryResult {
    /// An attempt returned [`AttemptOutcome::Success`].
    Success,
    /// An attempt returned [`AttemptOutcome::Failure`].
    Failure,
    /// Every attempt asked for a retry and the budget ran out.
    MaxAttemptsReached,
}

/// Executes an attempt function with capped exponential backoff.
///
/// With `max_retries = k` the attempt function runs at most `k + 1` times,
/// sleeping `base * 2^attempt` after each retryable failure that still has
/// budget left. The sleeper is injectable so tests can record the requested
/// delays instead of waiting.
pub struct Retrier {
    max_retries: usize,
    base: Duration,
    sleep: Box<dyn Fn(Duration) + Send + Sync>,
}

/// Default number of retries after the initial attempt.
pub const DEFAULT_MAX_RETRIES: usize = 4;
/// Default backoff base.
pub const DEFAULT_BASE: Duration = Duration::from_secs(1);

impl Default for Retrier {
    fn default() -> Self {
        Retrier::new(DEFAULT_MAX_RETRIES)
    }
}

impl fmt::Debug for Retrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retrier")
            .field("max_retries", &self.max_retries)
            .field("base", &self.base)
            .finish()
    }
}

impl Retrier {
    /// Create a retrier sleeping with [`std::thread::sleep`].
    pub fn new(max_retries: usize) -> Self {
        Retrier {
            max_retries,
            base: DEFAULT_BASE,
            sleep: Box::new(std::thread::sleep),
        }
    }

    /// Override the backoff base.
    pub fn with_base(mut self, base: Duration) -> Self {
        self.base = base;
        self
    }

    /// Replace the sleeper, e.g. with a recording fake in tests.
    pub fn with_sleep(mut self, sleep: impl Fn(Duration) + Send + Sync + 'static) -> Self {
        self.sleep = Box::new(sleep);
        self
    }

    /// Run `attempt` until it terminates or the retry budget is exhausted.
    pub fn retry<F>(&self, mut attempt: F) -> RetryResult
    where
        F: FnMut() -> AttemptOutcome,
    {
        for i in 0..=self.max_retries {
            match attempt() {
                AttemptOutcome::Success => return RetryResult::Success,
                AttemptOutcome::Failure => return RetryResult::Failure,
                AttemptOutcome::Retry => {
                    if i < self.max_retries {
                        let delay = self.base * (1u32 << i.min(31));
                        otel_warn!(
                            name: "Retrier.BackingOff",
                            attempt = i,
                            delay_millis = delay.as_millis()
                        );
                        (self.sleep)(delay);
                    }
                }
            }
        }
        otel_warn!(name: "Retrier.MaxAttemptsReached", attempts = self.max_retries + 1);
        RetryResult::MaxAttemptsReached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn recording_retrier(max_retries: usize) -> (Retrier, Arc<Mutex<Vec<Duration>>>) {
        let sleeps = Arc::new(Mutex::new(Vec::new()));
        let recorded = sleeps.clone();
        let retrier = Retrier::new(max_retries)
            .with_sleep(move |d| recorded.lock().unwrap().push(d));
        (retrier, sleeps)
    }

    #[test]
    fn success_terminates_immediately() {
        let attempts = AtomicUsize::new(0);
        let (retrier, sleeps) = recording_retrier(4);
        let result = retrier.retry(|| {
            attempts.fetch_add(1, Ordering::SeqCst);
            AttemptOutcome::Success
        });
        assert_eq!(result, RetryResult::Success);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(sleeps.lock().unwrap().is_empty());
    }

    #[test]
    fn failure_terminates_immediately() {
        let attempts = AtomicUsize::new(0);
        let (retrier, sleeps) = recording_retrier(4);
        let result = retrier.retry(|| {
            attempts.fetch_add(1, Ordering::SeqCst);
            AttemptOutcome::Failure
        });
        assert_eq!(result, RetryResult::Failure);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(sleeps.lock().unwrap().is_empty());
    }

    #[test]
    fn retry_forever_runs_max_plus_one_attempts() {
        let attempts = AtomicUsize::new(0);
        let (retrier, sleeps) = recording_retrier(4);
        let result = retrier.retry(|| {
            attempts.fetch_add(1, Ordering::SeqCst);
            AttemptOutcome::Retry
        });
        assert_eq!(result, RetryResult::MaxAttemptsReached);
        assert_eq!(attempts.load(Ordering::SeqCst), 5);
        // doubling sequence, no sleep after the final attempt
        assert_eq!(
            *sleeps.lock().unwrap(),
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8),
            ]
        );
    }

    #[test]
    fn retry_then_success_records_doubling_sleeps() {
        // three transient failures, then success
        let attempts = AtomicUsize::new(0);
        let (retrier, sleeps) = recording_retrier(4);
        let result = retrier.retry(|| {
            if attempts.fetch_add(1, Ordering::SeqCst) < 3 {
                AttemptOutcome::Retry
            } else {
                AttemptOutcome::Success
            }
        });
        assert_eq!(result, RetryResult::Success);
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
        assert_eq!(
            *sleeps.lock().unwrap(),
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
            ]
        );
    }

    #[test]
    fn custom_base_scales_delays() {
        let (retrier, sleeps) = recording_retrier(2);
        let retrier = retrier.with_base(Duration::from_millis(100));
        let result = retrier.retry(|| AttemptOutcome::Retry);
        assert_eq!(result, RetryResult::MaxAttemptsReached);
        assert_eq!(
            *sleeps.lock().unwrap(),
            vec![Duration::from_millis(100), Duration::from_millis(200)]
        );
    }

    #[test]
    fn zero_retries_means_single_attempt() {
        let attempts = AtomicUsize::new(0);
        let (retrier, sleeps) = recording_retrier(0);
        let result = retrier.retry(|| {
            attempts.fetch_add(1, Ordering::SeqCst);
            AttemptOutcome::Retry
        });
        assert_eq!(result, RetryResult::MaxAttemptsReached);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(sleeps.lock().unwrap().is_empty());
    }
}
