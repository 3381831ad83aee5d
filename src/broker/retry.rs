//! Bounded fixed-backoff retry for transient broker failures

use std::future::Future;
use std::time::Duration;

/// Default number of retries after the first attempt
pub const DEFAULT_RETRY_LIMIT: u32 = 10;

/// Default wait between attempts
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(3);

/// Outcome of a single attempt
#[derive(Debug)]
pub enum Attempt<T, E> {
    /// Finished, stop retrying
    Done(T),
    /// Temporarily unavailable, worth another try
    Transient,
    /// Failed for good, stop retrying
    Fatal(E),
}

/// Why a retried operation gave up
#[derive(Debug)]
pub enum RetryError<E> {
    /// Every attempt was transient
    Exhausted { attempts: u32 },
    /// An attempt failed for good
    Fatal(E),
}

/// Retry policy: a fixed wait between attempts and a cap on retries.
///
/// Attempts are numbered from 0. With `retry_limit = N` an operation that keeps
/// failing transiently is tried `N + 1` times with `N` waits in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retry_limit: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(retry_limit: u32, backoff: Duration) -> Self {
        Self {
            retry_limit,
            backoff,
        }
    }

    /// Set the retry limit
    pub fn with_retry_limit(mut self, retry_limit: u32) -> Self {
        self.retry_limit = retry_limit;
        self
    }

    /// Set the backoff
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Whether another attempt follows a transient failure of `attempt`
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.retry_limit
    }

    /// Maximum number of attempts this policy makes
    pub fn max_attempts(&self) -> u32 {
        self.retry_limit.saturating_add(1)
    }

    /// Drive `op` until it finishes, fails for good, or runs out of retries.
    ///
    /// `op` receives the attempt number.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Attempt<T, E>>,
    {
        let mut attempt = 0;
        loop {
            match op(attempt).await {
                Attempt::Done(value) => return Ok(value),
                Attempt::Fatal(e) => return Err(RetryError::Fatal(e)),
                Attempt::Transient => {
                    if !self.should_retry(attempt) {
                        return Err(RetryError::Exhausted {
                            attempts: attempt + 1,
                        });
                    }
                    tokio::time::sleep(self.backoff).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_LIMIT, DEFAULT_BACKOFF)
    }
}
