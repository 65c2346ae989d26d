use backon::{ConstantBuilder, Retryable};
use std::{
    future::Future,
    sync::atomic::{AtomicU32, Ordering},
    time::Duration,
};

use crate::constants::*;

/// Errors which can tell whether a failed call is worth retrying
pub trait Transient {
    fn is_transient(&self) -> bool;
}

/// Bounded retry policy with a fixed backoff between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: RETRY_MAX_ATTEMPTS,
            backoff: Duration::from_millis(RETRY_BACKOFF_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Run the operation until it succeeds, fails with a non transient error
    /// or runs out of attempts. The last error is returned as is.
    pub async fn run<T, E, F, Fut>(&self, op_name: &str, op: F) -> Result<T, E>
    where
        E: Transient + std::fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        // backon counts retries, not attempts
        let backoff = ConstantBuilder::default()
            .with_delay(self.backoff)
            .with_max_times(self.max_attempts.saturating_sub(1) as usize);
        let attempt = AtomicU32::new(1);
        op.retry(backoff)
            .sleep(tokio::time::sleep)
            .when(|err: &E| err.is_transient())
            .notify(|err: &E, dur: Duration| {
                let n = attempt.fetch_add(1, Ordering::SeqCst);
                tracing::warn!(
                    "{op_name} failed on attempt {n}/{}: {err}, retrying in {}ms",
                    self.max_attempts,
                    dur.as_millis()
                );
            })
            .await
    }
}
