//! Retry policy for transport calls.
//!
//! Delays double from 200ms and are capped at 1500ms. Only idempotent calls
//! are ever replayed; the caller decides that up front.

use std::future::Future;
use std::time::Duration;

use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::warn;

use super::transport::{KvError, KvResult};

/// First backoff delay.
pub const BACKOFF_BASE_MS: u64 = 200;

/// Upper bound for a single backoff delay.
pub const BACKOFF_CAP_MS: u64 = 1500;

/// Default hard timeout for a single call.
pub const DEFAULT_TIMEOUT_MS: u64 = 6500;

/// Default number of attempts for idempotent calls.
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// HTTP statuses worth retrying.
const RETRYABLE_STATUSES: &[u16] = &[408, 425, 429, 500, 502, 503, 504];

/// Returns true for HTTP statuses that indicate a transient failure.
pub fn is_retryable_status(status: u16) -> bool {
    RETRYABLE_STATUSES.contains(&status)
}

/// Attempt count and timeout shared by every call of a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            timeout,
        }
    }

    /// Delays between attempts: 200, 400, 800, 1500, 1500, ...
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::from_millis(2)
            .factor(BACKOFF_BASE_MS / 2)
            .max_delay(Duration::from_millis(BACKOFF_CAP_MS))
    }

    /// Runs `action`, replaying it on retryable errors when `retry` is set.
    ///
    /// Non-retryable errors and the error of the last attempt are returned
    /// unchanged.
    pub async fn run<T, F, Fut>(&self, op: &str, retry: bool, action: F) -> KvResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = KvResult<T>>,
    {
        let attempts = if retry { self.max_attempts } else { 1 };
        let strategy = self.backoff().take(attempts.saturating_sub(1));

        RetryIf::spawn(strategy, action, |err: &KvError| {
            let retryable = err.is_retryable();
            if retryable {
                warn!(op, error = %err, "kv call failed, retrying");
                metrics::counter!("kv_retries_total", "op" => op.to_string()).increment(1);
            }
            retryable
        })
        .await
    }
}
