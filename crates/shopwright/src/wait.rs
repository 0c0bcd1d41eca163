//! Bounded polling.
//!
//! A [`WaitPolicy`] evaluates a probe until it yields a value or the timeout
//! elapses. The first successful probe returns immediately; between probes the
//! calling task sleeps for the poll interval. A timeout is an ordinary
//! [`ShopError::TimedOut`], so callers decide whether it is a defect or the
//! expected outcome (for example confirming something did not appear).

use crate::result::{ShopError, ShopResult};
use std::future::Future;
use std::time::{Duration, Instant};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default wait timeout (10 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

// =============================================================================
// WAIT POLICY
// =============================================================================

/// Timeout plus polling granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    timeout: Duration,
    poll_interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

impl WaitPolicy {
    /// Create a policy
    #[must_use]
    pub const fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Set timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Polling interval
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Timeout in whole milliseconds
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Poll `probe` until it returns `Some`.
    ///
    /// The probe runs at least once, even with a zero timeout. Errors from the
    /// probe abort the wait and propagate unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::TimedOut`] naming `waited_for` when the timeout
    /// elapses first.
    pub async fn until<T, F, Fut>(&self, waited_for: &str, mut probe: F) -> ShopResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ShopResult<Option<T>>>,
    {
        let start = Instant::now();
        loop {
            if let Some(value) = probe().await? {
                tracing::trace!(waited_for, elapsed = ?start.elapsed(), "wait satisfied");
                return Ok(value);
            }
            let elapsed = start.elapsed();
            if elapsed >= self.timeout {
                tracing::debug!(waited_for, timeout_ms = self.timeout_ms(), "wait timed out");
                return Err(ShopError::timed_out(waited_for, self.timeout_ms()));
            }
            tokio::time::sleep(self.poll_interval.min(self.timeout - elapsed)).await;
        }
    }

    /// Poll a boolean probe until it returns `true`.
    ///
    /// # Errors
    ///
    /// Same as [`WaitPolicy::until`]
    pub async fn until_true<F, Fut>(&self, waited_for: &str, mut probe: F) -> ShopResult<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ShopResult<bool>>,
    {
        self.until(waited_for, || {
            let fut = probe();
            async move {
                let ready = fut.await?;
                Ok::<_, ShopError>(ready.then_some(()))
            }
        })
        .await
    }

    /// Like [`WaitPolicy::until_true`], but a timeout reads as `false`.
    ///
    /// # Errors
    ///
    /// Propagates probe errors other than the timeout itself
    pub async fn holds_within<F, Fut>(&self, waited_for: &str, probe: F) -> ShopResult<bool>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ShopResult<bool>>,
    {
        match self.until_true(waited_for, probe).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_timeout() => Ok(false),
            Err(e) => Err(e),
        }
    }
}
