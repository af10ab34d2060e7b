//! Fixed-backoff retry for quote fetches.
//!
//! Only `UpstreamUnavailable` is retried. A first-attempt rejection or
//! malformed payload is returned as is; any failure after a retry surfaces as
//! `QuoteUnavailable`.

use std::future::Future;
use std::time::Duration;

use crate::error::{ErrorKind, MarketDataError, Result};
use crate::types::enums::Exchange;

/// How many times to retry and how long to wait before each retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    /// `retries` extra calls, each preceded by `backoff`.
    pub fn new(retries: u32, backoff: Duration) -> Self {
        Self { retries, backoff }
    }

    /// Total provider calls made before giving up.
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempts are exhausted. Any failure once a retry has been made
    /// surfaces as `QuoteUnavailable`.
    pub async fn run<T, F, Fut>(&self, exchange: Exchange, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max = self.max_attempts();
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt == 1 && e.kind() != ErrorKind::UpstreamUnavailable => {
                    return Err(e);
                }
                Err(e) if attempt >= max || e.kind() != ErrorKind::UpstreamUnavailable => {
                    tracing::warn!(%exchange, attempts = attempt, error = %e, "quote unavailable, giving up");
                    return Err(MarketDataError::QuoteUnavailable {
                        exchange: exchange.to_string(),
                        attempts: attempt,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        %exchange,
                        attempt,
                        backoff_ms = self.backoff.as_millis() as u64,
                        error = %e,
                        "quote fetch failed, retrying"
                    );
                    tokio::time::sleep(self.backoff).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn unavailable() -> MarketDataError {
        MarketDataError::UpstreamUnavailable {
            provider: "NSE",
            reason: "request timed out".into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_once_then_gives_up() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(1, Duration::from_millis(500));
        let started = tokio::time::Instant::now();

        let err = policy
            .run(Exchange::NSE, |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(unavailable()) }
            })
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(started.elapsed() >= Duration::from_millis(500));
        assert!(matches!(
            err,
            MarketDataError::QuoteUnavailable { attempts: 2, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn second_attempt_can_succeed() {
        let policy = RetryPolicy::new(1, Duration::from_millis(500));
        let value = policy
            .run(Exchange::BSE, |attempt| async move {
                if attempt == 1 { Err(unavailable()) } else { Ok(attempt) }
            })
            .await
            .unwrap();
        assert_eq!(value, 2);
    }

    #[tokio::test]
    async fn rejections_are_not_retried() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let err = policy
            .run(Exchange::NSE, |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(MarketDataError::malformed("bad")) }
            })
            .await
            .unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(err.kind(), ErrorKind::MalformedUpstreamData);
    }

    #[tokio::test(start_paused = true)]
    async fn rejection_on_retry_is_unavailable() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(1, Duration::from_millis(500));
        let err = policy
            .run(Exchange::NSE, |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt == 1 {
                        Err::<(), _>(unavailable())
                    } else {
                        Err(MarketDataError::UpstreamRejected {
                            provider: "NSE",
                            status: reqwest::StatusCode::FORBIDDEN,
                            body: "Access Denied".into(),
                        })
                    }
                }
            })
            .await
            .unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(matches!(
            err,
            MarketDataError::QuoteUnavailable { attempts: 2, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_on_retry_stops_retrying() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::from_millis(10));
        let err = policy
            .run(Exchange::BSE, |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt == 1 {
                        Err::<(), _>(unavailable())
                    } else {
                        Err(MarketDataError::malformed("bad"))
                    }
                }
            })
            .await
            .unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(err.kind(), ErrorKind::QuoteUnavailable);
    }

    #[tokio::test]
    async fn zero_retries_means_one_call() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(0, Duration::from_secs(60));
        let err = policy
            .run(Exchange::NSE, |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(unavailable()) }
            })
            .await
            .unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(err.kind(), ErrorKind::QuoteUnavailable);
    }
}
