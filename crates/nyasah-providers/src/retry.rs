//! Bounded retry for provider calls.
//!
//! Only transient failures are retried: timeouts, refused connections,
//! 429 and 5xx. A malformed body or a rejected credential fails at once.

use std::future::Future;
use std::time::Duration;

use nyasah_core::HttpSettings;

use crate::error::ProviderError;

const MAX_DELAY: Duration = Duration::from_secs(30);

/// Returns `true` for errors that may succeed on a later attempt.
pub(crate) fn is_retriable(err: &ProviderError) -> bool {
    match err {
        ProviderError::Unavailable(e) => e.is_timeout() || e.is_connect(),
        ProviderError::Status { status, .. } => *status == 429 || *status >= 500,
        ProviderError::MalformedResponse { .. }
        | ProviderError::NoResponse { .. }
        | ProviderError::UnsupportedProvider(_)
        | ProviderError::MissingCredential { .. }
        | ProviderError::InvalidEndpoint { .. } => false,
    }
}

/// Exponential back-off: the n-th retry waits `base × 2ⁿ⁻¹`, capped at 30 s,
/// then scaled by a random factor in `[0.75, 1.25)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Backoff {
    max_retries: u32,
    base: Duration,
}

impl Backoff {
    pub(crate) fn new(max_retries: u32, base: Duration) -> Self {
        Self { max_retries, base }
    }

    pub(crate) fn from_settings(http: &HttpSettings) -> Self {
        Self::new(http.max_retries, Duration::from_millis(http.backoff_base_ms))
    }

    /// Un-jittered wait before retry number `retry` (1-based).
    fn nominal(&self, retry: u32) -> Duration {
        let factor = 1u32 << retry.saturating_sub(1).min(16);
        self.base.saturating_mul(factor).min(MAX_DELAY)
    }

    fn jittered(&self, retry: u32) -> Duration {
        self.nominal(retry)
            .mul_f64(0.75 + rand::random::<f64>() * 0.5)
    }

    /// Drive `call` until it succeeds, fails permanently, or retries run out.
    pub(crate) async fn run<T, F, Fut>(
        &self,
        provider: &'static str,
        mut call: F,
    ) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut retry = 0u32;
        loop {
            let err = match call().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            if retry >= self.max_retries || !is_retriable(&err) {
                return Err(err);
            }
            retry += 1;
            let delay = self.jittered(retry);
            tracing::warn!(
                provider,
                retry,
                max_retries = self.max_retries,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "provider call failed, backing off"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
