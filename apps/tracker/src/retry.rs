use crate::rpc::RpcError;
use log::warn;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Back-off settings for one kind of RPC call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base_backoff: Duration,
    pub max_backoff: Duration,
    /// Total attempts allowed; None retries rate limits forever
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// getSignaturesForAddress: keep backing off until the node lets us through.
    pub const SIGNATURES: RetryPolicy = RetryPolicy {
        base_backoff: Duration::from_secs(1),
        max_backoff: Duration::from_secs(60),
        max_attempts: None,
    };

    /// getTransaction: give up after 5 attempts and treat the tx as unavailable.
    pub const TRANSACTION: RetryPolicy = RetryPolicy {
        base_backoff: Duration::from_secs(1),
        max_backoff: Duration::from_secs(60),
        max_attempts: Some(5),
    };

    /// Delay before the `retry`-th retry (1-based): `min(base * 2^(retry-1), max)`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let shift = retry.saturating_sub(1).min(31);
        self.base_backoff
            .saturating_mul(1u32 << shift)
            .min(self.max_backoff)
    }
}

/// Runs `op`, sleeping and retrying only while it fails with `RpcError::RateLimited`.
/// Any other error is returned on the spot.
pub async fn with_backoff<T, F, Fut>(policy: &RetryPolicy, what: &str, mut op: F) -> Result<T, RpcError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RpcError>>,
{
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        match op().await {
            Ok(v) => return Ok(v),
            Err(e) if !e.is_rate_limited() => return Err(e),
            Err(e) => {
                if policy.max_attempts.is_some_and(|max| attempt >= max) {
                    return Err(e);
                }

                let sleep_for = policy.delay_for(attempt);
                warn!(
                    "rate-limited (429) {} attempt={} sleeping={:?}",
                    what, attempt, sleep_for
                );
                sleep(sleep_for).await;
            }
        }
    }
}
