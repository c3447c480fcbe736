//! Polling until a probe succeeds.
//!
//! Transactions are submitted without waiting for their receipts, so every
//! step that depends on on-chain state re-reads that state through a probe
//! until it reports the expected outcome or the [`RetryPolicy`] runs out.

use std::{future::Future, time::Duration};

use tracing::trace;

/// How often to re-run a probe, and when to give up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub limit:    RetryLimit
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryLimit {
    /// Give up once the overall deadline elapses.
    Timeout(Duration),
    /// Give up after this many probe invocations.
    Attempts(u32)
}

impl RetryPolicy {
    pub const fn deadline(interval: Duration, timeout: Duration) -> Self {
        Self { interval, limit: RetryLimit::Timeout(timeout) }
    }

    pub const fn attempts(interval: Duration, attempts: u32) -> Self {
        Self { interval, limit: RetryLimit::Attempts(attempts) }
    }

    /// Confirmation policy used for token approvals: 24 probes, 5 seconds
    /// apart.
    pub const fn approvals() -> Self {
        Self::attempts(Duration::from_secs(5), 24)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::deadline(Duration::from_secs(2), Duration::from_secs(120))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollError {
    #[error("probe did not succeed within {after:?}, last error: {}", .last_error.as_deref().unwrap_or("none"))]
    Timeout { after: Duration, last_error: Option<String> },
    #[error("probe did not succeed after {attempts} attempts, last error: {}", .last_error.as_deref().unwrap_or("none"))]
    Exhausted { attempts: u32, last_error: Option<String> }
}

/// Runs `probe` until it returns `Ok`, sleeping `policy.interval` between
/// failed invocations. The value of the first successful invocation is
/// returned.
pub async fn block_until_successful<T, F, Fut>(
    policy: &RetryPolicy,
    mut probe: F
) -> Result<T, PollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = eyre::Result<T>>
{
    let mut attempts = 0u32;
    let mut last_error = None;

    let polling = async {
        loop {
            attempts += 1;
            match probe().await {
                Ok(out) => return Some(out),
                Err(e) => {
                    trace!(attempt = attempts, error = %e, "probe not successful yet");
                    last_error = Some(e.to_string());
                }
            }

            if let RetryLimit::Attempts(max) = policy.limit {
                if attempts >= max {
                    return None
                }
            }
            tokio::time::sleep(policy.interval).await;
        }
    };

    let outcome = match policy.limit {
        RetryLimit::Timeout(after) => tokio::time::timeout(after, polling).await.ok().flatten(),
        RetryLimit::Attempts(_) => polling.await
    };

    outcome.ok_or_else(|| match policy.limit {
        RetryLimit::Timeout(after) => PollError::Timeout { after, last_error },
        RetryLimit::Attempts(_) => PollError::Exhausted { attempts, last_error }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[tokio::test]
    async fn returns_first_success() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::attempts(Duration::from_millis(1), 10);

        let out = block_until_successful(&policy, || async {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 { eyre::bail!("not yet ({n})") }
            eyre::Ok(n * 10)
        })
        .await
        .unwrap();

        assert_eq!(out, 30);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn immediate_success_probes_once() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::deadline(Duration::from_secs(60), Duration::from_secs(120));

        block_until_successful(&policy, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            eyre::Ok(())
        })
        .await
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausts_attempts_with_last_error() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::attempts(Duration::from_millis(1), 4);

        let err = block_until_successful(&policy, || async {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Err::<(), _>(eyre::eyre!("failure {n}"))
        })
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(
            err,
            PollError::Exhausted { attempts: 4, last_error: Some("failure 4".to_string()) }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_when_probe_never_succeeds() {
        let policy = RetryPolicy::deadline(Duration::from_secs(2), Duration::from_secs(10));

        let err = block_until_successful(&policy, || async {
            Err::<(), _>(eyre::eyre!("contract not found"))
        })
        .await
        .unwrap_err();

        match err {
            PollError::Timeout { after, last_error } => {
                assert_eq!(after, Duration::from_secs(10));
                assert_eq!(last_error.as_deref(), Some("contract not found"));
            }
            other => panic!("expected a timeout, got {other:?}")
        }
    }
}
