use std::{future::Future, time::Instant};

use alloy::{
    primitives::{TxHash, U256},
    providers::Provider
};
use eyre::eyre;
use tracing::{info, trace, warn};
use uniswap_v3::{RetryPolicy, block_until_successful, exact_input_single_swap};

use crate::environment::LoadTestEnvironment;

pub async fn async_time_fn<F, O, D>(f: F) -> (O, u128)
where
    F: FnOnce() -> D,
    D: Future<Output = O>
{
    let now = Instant::now();
    let res = f().await;
    let elapsed = now.elapsed().as_millis();
    (res, elapsed)
}

/// Submission latencies of one load run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub sent:     u64,
    pub failed:   u64,
    pub total_ms: u128,
    pub max_ms:   u128
}

impl LoadStats {
    pub fn record(&mut self, sent: bool, elapsed_ms: u128) {
        if sent {
            self.sent += 1;
        } else {
            self.failed += 1;
        }
        self.total_ms += elapsed_ms;
        self.max_ms = self.max_ms.max(elapsed_ms);
    }

    pub fn mean_ms(&self) -> u128 {
        match self.sent + self.failed {
            0 => 0,
            n => self.total_ms / n as u128
        }
    }
}

/// Sends `count` swaps of `amount_in` back to back with explicit nonces,
/// then waits until the last accepted swap has a receipt.
///
/// A rejected submission is counted and the loop moves on without consuming
/// its nonce, so one bad swap does not leave a gap for the rest.
pub async fn run_swaps<P>(
    env: &LoadTestEnvironment<P>,
    amount_in: U256,
    count: u64,
    policy: &RetryPolicy
) -> eyre::Result<LoadStats>
where
    P: Provider + Clone
{
    let provider = env.suite.swap_router02.contract.provider();
    let router = &env.suite.swap_router02.contract;
    let mut nonce = provider.get_transaction_count(env.sender).pending().await?;
    info!(count, %amount_in, start_nonce = nonce, "starting swap load");

    let mut stats = LoadStats::default();
    let mut last_tx: Option<TxHash> = None;
    for i in 0..count {
        let (res, elapsed) = async_time_fn(|| {
            exact_input_single_swap(router, &env.pool, amount_in, env.sender, nonce)
        })
        .await;

        match res {
            Ok(tx) => {
                trace!(i, nonce, %tx, elapsed_ms = elapsed, "swap submitted");
                stats.record(true, elapsed);
                last_tx = Some(tx);
                nonce += 1;
            }
            Err(e) => {
                warn!(i, nonce, error = %e, elapsed_ms = elapsed, "swap rejected");
                stats.record(false, elapsed);
            }
        }
    }

    info!(
        sent = stats.sent,
        failed = stats.failed,
        mean_ms = stats.mean_ms(),
        max_ms = stats.max_ms,
        "swaps submitted"
    );

    let Some(last_tx) = last_tx else {
        if count > 0 {
            return Err(eyre!("none of the {count} swaps were accepted"))
        }
        return Ok(stats)
    };

    let receipt = block_until_successful(policy, move || async move {
        provider
            .get_transaction_receipt(last_tx)
            .await?
            .ok_or_else(|| eyre!("no receipt for {last_tx} yet"))
    })
    .await?;

    if receipt.inner.status() {
        info!(tx = %last_tx, block = ?receipt.block_number, "last swap mined");
    } else {
        warn!(tx = %last_tx, block = ?receipt.block_number, "last swap reverted");
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn stats_track_outcomes_and_latency() {
        let mut stats = LoadStats::default();
        assert_eq!(stats.mean_ms(), 0);

        stats.record(true, 10);
        stats.record(true, 30);
        stats.record(false, 50);

        assert_eq!(stats.sent, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.max_ms, 50);
        assert_eq!(stats.mean_ms(), 30);
    }

    #[tokio::test]
    async fn timing_covers_the_awaited_future() {
        let (out, elapsed) = async_time_fn(|| async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            7
        })
        .await;

        assert_eq!(out, 7);
        assert!(elapsed >= 20);
    }
}
