use alloy::{primitives::U256, providers::Provider};
use tracing::{info, warn};

use crate::{config::LoadTestConfig, environment::LoadTestEnvironment, load::run_swaps};

#[derive(Debug, Clone, Default, clap::Parser)]
pub struct RunCli {
    /// number of swaps to send, overrides `swap.count`
    #[clap(short = 'n', long)]
    pub count:     Option<u64>,
    /// input amount of every swap, overrides `swap.amount_in`
    #[clap(long)]
    pub amount_in: Option<u64>
}

impl RunCli {
    pub async fn run<P: Provider + Clone>(
        &self,
        env: &LoadTestEnvironment<P>,
        config: &LoadTestConfig
    ) -> eyre::Result<()> {
        let count = self.count.unwrap_or(config.swap.count);
        let amount_in = U256::from(self.amount_in.unwrap_or(config.swap.amount_in));
        let policy = config.poll.policy();

        tokio::select! {
            stats = run_swaps(env, amount_in, count, &policy) => {
                let stats = stats?;
                info!(sent = stats.sent, failed = stats.failed, "load run finished");
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("interrupted, stopping the load run");
            }
        }

        Ok(())
    }
}
