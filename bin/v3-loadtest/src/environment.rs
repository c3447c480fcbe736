use alloy::{
    primitives::{Address, U256},
    providers::Provider
};
use tracing::{debug, info, warn};
use uniswap_v3::{
    Artifacts, ContractConfig, Deployer, PoolConfig, UniswapV3Suite,
    bindings::{
        i_uniswap_v3_pool::IUniswapV3Pool::IUniswapV3PoolInstance,
        swapper::Swapper::SwapperInstance
    },
    deploy_swapper_contract, deploy_uniswap_v3, setup_liquidity_pool
};

use crate::config::LoadTestConfig;

/// Everything deployed or bound before the first swap.
#[derive(Debug, Clone)]
pub struct LoadTestEnvironment<P> {
    pub sender:        Address,
    pub suite:         UniswapV3Suite<P>,
    pub token_a:       ContractConfig<SwapperInstance<P>>,
    pub token_b:       ContractConfig<SwapperInstance<P>>,
    pub pool:          PoolConfig,
    pub pool_contract: IUniswapV3PoolInstance<P>
}

impl<P> LoadTestEnvironment<P>
where
    P: Provider + Clone
{
    /// Brings up the suite, both swapper tokens and the seeded pool. Each
    /// step only sends transactions for what the config does not already
    /// know about.
    pub async fn setup(provider: P, sender: Address, config: &LoadTestConfig) -> eyre::Result<Self> {
        let artifacts = if config.artifacts_dir.is_dir() {
            Artifacts::load(&config.artifacts_dir)?
        } else {
            warn!(
                dir = ?config.artifacts_dir,
                "artifacts directory not found, every contract must have a known address"
            );
            Artifacts::default()
        };
        debug!(loaded = artifacts.len(), "contract artifacts");

        let deployer = Deployer::new(provider, artifacts, config.poll.policy());
        let owner = config.owner.unwrap_or(sender);

        let suite = deploy_uniswap_v3(&deployer, &config.known_addresses, owner).await?;
        info!(%owner, "uniswap v3 suite ready");

        let approval_policy = config.poll.approval_policy();
        let tokens = &config.tokens;
        let token_a = deploy_swapper_contract(
            &deployer,
            &suite,
            &tokens.swapper_token(&tokens.token_a),
            sender,
            tokens.token_a.address,
            &approval_policy
        )
        .await?;
        let token_b = deploy_swapper_contract(
            &deployer,
            &suite,
            &tokens.swapper_token(&tokens.token_b),
            sender,
            tokens.token_b.address,
            &approval_policy
        )
        .await?;

        let pool = PoolConfig::new(token_a.address, token_b.address, config.pool.fee_tier()?.as_u24())
            .with_reserves(U256::from(config.pool.reserve_a), U256::from(config.pool.reserve_b));
        let pool_contract = setup_liquidity_pool(&suite, &pool, sender, deployer.policy()).await?;
        info!(pool = %pool_contract.address(), token0 = %pool.token0, token1 = %pool.token1, "pool ready");

        Ok(Self { sender, suite, token_a, token_b, pool, pool_contract })
    }

    /// `config` with every address of this environment filled in, so a
    /// rerun binds instead of deploying.
    pub fn known_config(&self, config: &LoadTestConfig) -> LoadTestConfig {
        let mut known = config.clone();
        known.known_addresses = self.suite.addresses();
        known.tokens.token_a.address = self.token_a.address;
        known.tokens.token_b.address = self.token_b.address;
        known
    }
}
