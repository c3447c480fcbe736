//! Creating, initializing and seeding the liquidity pool under load.

use std::time::Duration;

use alloy::{
    eips::BlockNumberOrTag,
    primitives::{
        Address, TxHash, U160, U256,
        aliases::{I24, U24}
    },
    providers::Provider
};
use eyre::eyre;
use tracing::{debug, error, info, trace};
use uniswap_v3_math::tick_math::MAX_TICK;

use crate::{
    bindings::{
        i_uniswap_v3_pool::IUniswapV3Pool::{self, IUniswapV3PoolInstance},
        nonfungible_position_manager::NonfungiblePositionManager::{
            MintParams, NonfungiblePositionManagerInstance
        }
    },
    poll::{RetryPolicy, block_until_successful},
    sqrt_price::SqrtPriceX96,
    suite::UniswapV3Suite
};

/// Amount of each token seeded into a fresh pool.
pub const POOL_RESERVE_FOR_ONE_TOKEN: u64 = 1_000_000_000_000;

/// How long a liquidity mint stays valid after the latest block.
pub const MINT_DEADLINE: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("both reserves must be non-zero to price a pool")]
    EmptyReserve,
    #[error("initial sqrt price does not fit in 160 bits")]
    PriceOverflow,
    #[error("tick spacing must be positive, got {0}")]
    InvalidTickSpacing(i32),
    #[error("{0}% is not a Uniswap V3 fee tier")]
    UnknownFeeTier(f64)
}

/// Fee tiers a pool can be created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeeTier {
    /// 0.01%, enabled by the suite deployment.
    OneBasisPoint,
    /// 0.05%
    Stable,
    /// 0.3%
    Standard,
    /// 1%
    Exotic
}

impl FeeTier {
    /// Fee in hundredths of a basis point, as the contracts expect it.
    pub const fn fee(&self) -> u32 {
        match self {
            Self::OneBasisPoint => 100,
            Self::Stable => 500,
            Self::Standard => 3_000,
            Self::Exotic => 10_000
        }
    }

    pub fn as_u24(&self) -> U24 {
        U24::from(self.fee())
    }

    /// Maps a percentage such as `0.3` to its tier.
    pub fn from_percentage(percentage: f64) -> Result<Self, PoolError> {
        [Self::OneBasisPoint, Self::Stable, Self::Standard, Self::Exotic]
            .into_iter()
            .find(|tier| tier.percentage() == percentage)
            .ok_or(PoolError::UnknownFeeTier(percentage))
    }

    pub const fn percentage(&self) -> f64 {
        match self {
            Self::OneBasisPoint => 0.01,
            Self::Stable => 0.05,
            Self::Standard => 0.3,
            Self::Exotic => 1.0
        }
    }
}

/// The token pair and seed reserves of the pool under load. `token0` always
/// sorts before `token1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub token0:    Address,
    pub token1:    Address,
    pub reserve_a: U256,
    pub reserve_b: U256,
    pub fee:       U24
}

impl PoolConfig {
    pub fn new(token_a: Address, token_b: Address, fee: U24) -> Self {
        // Byte order is the order of the lowercase hex strings and the one
        // the factory enforces.
        let (token0, token1) = if token_a < token_b { (token_a, token_b) } else { (token_b, token_a) };

        Self {
            token0,
            token1,
            reserve_a: U256::from(POOL_RESERVE_FOR_ONE_TOKEN),
            reserve_b: U256::from(POOL_RESERVE_FOR_ONE_TOKEN),
            fee
        }
    }

    pub fn with_reserves(mut self, reserve_a: U256, reserve_b: U256) -> Self {
        self.reserve_a = reserve_a;
        self.reserve_b = reserve_b;
        self
    }

    /// Amount requested for each side of the initial position.
    pub fn pool_size(&self) -> U256 {
        self.reserve_a.saturating_add(self.reserve_b)
    }
}

/// Snapshot of a pool's `slot0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot0 {
    pub sqrt_price_x96:               U160,
    pub tick:                         i32,
    pub observation_index:            u16,
    pub observation_cardinality:      u16,
    pub observation_cardinality_next: u16,
    pub fee_protocol:                 u8,
    pub unlocked:                     bool
}

impl From<IUniswapV3Pool::slot0Return> for Slot0 {
    fn from(value: IUniswapV3Pool::slot0Return) -> Self {
        Self {
            sqrt_price_x96:               value.sqrtPriceX96,
            tick:                         value.tick.as_i32(),
            observation_index:            value.observationIndex,
            observation_cardinality:      value.observationCardinality,
            observation_cardinality_next: value.observationCardinalityNext,
            fee_protocol:                 value.feeProtocol,
            unlocked:                     value.unlocked
        }
    }
}

/// Widest `(lower, upper)` tick range usable with `tick_spacing`.
pub fn full_range_ticks(tick_spacing: i32) -> Result<(i32, i32), PoolError> {
    if tick_spacing <= 0 {
        return Err(PoolError::InvalidTickSpacing(tick_spacing))
    }

    let upper = (MAX_TICK / tick_spacing) * tick_spacing;
    Ok((-upper, upper))
}

/// Mint of `pool_size` of both tokens over the full tick range, valid for
/// [`MINT_DEADLINE`] after `timestamp`. Minimums equal the desired amounts.
pub fn full_range_mint_params(
    pool: &PoolConfig,
    tick_spacing: i32,
    timestamp: u64,
    recipient: Address
) -> Result<MintParams, PoolError> {
    let (tick_lower, tick_upper) = full_range_ticks(tick_spacing)?;
    trace!(tick_spacing, tick_lower, tick_upper, "full range ticks");

    let pool_size = pool.pool_size();
    Ok(MintParams {
        token0: pool.token0,
        token1: pool.token1,
        fee: pool.fee,
        tickLower: I24::unchecked_from(tick_lower),
        tickUpper: I24::unchecked_from(tick_upper),
        amount0Desired: pool_size,
        amount1Desired: pool_size,
        amount0Min: pool_size,
        amount1Min: pool_size,
        recipient,
        deadline: U256::from(timestamp.saturating_add(MINT_DEADLINE.as_secs()))
    })
}

/// Creates and initializes the pool if needed, seeds it with liquidity if it
/// has none, and returns a handle to it.
pub async fn setup_liquidity_pool<P>(
    suite: &UniswapV3Suite<P>,
    pool: &PoolConfig,
    recipient: Address,
    policy: &RetryPolicy
) -> eyre::Result<IUniswapV3PoolInstance<P>>
where
    P: Provider + Clone
{
    let pool_contract = create_pool(suite, pool, policy).await?;

    let (slot0, liquidity) = pool_state(&pool_contract).await?;
    trace!(?slot0, liquidity, "pool state");

    if liquidity == 0 {
        provide_liquidity(&suite.position_manager.contract, &pool_contract, pool, recipient, policy).await?;
    } else {
        debug!(liquidity, "liquidity already provided to the pool");
    }

    Ok(pool_contract)
}

/// Creates and initializes the pool at the price implied by the reserves,
/// then waits for the factory to report its address.
pub async fn create_pool<P>(
    suite: &UniswapV3Suite<P>,
    pool: &PoolConfig,
    policy: &RetryPolicy
) -> eyre::Result<IUniswapV3PoolInstance<P>>
where
    P: Provider + Clone
{
    let sqrt_price = SqrtPriceX96::from_reserves(pool.reserve_a, pool.reserve_b)?;
    let initial_tick = sqrt_price.to_tick()?;
    let pending = suite
        .position_manager
        .contract
        .createAndInitializePoolIfNecessary(pool.token0, pool.token1, pool.fee, *sqrt_price)
        .send()
        .await
        .inspect_err(|e| error!(error = %e, "unable to create and initialize the pool"))?;
    debug!(
        fee = %pool.fee,
        ?sqrt_price,
        initial_tick,
        tx = ?pending.tx_hash(),
        "pool created and initialized"
    );

    let factory = &suite.factory_v3.contract;
    let (token0, token1, fee) = (pool.token0, pool.token1, pool.fee);
    let pool_address = block_until_successful(policy, move || async move {
        let address = factory.getPool(token0, token1, fee).call().await?;
        if address.is_zero() {
            return Err(eyre!("pool not deployed yet"))
        }
        eyre::Ok(address)
    })
    .await
    .inspect_err(|e| error!(error = %e, "unable to retrieve the address of the pool"))?;

    info!(%pool_address, "pool instantiated");
    Ok(IUniswapV3Pool::new(pool_address, factory.provider().clone()))
}

pub async fn pool_state<P: Provider>(pool: &IUniswapV3PoolInstance<P>) -> eyre::Result<(Slot0, u128)> {
    let slot0 = pool
        .slot0()
        .call()
        .await
        .inspect_err(|e| error!(error = %e, "unable to get the pool's slot0"))?;
    let liquidity = pool
        .liquidity()
        .call()
        .await
        .inspect_err(|e| error!(error = %e, "unable to get the pool's liquidity"))?;

    Ok((slot0.into(), liquidity))
}

/// Mints a full range position for `recipient` and waits until the pool
/// reports non-zero liquidity.
pub async fn provide_liquidity<P>(
    position_manager: &NonfungiblePositionManagerInstance<P>,
    pool_contract: &IUniswapV3PoolInstance<P>,
    pool: &PoolConfig,
    recipient: Address,
    policy: &RetryPolicy
) -> eyre::Result<TxHash>
where
    P: Provider + Clone
{
    let tick_spacing = pool_contract
        .tickSpacing()
        .call()
        .await
        .inspect_err(|e| error!(error = %e, "unable to get the tick spacing"))?;
    let timestamp = latest_block_timestamp(pool_contract.provider()).await?;
    let params = full_range_mint_params(pool, tick_spacing.as_i32(), timestamp, recipient)?;
    let (pool_size, deadline) = (params.amount0Desired, params.deadline);

    let pending = position_manager
        .mint(params)
        .send()
        .await
        .inspect_err(|e| error!(error = %e, "unable to mint the liquidity position"))?;
    let tx = *pending.tx_hash();
    debug!(?tx, %pool_size, %deadline, "liquidity mint submitted");

    let liquidity = block_until_successful(policy, move || async move {
        let liquidity = pool_contract.liquidity().call().await?;
        if liquidity == 0 {
            return Err(eyre!("pool has no liquidity yet"))
        }
        eyre::Ok(liquidity)
    })
    .await
    .inspect_err(|e| error!(error = %e, "liquidity never showed up in the pool"))?;

    info!(liquidity, "liquidity provided to the pool");
    Ok(tx)
}

pub async fn latest_block_timestamp<P: Provider>(provider: &P) -> eyre::Result<u64> {
    let number = provider.get_block_number().await?;
    let block = provider
        .get_block_by_number(BlockNumberOrTag::Number(number))
        .await?
        .ok_or_else(|| eyre!("block {number} not found"))?;

    Ok(block.header.timestamp)
}
