//! Swap requests sent while the pool is under load.

use alloy::{
    primitives::{Address, TxHash, U160, U256},
    providers::Provider
};
use tracing::{error, trace};

use crate::{
    bindings::swap_router_02::SwapRouter02::{ExactInputSingleParams, SwapRouter02Instance},
    pool::PoolConfig
};

/// Default amount of the inbound token given to every swap.
pub const SWAP_AMOUNT_INPUT: u64 = 1_000;

/// Share of the input accepted as the minimum output.
pub const MIN_OUTPUT_RATIO: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapDirection {
    pub token_in:       Address,
    pub token_out:      Address,
    pub token_in_name:  &'static str,
    pub token_out_name: &'static str
}

/// Even nonces sell token0 for token1, odd nonces sell it back, so the pool
/// price oscillates instead of drifting.
pub fn swap_direction(nonce: u64, pool: &PoolConfig) -> SwapDirection {
    if nonce % 2 == 0 {
        SwapDirection {
            token_in:       pool.token0,
            token_out:      pool.token1,
            token_in_name:  "token0",
            token_out_name: "token1"
        }
    } else {
        SwapDirection {
            token_in:       pool.token1,
            token_out:      pool.token0,
            token_in_name:  "token1",
            token_out_name: "token0"
        }
    }
}

/// `floor(amount_in * 0.75)`, computed in floating point. Amounts above
/// 2^53 lose precision.
pub fn amount_out_minimum(amount_in: U256) -> U256 {
    let minimum = (f64::from(amount_in) * MIN_OUTPUT_RATIO).floor();
    // finite and below 2^256, so the conversion cannot fail
    U256::try_from(minimum).unwrap_or_default()
}

/// Submits an `exactInputSingle` swap with an explicit nonce, in the
/// direction picked by [`swap_direction`]. Returns once the node accepted
/// the transaction; the receipt is not awaited.
pub async fn exact_input_single_swap<P: Provider>(
    router: &SwapRouter02Instance<P>,
    pool: &PoolConfig,
    amount_in: U256,
    recipient: Address,
    nonce: u64
) -> eyre::Result<TxHash> {
    let direction = swap_direction(nonce, pool);
    let params = ExactInputSingleParams {
        tokenIn: direction.token_in,
        tokenOut: direction.token_out,
        fee: pool.fee,
        recipient,
        amountIn: amount_in,
        amountOutMinimum: amount_out_minimum(amount_in),
        // zero disables the price limit
        sqrtPriceLimitX96: U160::ZERO
    };

    let pending = router
        .exactInputSingle(params)
        .nonce(nonce)
        .send()
        .await
        .inspect_err(|e| {
            error!(
                token_in = direction.token_in_name,
                token_out = direction.token_out_name,
                %amount_in,
                nonce,
                error = %e,
                "unable to swap"
            )
        })?;

    let tx = *pending.tx_hash();
    trace!(
        token_in = direction.token_in_name,
        token_out = direction.token_out_name,
        %amount_in,
        nonce,
        ?tx,
        "swap submitted"
    );
    Ok(tx)
}

#[cfg(test)]
mod tests {
    use alloy::{
        primitives::{B256, aliases::U24},
        providers::RootProvider,
        rpc::client::RpcClient,
        transports::mock::Asserter
    };

    use super::*;

    fn pool() -> PoolConfig {
        PoolConfig::new(Address::repeat_byte(0x22), Address::repeat_byte(0x11), U24::from(3_000))
    }

    #[test]
    fn direction_alternates_with_nonce_parity() {
        let pool = pool();

        let even = swap_direction(42, &pool);
        assert_eq!((even.token_in, even.token_out), (pool.token0, pool.token1));
        assert_eq!((even.token_in_name, even.token_out_name), ("token0", "token1"));

        let odd = swap_direction(43, &pool);
        assert_eq!((odd.token_in, odd.token_out), (pool.token1, pool.token0));
        assert_eq!((odd.token_in_name, odd.token_out_name), ("token1", "token0"));

        assert_eq!(swap_direction(0, &pool), even);
    }

    #[test]
    fn minimum_output_allows_a_quarter_of_slippage() {
        assert_eq!(amount_out_minimum(U256::from(1_000)), U256::from(750));
        assert_eq!(amount_out_minimum(U256::from(7)), U256::from(5));
        assert_eq!(amount_out_minimum(U256::from(1)), U256::ZERO);
        assert_eq!(amount_out_minimum(U256::ZERO), U256::ZERO);
    }

    #[test]
    fn minimum_output_scales_past_u128() {
        let amount_in = U256::from(1) << 200;
        assert_eq!(amount_out_minimum(amount_in), U256::from(3) << 198);
        assert!(amount_out_minimum(U256::MAX) > U256::from(u128::MAX));
    }

    #[tokio::test]
    async fn swap_returns_the_submitted_hash() {
        let asserter = Asserter::new();
        let provider = RootProvider::new(RpcClient::mocked(asserter.clone()));
        let router = SwapRouter02Instance::new(Address::repeat_byte(0x33), provider);
        let hash = B256::repeat_byte(0xcd);
        asserter.push_success(&hash);

        let tx = exact_input_single_swap(&router, &pool(), U256::from(1_000), Address::repeat_byte(0x44), 7)
            .await
            .unwrap();

        assert_eq!(tx, hash);
        assert!(asserter.read_q().is_empty());
    }

    #[tokio::test]
    async fn rejected_swap_is_an_error() {
        let asserter = Asserter::new();
        let provider = RootProvider::new(RpcClient::mocked(asserter.clone()));
        let router = SwapRouter02Instance::new(Address::repeat_byte(0x33), provider);
        asserter.push_failure_msg("nonce too low");

        let err = exact_input_single_swap(&router, &pool(), U256::from(1_000), Address::repeat_byte(0x44), 0)
            .await
            .unwrap_err();

        assert!(format!("{err:#}").contains("nonce too low"));
    }
}
