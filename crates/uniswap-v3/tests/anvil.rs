// End to end run against a local anvil node. Needs `anvil` on the PATH and
// the compiled suite artifacts in the directory named by
// `UNISWAP_V3_ARTIFACTS`.

use std::{collections::HashSet, time::Duration};

use alloy::{
    node_bindings::{Anvil, AnvilInstance},
    primitives::{Address, U256},
    providers::Provider,
    signers::local::PrivateKeySigner
};
use tracing::Level;
use uniswap_v3::{
    Artifacts, Deployer, FeeTier, PoolConfig, RetryPolicy, SwapperToken, UniswapV3Addresses,
    WalletProviderRpc, block_until_successful, connect, deploy_swapper_contract,
    deploy_uniswap_v3, exact_input_single_swap, pool::pool_state, setup_liquidity_pool
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_line_number(true)
        .with_file(true)
        .try_init();
}

async fn spawn_anvil() -> eyre::Result<(AnvilInstance, WalletProviderRpc, Address)> {
    let anvil = Anvil::new()
        .arg("--code-size-limit")
        .arg("393216")
        .try_spawn()?;
    let sk: PrivateKeySigner = anvil.keys()[0].clone().into();
    let sender = sk.address();
    let rpc = connect(&anvil.endpoint(), sk).await?;

    Ok((anvil, rpc, sender))
}

fn fast_policy() -> RetryPolicy {
    RetryPolicy::deadline(Duration::from_millis(100), Duration::from_secs(30))
}

#[ignore = "needs anvil and compiled artifacts in UNISWAP_V3_ARTIFACTS"]
#[tokio::test(flavor = "multi_thread")]
async fn deploys_suite_pool_and_swaps_idempotently() {
    init_tracing();
    let artifacts_dir = std::env::var("UNISWAP_V3_ARTIFACTS").expect("UNISWAP_V3_ARTIFACTS is not set");
    let artifacts = Artifacts::load(&artifacts_dir).unwrap();

    let (_anvil, provider, sender) = spawn_anvil().await.unwrap();
    let deployer = Deployer::new(provider.clone(), artifacts, fast_policy());

    let suite = deploy_uniswap_v3(&deployer, &UniswapV3Addresses::default(), sender)
        .await
        .unwrap();
    let addresses = suite.addresses();
    assert!(addresses.is_complete());
    let distinct: HashSet<_> = addresses.iter().map(|(_, address)| address).collect();
    assert_eq!(distinct.len(), 13);

    let approvals = RetryPolicy::attempts(Duration::from_millis(100), 24);
    let token_a = deploy_swapper_contract(
        &deployer,
        &suite,
        &SwapperToken::new("SwapperA", "SA"),
        sender,
        Address::ZERO,
        &approvals
    )
    .await
    .unwrap();
    let token_b = deploy_swapper_contract(
        &deployer,
        &suite,
        &SwapperToken::new("SwapperB", "SB"),
        sender,
        Address::ZERO,
        &approvals
    )
    .await
    .unwrap();

    let pool = PoolConfig::new(token_a.address, token_b.address, FeeTier::Standard.as_u24());
    let pool_contract = setup_liquidity_pool(&suite, &pool, sender, &fast_policy())
        .await
        .unwrap();
    let (slot0, liquidity) = pool_state(&pool_contract).await.unwrap();
    assert_eq!(slot0.tick, 0);
    assert!(liquidity > 0);

    // Everything is in place now, so a second pass binds known addresses and
    // skips every administrative step.
    let nonce_before = provider.get_transaction_count(sender).pending().await.unwrap();
    let rebound = deploy_uniswap_v3(&deployer, &addresses, sender).await.unwrap();
    assert_eq!(rebound.addresses(), addresses);
    deploy_swapper_contract(
        &deployer,
        &suite,
        &SwapperToken::new("SwapperA", "SA"),
        sender,
        token_a.address,
        &approvals
    )
    .await
    .unwrap();
    setup_liquidity_pool(&rebound, &pool, sender, &fast_policy())
        .await
        .unwrap();
    let nonce_after = provider.get_transaction_count(sender).pending().await.unwrap();
    // Only `createAndInitializePoolIfNecessary` is re-sent; it is a no-op on
    // an initialized pool.
    assert_eq!(nonce_after, nonce_before + 1);

    let nonce = provider.get_transaction_count(sender).pending().await.unwrap();
    let tx = exact_input_single_swap(
        &suite.swap_router02.contract,
        &pool,
        U256::from(1_000),
        sender,
        nonce
    )
    .await
    .unwrap();
    let receipt = block_until_successful(&fast_policy(), || async {
        provider
            .get_transaction_receipt(tx)
            .await?
            .ok_or_else(|| eyre::eyre!("swap not mined yet"))
    })
    .await
    .unwrap();
    assert!(receipt.inner.status());
}
