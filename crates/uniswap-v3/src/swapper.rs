//! The two ERC20 tokens traded during the load test.

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
    sol_types::SolConstructor
};
use eyre::eyre;
use tracing::{debug, error, info, trace};

use crate::{
    bindings::swapper::Swapper::{self, SwapperInstance},
    deploy::{ContractConfig, Deployer, deploy_or_instantiate},
    poll::{RetryPolicy, block_until_successful},
    suite::UniswapV3Suite
};

/// Tokens minted to the recipient when a swapper token is deployed.
pub const MINT_AMOUNT: u64 = 999_999_999_999_999_999;

/// Allowance granted to every spender. High enough that approvals never
/// need renewing during a run.
pub const ALLOWANCE_AMOUNT: u64 = 1_000_000_000_000_000;

/// Name, symbol and initial supply of a swapper token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapperToken {
    pub name:        String,
    pub symbol:      String,
    pub mint_amount: U256
}

impl SwapperToken {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self { name: name.into(), symbol: symbol.into(), mint_amount: U256::from(MINT_AMOUNT) }
    }
}

/// Deploys (or binds to `known`) a swapper token minting its supply to
/// `recipient`, then lets the position manager and the swap router spend it.
pub async fn deploy_swapper_contract<P>(
    deployer: &Deployer<P>,
    suite: &UniswapV3Suite<P>,
    token: &SwapperToken,
    recipient: Address,
    known: Address,
    approval_policy: &RetryPolicy
) -> eyre::Result<ContractConfig<SwapperInstance<P>>>
where
    P: Provider + Clone
{
    let provider = deployer.provider();
    let spenders = [
        ("NonfungiblePositionManager", suite.position_manager.address),
        ("SwapRouter02", suite.swap_router02.address)
    ];
    let token_name = token.name.as_str();

    let swapper = deploy_or_instantiate(
        known,
        async {
            let address = deployer
                .deploy::<SwapperInstance<P>>(
                    Swapper::constructorCall {
                        name: token.name.clone(),
                        symbol: token.symbol.clone(),
                        amount: token.mint_amount,
                        recipient
                    }
                    .abi_encode()
                )
                .await?;
            debug!(token = token_name, amount = %token.mint_amount, %recipient, "minted tokens");
            eyre::Ok(address)
        },
        |address| Ok(Swapper::new(address, provider.clone())),
        move |swapper: SwapperInstance<P>| async move {
            approve_swapper_spendings(&swapper, recipient, &spenders, approval_policy).await
        },
        deployer.policy()
    )
    .await?;

    info!(token = token_name, address = %swapper.address, "swapper token ready");
    Ok(swapper)
}

/// Grants every `(name, spender)` an allowance of [`ALLOWANCE_AMOUNT`] over
/// `owner`'s tokens. Spenders that already hold a non-zero allowance are left
/// alone. Each approval is confirmed by polling the allowance under `policy`.
pub async fn approve_swapper_spendings<P: Provider>(
    swapper: &SwapperInstance<P>,
    owner: Address,
    spenders: &[(&str, Address)],
    policy: &RetryPolicy
) -> eyre::Result<()> {
    let token = swapper.name().call().await?;
    let amount = U256::from(ALLOWANCE_AMOUNT);

    for &(spender_name, spender) in spenders {
        let current = swapper.allowance(owner, spender).call().await?;
        if !current.is_zero() {
            debug!(token = %token, spender_name, %spender, %current, "skipping allowance setting");
            continue
        }

        let pending = swapper
            .approve(spender, amount)
            .send()
            .await
            .inspect_err(|e| {
                error!(token = %token, spender_name, %spender, %amount, error = %e, "unable to set the allowance")
            })?;
        trace!(token = %token, spender_name, tx = ?pending.tx_hash(), "approval submitted");

        block_until_successful(policy, move || async move {
            let allowance = swapper.allowance(owner, spender).call().await?;
            if allowance.is_zero() {
                return Err(eyre!("allowance is set to zero"))
            }
            eyre::Ok(())
        })
        .await
        .inspect_err(|e| {
            error!(token = %token, spender_name, %spender, error = %e, "unable to verify that the allowance has been set")
        })?;
        debug!(token = %token, spender_name, %spender, %amount, "allowance set");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alloy::{
        primitives::{B256, Bytes, address},
        providers::RootProvider,
        rpc::client::RpcClient,
        sol_types::SolValue,
        transports::mock::Asserter
    };

    use super::*;

    const TOKEN: Address = address!("0x00000000000000000000000000000000000000e1");
    const OWNER: Address = address!("0x00000000000000000000000000000000000000e2");
    const ROUTER: Address = address!("0x00000000000000000000000000000000000000e3");

    fn mocked_swapper() -> (SwapperInstance<RootProvider>, Asserter) {
        let asserter = Asserter::new();
        let provider = RootProvider::new(RpcClient::mocked(asserter.clone()));
        (Swapper::new(TOKEN, provider), asserter)
    }

    fn encoded_name(name: &str) -> Bytes {
        (name.to_string(),).abi_encode_params().into()
    }

    fn encoded_amount(amount: u64) -> Bytes {
        U256::from(amount).abi_encode().into()
    }

    #[tokio::test]
    async fn existing_allowance_sends_no_approval() {
        let (swapper, asserter) = mocked_swapper();
        asserter.push_success(&encoded_name("SwapperA"));
        asserter.push_success(&encoded_amount(ALLOWANCE_AMOUNT));

        // an approval would need a reply that is not queued and fail the call
        approve_swapper_spendings(
            &swapper,
            OWNER,
            &[("SwapRouter02", ROUTER)],
            &RetryPolicy::attempts(Duration::from_millis(1), 1)
        )
        .await
        .unwrap();

        assert!(asserter.read_q().is_empty());
    }

    #[tokio::test]
    async fn missing_allowance_is_approved_then_confirmed() {
        let (swapper, asserter) = mocked_swapper();
        asserter.push_success(&encoded_name("SwapperA"));
        asserter.push_success(&encoded_amount(0));
        asserter.push_success(&B256::repeat_byte(0xab));
        asserter.push_success(&encoded_amount(0));
        asserter.push_success(&encoded_amount(ALLOWANCE_AMOUNT));

        approve_swapper_spendings(
            &swapper,
            OWNER,
            &[("SwapRouter02", ROUTER)],
            &RetryPolicy::attempts(Duration::from_millis(1), 3)
        )
        .await
        .unwrap();

        assert!(asserter.read_q().is_empty());
    }

    #[tokio::test]
    async fn unconfirmed_approval_is_an_error() {
        let (swapper, asserter) = mocked_swapper();
        asserter.push_success(&encoded_name("SwapperA"));
        asserter.push_success(&encoded_amount(0));
        asserter.push_success(&B256::repeat_byte(0xab));
        asserter.push_success(&encoded_amount(0));
        asserter.push_success(&encoded_amount(0));

        let err = approve_swapper_spendings(
            &swapper,
            OWNER,
            &[("SwapRouter02", ROUTER)],
            &RetryPolicy::attempts(Duration::from_millis(1), 2)
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<crate::poll::PollError>(),
            Some(crate::poll::PollError::Exhausted { attempts: 2, .. })
        ));
    }

    #[test]
    fn default_token_supply() {
        let token = SwapperToken::new("SwapperA", "SA");
        assert_eq!(token.mint_amount, U256::from(999_999_999_999_999_999u64));
        assert!(U256::from(ALLOWANCE_AMOUNT) < token.mint_amount);
    }
}
