//! Deploy-or-bind for a single contract.

use std::future::Future;

use alloy::{
    contract::RawCallBuilder,
    network::Ethereum,
    primitives::{Address, Bytes},
    providers::Provider
};
use eyre::WrapErr;
use tracing::{debug, error, info};

use crate::{
    artifacts::Artifacts,
    bindings::{
        i_uniswap_v3_pool::IUniswapV3Pool::IUniswapV3PoolInstance,
        nonfungible_position_manager::NonfungiblePositionManager::NonfungiblePositionManagerInstance,
        nonfungible_token_position_descriptor::NonfungibleTokenPositionDescriptor::NonfungibleTokenPositionDescriptorInstance,
        proxy_admin::ProxyAdmin::ProxyAdminInstance, quoter_v2::QuoterV2::QuoterV2Instance,
        swap_router_02::SwapRouter02::SwapRouter02Instance, swapper::Swapper::SwapperInstance,
        tick_lens::TickLens::TickLensInstance,
        transparent_upgradeable_proxy::TransparentUpgradeableProxy::TransparentUpgradeableProxyInstance,
        uniswap_interface_multicall::UniswapInterfaceMulticall::UniswapInterfaceMulticallInstance,
        uniswap_v3_factory::UniswapV3Factory::UniswapV3FactoryInstance,
        uniswap_v3_staker::UniswapV3Staker::UniswapV3StakerInstance,
        v3_migrator::V3Migrator::V3MigratorInstance, weth9::WETH9::WETH9Instance
    },
    poll::{RetryPolicy, block_until_successful}
};

/// A handle to a deployed contract. `NAME` doubles as the artifact name the
/// creation bytecode is loaded under.
pub trait Contract: Clone {
    const NAME: &'static str;
}

macro_rules! contract_names {
    ($($instance:ident => $name:literal),*) => {
        $(
            impl<P: Clone> Contract for $instance<P> {
                const NAME: &'static str = $name;
            }
        )*
    };
}

contract_names!(
    WETH9Instance => "WETH9",
    UniswapV3FactoryInstance => "UniswapV3Factory",
    UniswapInterfaceMulticallInstance => "UniswapInterfaceMulticall",
    ProxyAdminInstance => "ProxyAdmin",
    TickLensInstance => "TickLens",
    NonfungibleTokenPositionDescriptorInstance => "NonfungibleTokenPositionDescriptor",
    TransparentUpgradeableProxyInstance => "TransparentUpgradeableProxy",
    NonfungiblePositionManagerInstance => "NonfungiblePositionManager",
    V3MigratorInstance => "V3Migrator",
    UniswapV3StakerInstance => "UniswapV3Staker",
    QuoterV2Instance => "QuoterV2",
    SwapRouter02Instance => "SwapRouter02",
    IUniswapV3PoolInstance => "UniswapV3Pool",
    SwapperInstance => "Swapper"
);

/// `NFTDescriptor` is a library without callable functions, so the handle
/// is just its address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NftDescriptorLibrary(pub Address);

impl Contract for NftDescriptorLibrary {
    const NAME: &'static str = "NFTDescriptor";
}

/// A contract that has been deployed or bound and answered its canary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractConfig<C> {
    pub address:  Address,
    pub contract: C
}

/// Deploys `C` unless `known` is non-zero, binds the handle and then blocks
/// until `canary` succeeds against it.
///
/// `deploy` is only polled when a deployment is needed, so an already known
/// address never submits a transaction.
pub async fn deploy_or_instantiate<C, D, I, F, Fut>(
    known: Address,
    deploy: D,
    instantiate: I,
    canary: F,
    policy: &RetryPolicy
) -> eyre::Result<ContractConfig<C>>
where
    C: Contract,
    D: Future<Output = eyre::Result<Address>>,
    I: FnOnce(Address) -> eyre::Result<C>,
    F: Fn(C) -> Fut,
    Fut: Future<Output = eyre::Result<()>>
{
    let name = C::NAME;
    let address = if known.is_zero() {
        debug!(name, "deploying contract");
        let address = deploy
            .await
            .inspect_err(|e| error!(name, error = %e, "unable to deploy contract"))?;
        info!(name, %address, "contract deployed");
        address
    } else {
        debug!(name, address = %known, "contract address already known");
        known
    };

    let contract = instantiate(address)
        .inspect_err(|e| error!(name, %address, error = %e, "unable to instantiate contract"))?;
    debug!(name, %address, "contract instantiated");

    block_until_successful(policy, || canary(contract.clone()))
        .await
        .inspect_err(|e| error!(name, %address, error = %e, "contract is not ready"))
        .wrap_err_with(|| format!("{name} at {address} did not answer its canary call"))?;
    debug!(name, %address, "contract is ready");

    Ok(ContractConfig { address, contract })
}

/// Sends creation transactions built from loaded artifacts.
#[derive(Debug, Clone)]
pub struct Deployer<P> {
    provider:  P,
    artifacts: Artifacts,
    policy:    RetryPolicy
}

impl<P> Deployer<P>
where
    P: Provider + Clone
{
    pub fn new(provider: P, artifacts: Artifacts, policy: RetryPolicy) -> Self {
        Self { provider, artifacts, policy }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Deploys the artifact registered under `C::NAME` with the given ABI
    /// encoded constructor arguments appended.
    pub async fn deploy<C: Contract>(&self, constructor_args: Vec<u8>) -> eyre::Result<Address> {
        let bytecode = self.artifacts.bytecode(C::NAME)?.to_bytes()?;
        self.deploy_code(bytecode, constructor_args).await
    }

    /// Like [`Self::deploy`], but first links `library` into every occurrence
    /// of `placeholder`. Linking errors surface before anything is sent.
    pub async fn deploy_linked<C: Contract>(
        &self,
        placeholder: &str,
        library: Address,
        constructor_args: Vec<u8>
    ) -> eyre::Result<Address> {
        let bytecode = self.artifacts.bytecode(C::NAME)?.link(placeholder, library)?;
        debug!(name = C::NAME, %library, "linked library into bytecode");
        self.deploy_code(bytecode, constructor_args).await
    }

    pub async fn deploy_code(&self, bytecode: Bytes, constructor_args: Vec<u8>) -> eyre::Result<Address> {
        let mut code = bytecode.to_vec();
        code.extend(constructor_args);

        let address = RawCallBuilder::<_, Ethereum>::new_raw_deploy(self.provider.clone(), code.into())
            .deploy()
            .await?;
        Ok(address)
    }
}
