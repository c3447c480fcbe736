//! The full Uniswap V3 suite: deployment order, wiring between contracts and
//! the idempotent administrative steps.

use alloy::{
    primitives::{
        Address, B256, Bytes, TxHash, U256,
        aliases::{I24, U24}
    },
    providers::Provider,
    sol_types::SolConstructor
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{
    artifacts::NFT_DESCRIPTOR_LIB_PLACEHOLDER,
    bindings::{
        nonfungible_position_manager::NonfungiblePositionManager::{
            self, NonfungiblePositionManagerInstance
        },
        nonfungible_token_position_descriptor::NonfungibleTokenPositionDescriptor::{
            self, NonfungibleTokenPositionDescriptorInstance
        },
        proxy_admin::ProxyAdmin::{self, ProxyAdminInstance},
        quoter_v2::QuoterV2::{self, QuoterV2Instance},
        swap_router_02::SwapRouter02::{self, SwapRouter02Instance},
        tick_lens::TickLens::{self, TickLensInstance},
        transparent_upgradeable_proxy::TransparentUpgradeableProxy::{
            self, TransparentUpgradeableProxyInstance
        },
        uniswap_interface_multicall::UniswapInterfaceMulticall::{
            self, UniswapInterfaceMulticallInstance
        },
        uniswap_v3_factory::UniswapV3Factory::{self, UniswapV3FactoryInstance},
        uniswap_v3_staker::UniswapV3Staker::{self, UniswapV3StakerInstance},
        v3_migrator::V3Migrator::{self, V3MigratorInstance},
        weth9::WETH9::{self, WETH9Instance}
    },
    deploy::{Contract, ContractConfig, Deployer, NftDescriptorLibrary, deploy_or_instantiate},
    transaction::ConfirmedTransaction
};

/// Fee amount enabled on top of the factory defaults, in hundredths of a
/// basis point.
pub const ONE_BP_FEE: u32 = 100;
pub const ONE_BP_TICK_SPACING: i32 = 1;

/// Staker limits: incentives start at most 30 days ahead and last at most
/// two years.
pub const MAX_INCENTIVE_START_LEAD_TIME: u64 = 30 * 24 * 60 * 60;
pub const MAX_INCENTIVE_DURATION: u64 = 2 * 365 * 24 * 60 * 60;

pub const NATIVE_CURRENCY_LABEL: &[u8] = b"ETH";

/// Addresses of every suite contract. A zero address means "deploy it".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniswapV3Addresses {
    pub factory_v3:                    Address,
    pub multicall:                     Address,
    pub proxy_admin:                   Address,
    pub tick_lens:                     Address,
    pub nft_descriptor_lib:            Address,
    pub nft_position_descriptor:       Address,
    pub transparent_upgradeable_proxy: Address,
    pub position_manager:              Address,
    pub migrator:                      Address,
    pub staker:                        Address,
    pub quoter_v2:                     Address,
    pub swap_router02:                 Address,
    pub weth9:                         Address
}

impl UniswapV3Addresses {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Address)> {
        [
            ("factory_v3", self.factory_v3),
            ("multicall", self.multicall),
            ("proxy_admin", self.proxy_admin),
            ("tick_lens", self.tick_lens),
            ("nft_descriptor_lib", self.nft_descriptor_lib),
            ("nft_position_descriptor", self.nft_position_descriptor),
            ("transparent_upgradeable_proxy", self.transparent_upgradeable_proxy),
            ("position_manager", self.position_manager),
            ("migrator", self.migrator),
            ("staker", self.staker),
            ("quoter_v2", self.quoter_v2),
            ("swap_router02", self.swap_router02),
            ("weth9", self.weth9)
        ]
        .into_iter()
    }

    /// True when nothing needs deploying.
    pub fn is_complete(&self) -> bool {
        self.iter().all(|(_, address)| !address.is_zero())
    }
}

/// Every contract of a deployed (or bound) suite.
#[derive(Debug, Clone)]
pub struct UniswapV3Suite<P> {
    pub weth9:                         ContractConfig<WETH9Instance<P>>,
    pub factory_v3:                    ContractConfig<UniswapV3FactoryInstance<P>>,
    pub multicall:                     ContractConfig<UniswapInterfaceMulticallInstance<P>>,
    pub proxy_admin:                   ContractConfig<ProxyAdminInstance<P>>,
    pub tick_lens:                     ContractConfig<TickLensInstance<P>>,
    pub nft_descriptor_lib:            ContractConfig<NftDescriptorLibrary>,
    pub nft_position_descriptor:       ContractConfig<NonfungibleTokenPositionDescriptorInstance<P>>,
    pub transparent_upgradeable_proxy: ContractConfig<TransparentUpgradeableProxyInstance<P>>,
    pub position_manager:              ContractConfig<NonfungiblePositionManagerInstance<P>>,
    pub migrator:                      ContractConfig<V3MigratorInstance<P>>,
    pub staker:                        ContractConfig<UniswapV3StakerInstance<P>>,
    pub quoter_v2:                     ContractConfig<QuoterV2Instance<P>>,
    pub swap_router02:                 ContractConfig<SwapRouter02Instance<P>>
}

impl<P> UniswapV3Suite<P> {
    pub fn addresses(&self) -> UniswapV3Addresses {
        UniswapV3Addresses {
            factory_v3:                    self.factory_v3.address,
            multicall:                     self.multicall.address,
            proxy_admin:                   self.proxy_admin.address,
            tick_lens:                     self.tick_lens.address,
            nft_descriptor_lib:            self.nft_descriptor_lib.address,
            nft_position_descriptor:       self.nft_position_descriptor.address,
            transparent_upgradeable_proxy: self.transparent_upgradeable_proxy.address,
            position_manager:              self.position_manager.address,
            migrator:                      self.migrator.address,
            staker:                        self.staker.address,
            quoter_v2:                     self.quoter_v2.address,
            swap_router02:                 self.swap_router02.address,
            weth9:                         self.weth9.address
        }
    }
}

/// Reads and sets the tick spacing of a fee amount.
pub trait FeeAmountRegistry {
    #[allow(async_fn_in_trait)]
    async fn tick_spacing_of(&self, fee: U24) -> eyre::Result<I24>;
    #[allow(async_fn_in_trait)]
    async fn enable_fee(&self, fee: U24, tick_spacing: I24) -> eyre::Result<TxHash>;
}

/// A contract with a single owner that can be handed over.
pub trait Ownable: Contract {
    #[allow(async_fn_in_trait)]
    async fn current_owner(&self) -> eyre::Result<Address>;
    #[allow(async_fn_in_trait)]
    async fn hand_over(&self, new_owner: Address) -> eyre::Result<TxHash>;
}

impl<P> FeeAmountRegistry for UniswapV3FactoryInstance<P>
where
    P: Provider + Clone
{
    async fn tick_spacing_of(&self, fee: U24) -> eyre::Result<I24> {
        Ok(self.feeAmountTickSpacing(fee).call().await?)
    }

    async fn enable_fee(&self, fee: U24, tick_spacing: I24) -> eyre::Result<TxHash> {
        self.enableFeeAmount(fee, tick_spacing).send_confirmed().await
    }
}

impl<P> Ownable for UniswapV3FactoryInstance<P>
where
    P: Provider + Clone
{
    async fn current_owner(&self) -> eyre::Result<Address> {
        Ok(self.owner().call().await?)
    }

    async fn hand_over(&self, new_owner: Address) -> eyre::Result<TxHash> {
        self.setOwner(new_owner).send_confirmed().await
    }
}

impl<P> Ownable for ProxyAdminInstance<P>
where
    P: Provider + Clone
{
    async fn current_owner(&self) -> eyre::Result<Address> {
        Ok(self.owner().call().await?)
    }

    async fn hand_over(&self, new_owner: Address) -> eyre::Result<TxHash> {
        self.transferOwnership(new_owner).send_confirmed().await
    }
}

/// Makes sure `fee` is enabled with `tick_spacing`. Returns the transaction
/// hash if one had to be sent.
pub async fn enable_fee_amount<R: FeeAmountRegistry>(
    registry: &R,
    fee: U24,
    tick_spacing: I24
) -> eyre::Result<Option<TxHash>> {
    let current = registry.tick_spacing_of(fee).await?;
    if current == tick_spacing {
        debug!(%fee, %tick_spacing, "fee amount already enabled");
        return Ok(None)
    }

    let tx = registry
        .enable_fee(fee, tick_spacing)
        .await
        .inspect_err(|e| error!(%fee, %tick_spacing, error = %e, "unable to enable fee amount"))?;
    debug!(%fee, %tick_spacing, ?tx, "fee amount enabled");
    Ok(Some(tx))
}

/// Hands `contract` over to `new_owner` unless it already owns it. Returns
/// the transaction hash if one had to be sent.
pub async fn ensure_owner<O: Ownable>(contract: &O, new_owner: Address) -> eyre::Result<Option<TxHash>> {
    let name = O::NAME;
    let current = contract.current_owner().await?;
    if current == new_owner {
        debug!(name, owner = %new_owner, "contract already owned by this address");
        return Ok(None)
    }

    let tx = contract
        .hand_over(new_owner)
        .await
        .inspect_err(|e| error!(name, owner = %new_owner, error = %e, "unable to transfer ownership"))?;
    debug!(name, from = %current, to = %new_owner, ?tx, "ownership transferred");
    Ok(Some(tx))
}

/// Deploys or binds every contract of the suite, in dependency order, then
/// enables the 1bp fee amount and hands factory and proxy admin ownership to
/// `owner`. Known addresses are bound instead of redeployed, and every
/// administrative step is skipped when it is already in effect.
pub async fn deploy_uniswap_v3<P>(
    deployer: &Deployer<P>,
    known: &UniswapV3Addresses,
    owner: Address
) -> eyre::Result<UniswapV3Suite<P>>
where
    P: Provider + Clone
{
    let provider = deployer.provider();
    let policy = deployer.policy();

    debug!("Step 1: WETH9 deployment");
    let weth9 = deploy_or_instantiate(
        known.weth9,
        deployer.deploy::<WETH9Instance<P>>(Vec::new()),
        |address| Ok(WETH9::new(address, provider.clone())),
        |weth9: WETH9Instance<P>| async move {
            weth9.balanceOf(Address::ZERO).call().await?;
            eyre::Ok(())
        },
        policy
    )
    .await?;

    debug!("Step 2: UniswapV3Factory deployment");
    let factory_v3 = deploy_or_instantiate(
        known.factory_v3,
        deployer.deploy::<UniswapV3FactoryInstance<P>>(Vec::new()),
        |address| Ok(UniswapV3Factory::new(address, provider.clone())),
        |factory: UniswapV3FactoryInstance<P>| async move {
            factory.owner().call().await?;
            eyre::Ok(())
        },
        policy
    )
    .await?;

    debug!("Step 3: enable fee amount");
    enable_fee_amount(
        &factory_v3.contract,
        U24::from(ONE_BP_FEE),
        I24::unchecked_from(ONE_BP_TICK_SPACING)
    )
    .await?;

    debug!("Step 4: UniswapInterfaceMulticall deployment");
    let multicall = deploy_or_instantiate(
        known.multicall,
        deployer.deploy::<UniswapInterfaceMulticallInstance<P>>(Vec::new()),
        |address| Ok(UniswapInterfaceMulticall::new(address, provider.clone())),
        |multicall: UniswapInterfaceMulticallInstance<P>| async move {
            multicall.getEthBalance(Address::ZERO).call().await?;
            eyre::Ok(())
        },
        policy
    )
    .await?;

    debug!("Step 5: ProxyAdmin deployment");
    let proxy_admin = deploy_or_instantiate(
        known.proxy_admin,
        deployer.deploy::<ProxyAdminInstance<P>>(Vec::new()),
        |address| Ok(ProxyAdmin::new(address, provider.clone())),
        |proxy_admin: ProxyAdminInstance<P>| async move {
            proxy_admin.owner().call().await?;
            eyre::Ok(())
        },
        policy
    )
    .await?;

    // TickLens and the NFTDescriptor library have nothing to call before a
    // pool exists, so their canaries only look for code.
    debug!("Step 6: TickLens deployment");
    let tick_lens = deploy_or_instantiate(
        known.tick_lens,
        deployer.deploy::<TickLensInstance<P>>(Vec::new()),
        |address| Ok(TickLens::new(address, provider.clone())),
        |tick_lens: TickLensInstance<P>| async move { has_code(provider, *tick_lens.address()).await },
        policy
    )
    .await?;

    debug!("Step 7: NFTDescriptor library deployment");
    let nft_descriptor_lib = deploy_or_instantiate(
        known.nft_descriptor_lib,
        deployer.deploy::<NftDescriptorLibrary>(Vec::new()),
        |address| Ok(NftDescriptorLibrary(address)),
        |library: NftDescriptorLibrary| async move { has_code(provider, library.0).await },
        policy
    )
    .await?;

    debug!("Step 8: NonfungibleTokenPositionDescriptor deployment");
    let nft_position_descriptor = deploy_or_instantiate(
        known.nft_position_descriptor,
        deployer.deploy_linked::<NonfungibleTokenPositionDescriptorInstance<P>>(
            NFT_DESCRIPTOR_LIB_PLACEHOLDER,
            nft_descriptor_lib.address,
            NonfungibleTokenPositionDescriptor::constructorCall {
                _WETH9:                    weth9.address,
                _nativeCurrencyLabelBytes: B256::right_padding_from(NATIVE_CURRENCY_LABEL)
            }
            .abi_encode()
        ),
        |address| Ok(NonfungibleTokenPositionDescriptor::new(address, provider.clone())),
        |descriptor: NonfungibleTokenPositionDescriptorInstance<P>| async move {
            descriptor.WETH9().call().await?;
            eyre::Ok(())
        },
        policy
    )
    .await?;

    // Once ownership of the proxy admin moved, calls through the proxy revert
    // for us, so only look for code here as well.
    debug!("Step 9: TransparentUpgradeableProxy deployment");
    let transparent_upgradeable_proxy = deploy_or_instantiate(
        known.transparent_upgradeable_proxy,
        deployer.deploy::<TransparentUpgradeableProxyInstance<P>>(
            TransparentUpgradeableProxy::constructorCall {
                _logic: nft_position_descriptor.address,
                admin_: proxy_admin.address,
                _data:  Bytes::new()
            }
            .abi_encode()
        ),
        |address| Ok(TransparentUpgradeableProxy::new(address, provider.clone())),
        |proxy: TransparentUpgradeableProxyInstance<P>| async move {
            has_code(provider, *proxy.address()).await
        },
        policy
    )
    .await?;

    debug!("Step 10: NonfungiblePositionManager deployment");
    let position_manager = deploy_or_instantiate(
        known.position_manager,
        deployer.deploy::<NonfungiblePositionManagerInstance<P>>(
            NonfungiblePositionManager::constructorCall {
                _factory:          factory_v3.address,
                _WETH9:            weth9.address,
                _tokenDescriptor_: transparent_upgradeable_proxy.address
            }
            .abi_encode()
        ),
        |address| Ok(NonfungiblePositionManager::new(address, provider.clone())),
        |position_manager: NonfungiblePositionManagerInstance<P>| async move {
            position_manager.baseURI().call().await?;
            eyre::Ok(())
        },
        policy
    )
    .await?;

    debug!("Step 11: V3Migrator deployment");
    let migrator = deploy_or_instantiate(
        known.migrator,
        deployer.deploy::<V3MigratorInstance<P>>(
            V3Migrator::constructorCall {
                _factory:                    factory_v3.address,
                _WETH9:                      weth9.address,
                _nonfungiblePositionManager: position_manager.address
            }
            .abi_encode()
        ),
        |address| Ok(V3Migrator::new(address, provider.clone())),
        |migrator: V3MigratorInstance<P>| async move {
            migrator.WETH9().call().await?;
            eyre::Ok(())
        },
        policy
    )
    .await?;

    debug!("Step 12: transfer UniswapV3Factory ownership");
    ensure_owner(&factory_v3.contract, owner).await?;

    debug!("Step 13: UniswapV3Staker deployment");
    let staker = deploy_or_instantiate(
        known.staker,
        deployer.deploy::<UniswapV3StakerInstance<P>>(
            UniswapV3Staker::constructorCall {
                _factory:                    factory_v3.address,
                _nonfungiblePositionManager: position_manager.address,
                _maxIncentiveStartLeadTime:  U256::from(MAX_INCENTIVE_START_LEAD_TIME),
                _maxIncentiveDuration:       U256::from(MAX_INCENTIVE_DURATION)
            }
            .abi_encode()
        ),
        |address| Ok(UniswapV3Staker::new(address, provider.clone())),
        |staker: UniswapV3StakerInstance<P>| async move {
            staker.factory().call().await?;
            eyre::Ok(())
        },
        policy
    )
    .await?;

    debug!("Step 14: QuoterV2 deployment");
    let quoter_v2 = deploy_or_instantiate(
        known.quoter_v2,
        deployer.deploy::<QuoterV2Instance<P>>(
            QuoterV2::constructorCall { _factory: factory_v3.address, _WETH9: weth9.address }
                .abi_encode()
        ),
        |address| Ok(QuoterV2::new(address, provider.clone())),
        |quoter: QuoterV2Instance<P>| async move {
            quoter.factory().call().await?;
            eyre::Ok(())
        },
        policy
    )
    .await?;

    // No V2 factory is deployed, so the router gets the zero address for it.
    debug!("Step 15: SwapRouter02 deployment");
    let swap_router02 = deploy_or_instantiate(
        known.swap_router02,
        deployer.deploy::<SwapRouter02Instance<P>>(
            SwapRouter02::constructorCall {
                _factoryV2:       Address::ZERO,
                factoryV3:        factory_v3.address,
                _positionManager: position_manager.address,
                _WETH9:           weth9.address
            }
            .abi_encode()
        ),
        |address| Ok(SwapRouter02::new(address, provider.clone())),
        |router: SwapRouter02Instance<P>| async move {
            router.factory().call().await?;
            eyre::Ok(())
        },
        policy
    )
    .await?;

    debug!("Step 16: transfer ProxyAdmin ownership");
    ensure_owner(&proxy_admin.contract, owner).await?;

    let suite = UniswapV3Suite {
        weth9,
        factory_v3,
        multicall,
        proxy_admin,
        tick_lens,
        nft_descriptor_lib,
        nft_position_descriptor,
        transparent_upgradeable_proxy,
        position_manager,
        migrator,
        staker,
        quoter_v2,
        swap_router02
    };
    info!(addresses = ?suite.addresses(), "Uniswap V3 suite ready");
    Ok(suite)
}

async fn has_code<P: Provider>(provider: &P, address: Address) -> eyre::Result<()> {
    if provider.get_code_at(address).await?.is_empty() {
        eyre::bail!("no code at {address}")
    }
    Ok(())
}
