//! Deploys a complete Uniswap V3 suite, bootstraps one liquidity pool and
//! generates swap traffic against it.
//!
//! Every step is idempotent: contracts with a known address are bound
//! instead of deployed, and administrative calls are only sent when the
//! on-chain state differs from the desired one.

pub mod artifacts;
pub mod bindings;
pub mod deploy;
pub mod poll;
pub mod pool;
pub mod provider;
pub mod sqrt_price;
pub mod suite;
pub mod swap;
pub mod swapper;
pub mod transaction;

pub use artifacts::{Artifacts, Bytecode, link_library};
pub use deploy::{Contract, ContractConfig, Deployer, deploy_or_instantiate};
pub use poll::{PollError, RetryLimit, RetryPolicy, block_until_successful};
pub use pool::{FeeTier, PoolConfig, Slot0, create_pool, provide_liquidity, setup_liquidity_pool};
pub use provider::{WalletProviderRpc, connect};
pub use sqrt_price::SqrtPriceX96;
pub use suite::{UniswapV3Addresses, UniswapV3Suite, deploy_uniswap_v3};
pub use swap::{SwapDirection, exact_input_single_swap, swap_direction};
pub use swapper::{SwapperToken, approve_swapper_spendings, deploy_swapper_contract};
