//! Typed interfaces for the contracts of the Uniswap V3 suite.
//!
//! Only the functions the deployment and load generation touch are declared.
//! Creation bytecode is not embedded; it comes from [`crate::artifacts`].

#[rustfmt::skip]
pub mod weth9 {
    alloy::sol!(
        #[allow(missing_docs)]
        #[sol(rpc)]
        #[derive(Debug, PartialEq, Eq)]
        contract WETH9 {
            function balanceOf(address owner) external view returns (uint256);
        }
    );
}
#[rustfmt::skip]
pub mod uniswap_v3_factory {
    alloy::sol!(
        #[allow(missing_docs)]
        #[sol(rpc)]
        #[derive(Debug, PartialEq, Eq)]
        contract UniswapV3Factory {
            function owner() external view returns (address);
            function feeAmountTickSpacing(uint24 fee) external view returns (int24);
            function getPool(address tokenA, address tokenB, uint24 fee) external view returns (address pool);
            function setOwner(address _owner) external;
            function enableFeeAmount(uint24 fee, int24 tickSpacing) external;
        }
    );
}
#[rustfmt::skip]
pub mod uniswap_interface_multicall {
    alloy::sol!(
        #[allow(missing_docs)]
        #[sol(rpc)]
        #[derive(Debug, PartialEq, Eq)]
        contract UniswapInterfaceMulticall {
            function getEthBalance(address addr) public view returns (uint256 balance);
        }
    );
}
#[rustfmt::skip]
pub mod proxy_admin {
    alloy::sol!(
        #[allow(missing_docs)]
        #[sol(rpc)]
        #[derive(Debug, PartialEq, Eq)]
        contract ProxyAdmin {
            function owner() external view returns (address);
            function transferOwnership(address newOwner) external;
        }
    );
}
#[rustfmt::skip]
pub mod tick_lens {
    alloy::sol!(
        #[allow(missing_docs)]
        #[sol(rpc)]
        #[derive(Debug, PartialEq, Eq)]
        contract TickLens {}
    );
}
#[rustfmt::skip]
pub mod nonfungible_token_position_descriptor {
    alloy::sol!(
        #[allow(missing_docs)]
        #[sol(rpc)]
        #[derive(Debug, PartialEq, Eq)]
        contract NonfungibleTokenPositionDescriptor {
            constructor(address _WETH9, bytes32 _nativeCurrencyLabelBytes);

            function WETH9() external view returns (address);
        }
    );
}
#[rustfmt::skip]
pub mod transparent_upgradeable_proxy {
    alloy::sol!(
        #[allow(missing_docs)]
        #[sol(rpc)]
        #[derive(Debug, PartialEq, Eq)]
        contract TransparentUpgradeableProxy {
            constructor(address _logic, address admin_, bytes memory _data) payable;
        }
    );
}
#[rustfmt::skip]
pub mod nonfungible_position_manager {
    alloy::sol!(
        #[allow(missing_docs)]
        #[sol(rpc)]
        #[derive(Debug, PartialEq, Eq)]
        contract NonfungiblePositionManager {
            struct MintParams {
                address token0;
                address token1;
                uint24 fee;
                int24 tickLower;
                int24 tickUpper;
                uint256 amount0Desired;
                uint256 amount1Desired;
                uint256 amount0Min;
                uint256 amount1Min;
                address recipient;
                uint256 deadline;
            }

            constructor(address _factory, address _WETH9, address _tokenDescriptor_);

            function baseURI() public pure returns (string memory);
            function createAndInitializePoolIfNecessary(address token0, address token1, uint24 fee, uint160 sqrtPriceX96) external payable returns (address pool);
            function mint(MintParams calldata params) external payable returns (uint256 tokenId, uint128 liquidity, uint256 amount0, uint256 amount1);
        }
    );
}
#[rustfmt::skip]
pub mod v3_migrator {
    alloy::sol!(
        #[allow(missing_docs)]
        #[sol(rpc)]
        #[derive(Debug, PartialEq, Eq)]
        contract V3Migrator {
            constructor(address _factory, address _WETH9, address _nonfungiblePositionManager);

            function WETH9() external view returns (address);
        }
    );
}
#[rustfmt::skip]
pub mod uniswap_v3_staker {
    alloy::sol!(
        #[allow(missing_docs)]
        #[sol(rpc)]
        #[derive(Debug, PartialEq, Eq)]
        contract UniswapV3Staker {
            constructor(address _factory, address _nonfungiblePositionManager, uint256 _maxIncentiveStartLeadTime, uint256 _maxIncentiveDuration);

            function factory() external view returns (address);
        }
    );
}
#[rustfmt::skip]
pub mod quoter_v2 {
    alloy::sol!(
        #[allow(missing_docs)]
        #[sol(rpc)]
        #[derive(Debug, PartialEq, Eq)]
        contract QuoterV2 {
            constructor(address _factory, address _WETH9);

            function factory() external view returns (address);
        }
    );
}
#[rustfmt::skip]
pub mod swap_router_02 {
    alloy::sol!(
        #[allow(missing_docs)]
        #[sol(rpc)]
        #[derive(Debug, PartialEq, Eq)]
        contract SwapRouter02 {
            struct ExactInputSingleParams {
                address tokenIn;
                address tokenOut;
                uint24 fee;
                address recipient;
                uint256 amountIn;
                uint256 amountOutMinimum;
                uint160 sqrtPriceLimitX96;
            }

            constructor(address _factoryV2, address factoryV3, address _positionManager, address _WETH9);

            function factory() external view returns (address);
            function exactInputSingle(ExactInputSingleParams calldata params) external payable returns (uint256 amountOut);
        }
    );
}
#[rustfmt::skip]
pub mod i_uniswap_v3_pool {
    alloy::sol!(
        #[allow(missing_docs)]
        #[sol(rpc)]
        #[derive(Debug, PartialEq, Eq)]
        interface IUniswapV3Pool {
            function slot0() external view returns (uint160 sqrtPriceX96, int24 tick, uint16 observationIndex, uint16 observationCardinality, uint16 observationCardinalityNext, uint8 feeProtocol, bool unlocked);
            function liquidity() external view returns (uint128);
            function tickSpacing() external view returns (int24);
        }
    );
}
#[rustfmt::skip]
pub mod swapper {
    alloy::sol!(
        #[allow(missing_docs)]
        #[sol(rpc)]
        #[derive(Debug, PartialEq, Eq)]
        contract Swapper {
            constructor(string memory name, string memory symbol, uint256 amount, address recipient);

            function name() external view returns (string memory);
            function allowance(address owner, address spender) external view returns (uint256);
            function approve(address spender, uint256 amount) external returns (bool);
        }
    );
}
