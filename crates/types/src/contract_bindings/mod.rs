pub mod ext;

#[rustfmt::skip]
pub mod position_manager {
    alloy::sol! {
        #[derive(Debug, Copy, PartialEq, Eq, Hash)]
        struct PoolKey {
            address currency0;
            address currency1;
            uint24 fee;
            int24 tickSpacing;
            address hooks;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct MintPositionParams {
            PoolKey poolKey;
            int24 tickLower;
            int24 tickUpper;
            uint256 liquidity;
            uint128 amount0Max;
            uint128 amount1Max;
            address owner;
            bytes hookData;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct IncreaseLiquidityParams {
            uint256 tokenId;
            uint256 liquidity;
            uint128 amount0Max;
            uint128 amount1Max;
            bytes hookData;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct DecreaseLiquidityParams {
            uint256 tokenId;
            uint256 liquidity;
            uint128 amount0Min;
            uint128 amount1Min;
            bytes hookData;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct BurnPositionParams {
            uint256 tokenId;
            uint128 amount0Min;
            uint128 amount1Min;
            bytes hookData;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct SettlePairParams {
            address currency0;
            address currency1;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct TakePairParams {
            address currency0;
            address currency1;
            address recipient;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct CloseCurrencyParams {
            address currency;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct SweepParams {
            address currency;
            address to;
        }

        #[sol(rpc)]
        interface IPositionManager {
            function modifyLiquidities(bytes calldata unlockData, uint256 deadline) external payable;
            function getPoolAndPositionInfo(uint256 tokenId) external view returns (PoolKey memory poolKey, uint256 info);
            function getPositionLiquidity(uint256 tokenId) external view returns (uint128 liquidity);
            function nextTokenId() external view returns (uint256);
        }
    }
}

#[rustfmt::skip]
pub mod state_view {
    alloy::sol! {
        #[sol(rpc)]
        interface IStateView {
            function getSlot0(bytes32 poolId) external view returns (uint160 sqrtPriceX96, int24 tick, uint24 protocolFee, uint24 lpFee);
            function getLiquidity(bytes32 poolId) external view returns (uint128 liquidity);
            function getFeeGrowthInside(bytes32 poolId, int24 tickLower, int24 tickUpper) external view returns (uint256 feeGrowthInside0X128, uint256 feeGrowthInside1X128);
            function getPositionInfo(bytes32 poolId, address owner, int24 tickLower, int24 tickUpper, bytes32 salt) external view returns (uint128 liquidity, uint256 feeGrowthInside0LastX128, uint256 feeGrowthInside1LastX128);
        }
    }
}

#[rustfmt::skip]
pub mod erc20 {
    alloy::sol! {
        #[sol(rpc)]
        interface IERC20Metadata {
            function symbol() external view returns (string memory);
            function decimals() external view returns (uint8);
        }
    }
}
