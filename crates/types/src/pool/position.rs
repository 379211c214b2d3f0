use alloy::primitives::U256;

use super::TickRange;
use crate::contract_bindings::position_manager::PoolKey;

/// An existing position as read back from the position manager and state
/// view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionDetails {
    pub token_id:                     U256,
    pub pool_key:                     PoolKey,
    pub range:                        TickRange,
    pub liquidity:                    u128,
    pub fee_growth_inside0_last_x128: U256,
    pub fee_growth_inside1_last_x128: U256
}

/// The pool's current fee growth inside a tick range, per unit of liquidity
/// (Q128.128).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeGrowthInside {
    pub fee_growth_inside0_x128: U256,
    pub fee_growth_inside1_x128: U256
}
