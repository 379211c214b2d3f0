use alloy::primitives::Address;

use crate::{
    contract_bindings::position_manager::PoolKey,
    pool::PoolState
};

/// Spot price of a pool in human units, as used for USD routing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairWithPrice {
    pub token0:         Address,
    pub token1:         Address,
    /// token1 per token0, decimal adjusted
    pub price_1_over_0: f64
}

impl PairWithPrice {
    pub fn from_pool_state(key: &PoolKey, state: &PoolState, decimals0: u8, decimals1: u8) -> Self {
        let shift = 10f64.powi(decimals0 as i32 - decimals1 as i32);
        Self { token0: key.currency0, token1: key.currency1, price_1_over_0: state.price() * shift }
    }

    /// The token on the other side of `token`, if `token` is in the pair.
    pub fn counterpart(&self, token: Address) -> Option<Address> {
        if token == self.token0 {
            Some(self.token1)
        } else if token == self.token1 {
            Some(self.token0)
        } else {
            None
        }
    }

    /// How many units of the counterpart one unit of `token` is worth.
    pub fn price_of(&self, token: Address) -> Option<f64> {
        if token == self.token0 {
            Some(self.price_1_over_0)
        } else if token == self.token1 {
            Some(self.price_1_over_0.recip())
        } else {
            None
        }
    }
}
