use alloy::primitives::U256;
use m00n_types::pool::{u256_to_f64, FeeGrowthInside, PositionDetails};
use uniswap_v3_math::full_math::mul_div;

const Q128: U256 = U256::from_limbs([0, 0, 1, 0]);

/// Fees a position has earned, in raw base units of each pool token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeAccrual {
    /// Fee growth inside the range since the pool started, at the position's
    /// current liquidity.
    pub lifetime0:  U256,
    pub lifetime1:  U256,
    /// Owed since the position last settled.
    pub unclaimed0: U256,
    pub unclaimed1: U256
}

fn share(growth_x128: U256, liquidity: u128) -> U256 {
    mul_div(growth_x128, U256::from(liquidity), Q128).unwrap_or(U256::MAX)
}

/// `lifetime = current * L / 2^128` and `unclaimed = max(0, current - last) *
/// L / 2^128` for each token. A current value behind the last snapshot (stale
/// read) clamps to zero.
pub fn compute_fees(position: &PositionDetails, current: &FeeGrowthInside) -> FeeAccrual {
    let liquidity = position.liquidity;
    let delta0 = current
        .fee_growth_inside0_x128
        .saturating_sub(position.fee_growth_inside0_last_x128);
    let delta1 = current
        .fee_growth_inside1_x128
        .saturating_sub(position.fee_growth_inside1_last_x128);

    FeeAccrual {
        lifetime0:  share(current.fee_growth_inside0_x128, liquidity),
        lifetime1:  share(current.fee_growth_inside1_x128, liquidity),
        unclaimed0: share(delta0, liquidity),
        unclaimed1: share(delta1, liquidity)
    }
}

/// What the USD valuation needs to know about one token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenValuation {
    pub usd_price: f64,
    pub decimals:  u8
}

impl TokenValuation {
    pub fn usd(&self, amount: U256) -> f64 {
        u256_to_f64(amount) / 10f64.powi(self.decimals as i32) * self.usd_price
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeUsd {
    pub lifetime:  f64,
    pub unclaimed: f64
}

impl FeeAccrual {
    /// USD totals, or `None` when either token cannot be valued. Missing data
    /// is never reported as zero fees.
    pub fn value_usd(
        &self,
        token0: Option<TokenValuation>,
        token1: Option<TokenValuation>
    ) -> Option<FeeUsd> {
        let (token0, token1) = (token0?, token1?);
        Some(FeeUsd {
            lifetime:  token0.usd(self.lifetime0) + token1.usd(self.lifetime1),
            unclaimed: token0.usd(self.unclaimed0) + token1.usd(self.unclaimed1)
        })
    }
}
