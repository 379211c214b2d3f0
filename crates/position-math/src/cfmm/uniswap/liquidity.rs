use alloy::primitives::U256;
use eyre::{eyre, Context};
use m00n_types::pool::{PoolState, RangePlacement, SqrtPriceX96, TickRange};
use uniswap_v3_math::{
    full_math::mul_div,
    sqrt_price_math::{_get_amount_0_delta, _get_amount_1_delta}
};

use crate::MathError;

const Q96: U256 = U256::from_limbs([0, 1 << 32, 0, 0]);

/// Liquidity minted from a pool snapshot and desired amounts, and the amounts
/// the pool will actually pull for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltPosition {
    pub liquidity: u128,
    pub amount0:   U256,
    pub amount1:   U256
}

fn to_liquidity(value: U256) -> eyre::Result<u128> {
    u128::try_from(value).map_err(|_| eyre!("liquidity {value} overflows uint128"))
}

fn ordered(sqrt_a: U256, sqrt_b: U256) -> (U256, U256) {
    if sqrt_a > sqrt_b {
        (sqrt_b, sqrt_a)
    } else {
        (sqrt_a, sqrt_b)
    }
}

/// `amount0 * sqrt_a * sqrt_b / (sqrt_b - sqrt_a)`, rounded down.
pub fn liquidity_for_amount0(sqrt_a: U256, sqrt_b: U256, amount0: U256) -> eyre::Result<u128> {
    let (sqrt_a, sqrt_b) = ordered(sqrt_a, sqrt_b);
    if sqrt_a == sqrt_b {
        return Err(eyre!("zero width price range at {sqrt_a}"))
    }
    let intermediate = mul_div(sqrt_a, sqrt_b, Q96)?;
    to_liquidity(mul_div(amount0, intermediate, sqrt_b - sqrt_a)?)
}

/// `amount1 / (sqrt_b - sqrt_a)`, rounded down.
pub fn liquidity_for_amount1(sqrt_a: U256, sqrt_b: U256, amount1: U256) -> eyre::Result<u128> {
    let (sqrt_a, sqrt_b) = ordered(sqrt_a, sqrt_b);
    if sqrt_a == sqrt_b {
        return Err(eyre!("zero width price range at {sqrt_a}"))
    }
    to_liquidity(mul_div(amount1, Q96, sqrt_b - sqrt_a)?)
}

/// Largest liquidity both amounts can pay for at `sqrt_price`.
pub fn liquidity_for_amounts(
    sqrt_price: U256,
    sqrt_a: U256,
    sqrt_b: U256,
    amount0: U256,
    amount1: U256
) -> eyre::Result<u128> {
    let (sqrt_a, sqrt_b) = ordered(sqrt_a, sqrt_b);

    if sqrt_price <= sqrt_a {
        liquidity_for_amount0(sqrt_a, sqrt_b, amount0)
    } else if sqrt_price < sqrt_b {
        let liquidity0 = liquidity_for_amount0(sqrt_price, sqrt_b, amount0)?;
        let liquidity1 = liquidity_for_amount1(sqrt_a, sqrt_price, amount1)?;
        Ok(liquidity0.min(liquidity1))
    } else {
        liquidity_for_amount1(sqrt_a, sqrt_b, amount1)
    }
}

pub(crate) fn range_sqrt_prices(range: &TickRange) -> Result<(U256, U256), MathError> {
    let lower = SqrtPriceX96::at_tick(range.lower).map_err(|_| MathError::TickOutOfRange(range.lower))?;
    let upper = SqrtPriceX96::at_tick(range.upper).map_err(|_| MathError::TickOutOfRange(range.upper))?;
    Ok((lower.into(), upper.into()))
}

/// Token amounts backing `liquidity` at the pool's current tick. Mints round
/// up, burns round down.
pub fn amounts_for_liquidity(
    state: &PoolState,
    range: &TickRange,
    liquidity: u128,
    round_up: bool
) -> eyre::Result<(U256, U256)> {
    let (sqrt_lower, sqrt_upper) = range_sqrt_prices(range)?;
    let sqrt_price = U256::from(*state.sqrt_price_x96);

    let amounts = match range.placement(state.tick) {
        RangePlacement::AboveCurrent => {
            (_get_amount_0_delta(sqrt_lower, sqrt_upper, liquidity, round_up)?, U256::ZERO)
        }
        RangePlacement::InRange => (
            _get_amount_0_delta(sqrt_price, sqrt_upper, liquidity, round_up)?,
            _get_amount_1_delta(sqrt_lower, sqrt_price, liquidity, round_up)?
        ),
        RangePlacement::BelowCurrent => {
            (U256::ZERO, _get_amount_1_delta(sqrt_lower, sqrt_upper, liquidity, round_up)?)
        }
    };
    Ok(amounts)
}

/// Liquidity for the desired amounts and what minting it costs.
pub fn build_position(
    state: &PoolState,
    range: &TickRange,
    amount0: U256,
    amount1: U256
) -> Result<BuiltPosition, MathError> {
    let failed = |reason: String| MathError::PositionBuildFailed {
        current_tick: state.tick,
        tick_lower: range.lower,
        tick_upper: range.upper,
        amount0,
        amount1,
        reason
    };

    let (sqrt_lower, sqrt_upper) = range_sqrt_prices(range)?;
    if sqrt_lower >= sqrt_upper {
        return Err(failed("range has no width".to_string()))
    }

    let liquidity = liquidity_for_amounts(
        U256::from(*state.sqrt_price_x96),
        sqrt_lower,
        sqrt_upper,
        amount0,
        amount1
    )
    .map_err(|e| failed(e.to_string()))?;

    if liquidity == 0 {
        return Err(MathError::ZeroLiquidity {
            tick_lower: range.lower,
            tick_upper: range.upper,
            amount0,
            amount1
        })
    }

    let (used0, used1) = amounts_for_liquidity(state, range, liquidity, true)
        .wrap_err_with(|| format!("amounts for liquidity {liquidity}"))
        .map_err(|e| failed(format!("{e:#}")))?;

    tracing::debug!(
        tick_lower = range.lower,
        tick_upper = range.upper,
        current_tick = state.tick,
        liquidity,
        %used0,
        %used1,
        "built position"
    );

    Ok(BuiltPosition { liquidity, amount0: used0, amount1: used1 })
}
