//! Companion amount for a one token deposit into a range that contains spot.
//!
//! The amount1/amount0 ratio a range wants at price `P` is
//! `sqrt(P) * sqrt(Pb) * (sqrt(P) - sqrt(Pa)) / (sqrt(Pb) - sqrt(P))`. It is
//! reported as a float, while the companion amount itself goes through the
//! integer liquidity identity so nothing encoded on chain ever passes through
//! an f64.

use alloy::primitives::U256;
use m00n_types::{
    pool::{PoolState, TickRange},
    token::PoolToken
};
use uniswap_v3_math::sqrt_price_math::{_get_amount_0_delta, _get_amount_1_delta};

use super::{
    liquidity::{liquidity_for_amount0, liquidity_for_amount1, range_sqrt_prices},
    tick::tick_to_price
};
use crate::MathError;

/// The paired side of a one token deposit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Companion {
    /// Token the companion amount is denominated in.
    pub token:          PoolToken,
    pub amount:         U256,
    /// amount1 / amount0 in raw base units
    pub ratio_1_over_0: f64
}

/// Raw amount1 / amount0 ratio the range needs at the pool's current price.
pub fn amount_ratio(state: &PoolState, range: &TickRange) -> Result<f64, MathError> {
    let failed = |reason: String| MathError::InRangeAmountCalcFailed {
        current_tick: state.tick,
        tick_lower: range.lower,
        tick_upper: range.upper,
        reason
    };

    let sqrt_p = state.sqrt_price_x96.as_f64();
    let sqrt_pa = tick_to_price(range.lower).sqrt();
    let sqrt_pb = tick_to_price(range.upper).sqrt();

    if sqrt_pb <= sqrt_p {
        return Err(failed(format!("upper sqrt price {sqrt_pb} is not above spot {sqrt_p}")))
    }

    let ratio = sqrt_p * sqrt_pb * (sqrt_p - sqrt_pa) / (sqrt_pb - sqrt_p);
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(failed(format!("amount ratio {ratio} is not positive")))
    }
    Ok(ratio)
}

/// Given `amount` of `deposit`, the amount of the other token that keeps the
/// deposit balanced in `range`. A companion that rounds to zero becomes one
/// base unit.
pub fn solve_companion(
    state: &PoolState,
    range: &TickRange,
    deposit: PoolToken,
    amount: U256
) -> Result<Companion, MathError> {
    let ratio_1_over_0 = amount_ratio(state, range)?;

    let failed = |reason: String| MathError::InRangeAmountCalcFailed {
        current_tick: state.tick,
        tick_lower: range.lower,
        tick_upper: range.upper,
        reason
    };

    let (sqrt_lower, sqrt_upper) = range_sqrt_prices(range)?;
    let sqrt_price = U256::from(*state.sqrt_price_x96);
    // the float guard above works on approximations, recheck on the exact grid
    if sqrt_price <= sqrt_lower || sqrt_price >= sqrt_upper {
        return Err(failed(format!(
            "spot {sqrt_price} is not strictly inside ({sqrt_lower}, {sqrt_upper})"
        )))
    }

    let (token, exact) = match deposit {
        PoolToken::Token0 => {
            let liquidity = liquidity_for_amount0(sqrt_price, sqrt_upper, amount)
                .map_err(|e| failed(e.to_string()))?;
            let amount1 = _get_amount_1_delta(sqrt_lower, sqrt_price, liquidity, true)
                .map_err(|e| failed(e.to_string()))?;
            (PoolToken::Token1, amount1)
        }
        PoolToken::Token1 => {
            let liquidity = liquidity_for_amount1(sqrt_lower, sqrt_price, amount)
                .map_err(|e| failed(e.to_string()))?;
            let amount0 = _get_amount_0_delta(sqrt_price, sqrt_upper, liquidity, true)
                .map_err(|e| failed(e.to_string()))?;
            (PoolToken::Token0, amount0)
        }
    };
    let amount = exact.max(U256::from(1_u8));

    tracing::trace!(?deposit, ?token, %amount, ratio_1_over_0, "solved companion amount");
    Ok(Companion { token, amount, ratio_1_over_0 })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    use super::*;
    use crate::cfmm::uniswap::liquidity::build_position;

    fn ether(n: u64) -> U256 {
        U256::from(n) * U256::from(10_u64.pow(18))
    }

    #[test]
    fn ratio_matches_closed_form_at_centre() {
        // symmetric range around tick 0: sqrt(Pa) * sqrt(Pb) == 1 so the ratio is 1
        let state = PoolState::at_tick(0, 0).unwrap();
        let range = TickRange::new(-2000, 2000, 200).unwrap();
        let ratio = amount_ratio(&state, &range).unwrap();
        assert!((ratio - 1.0).abs() < 1e-9, "ratio {ratio}");
    }

    #[test]
    fn companion_tracks_the_float_ratio() {
        let state = PoolState::at_tick(1000, 0).unwrap();
        let range = TickRange::new(-1200, 80_200, 200).unwrap();
        let companion = solve_companion(&state, &range, PoolToken::Token0, ether(1000)).unwrap();
        assert_eq!(companion.token, PoolToken::Token1);

        let expected = 1000e18 * companion.ratio_1_over_0;
        let got = m00n_types::pool::u256_to_f64(companion.amount);
        assert!((got / expected - 1.0).abs() < 1e-6, "{got} vs {expected}");
    }

    #[test]
    fn companion_fits_the_built_position() {
        let state = PoolState::at_tick(1000, 0).unwrap();
        let range = TickRange::new(0, 2000, 200).unwrap();
        let companion = solve_companion(&state, &range, PoolToken::Token1, ether(3)).unwrap();
        assert_eq!(companion.token, PoolToken::Token0);

        let built = build_position(&state, &range, companion.amount, ether(3)).unwrap();
        // both sides are close to fully used, neither side strands the other
        assert!(built.amount1 + U256::from(10_u8) >= ether(3));
        assert!(built.amount0 + U256::from(10_u8) >= companion.amount);
    }

    #[test]
    fn spot_at_or_above_upper_fails() {
        let state = PoolState::at_tick(2000, 0).unwrap();
        let range = TickRange::new(0, 2000, 200).unwrap();
        let err = amount_ratio(&state, &range).unwrap_err();
        assert_matches!(
            err,
            MathError::InRangeAmountCalcFailed { current_tick: 2000, tick_lower: 0, tick_upper: 2000, .. }
        );
        assert_eq!(err.code(), "in_range_amount_calc_failed");
    }

    #[test]
    fn spot_below_lower_fails() {
        let state = PoolState::at_tick(-400, 0).unwrap();
        let range = TickRange::new(0, 2000, 200).unwrap();
        assert_matches!(
            solve_companion(&state, &range, PoolToken::Token0, ether(1)),
            Err(MathError::InRangeAmountCalcFailed { .. })
        );
    }

    #[test]
    fn dust_companion_is_floored_to_one() {
        // one wei of token1 buys zero liquidity this far above the lower bound
        let state = PoolState::at_tick(200_000, 0).unwrap();
        let range = TickRange::new(0, 400_000, 200).unwrap();
        let companion = solve_companion(&state, &range, PoolToken::Token1, U256::from(1_u8)).unwrap();
        assert_eq!(companion.token, PoolToken::Token0);
        assert_eq!(companion.amount, U256::from(1_u8));
    }

    #[test]
    fn tick_to_price_is_the_sqrt_grid() {
        let state = PoolState::at_tick(1000, 0).unwrap();
        assert!((state.sqrt_price_x96.as_f64() - tick_to_price(1000).sqrt()).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn positive_deposit_never_gets_a_zero_companion(
            current in -50_000_i32..50_000,
            below in 1_i32..200,
            above in 1_i32..200,
            amount in 1_u128..u128::MAX / 2,
            token0 in any::<bool>()
        ) {
            let spacing = 60;
            let lower = (current.div_euclid(spacing) - below) * spacing;
            let upper = (current.div_euclid(spacing) + above) * spacing;
            let state = PoolState::at_tick(current, 0).unwrap();
            let range = TickRange::new(lower, upper, spacing).unwrap();
            prop_assume!(U256::from(*state.sqrt_price_x96) > range_sqrt_prices(&range).unwrap().0);

            let deposit = if token0 { PoolToken::Token0 } else { PoolToken::Token1 };
            match solve_companion(&state, &range, deposit, U256::from(amount)) {
                Ok(companion) => prop_assert!(companion.amount > U256::ZERO),
                // very large deposits can overflow uint128 liquidity
                Err(MathError::InRangeAmountCalcFailed { reason, .. }) => {
                    prop_assert!(reason.contains("overflows"), "{}", reason)
                }
                Err(other) => prop_assert!(false, "unexpected {other:?}")
            }
        }
    }
}
