// Uniswap v4 concentrated liquidity planning. Token amounts stay in U256 and
// u128 end to end; f64 is only used for prices and ratios.

pub mod fees;
pub mod liquidity;
pub mod range;
pub mod solver;
pub mod tick;

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, Address, U256};
    use m00n_types::{
        contract_bindings::{ext::PoolKeyExt, position_manager::PoolKey},
        pool::{FeeGrowthInside, PoolState, PositionDetails, TickRange},
        token::{PairAsset, PairOrientation, PoolToken}
    };

    use super::{
        fees::compute_fees,
        liquidity::{amounts_for_liquidity, build_position},
        range::{ensure_single_sided, range_from_usd_band, UsdBand},
        solver::solve_companion
    };

    const SPACING: i32 = 200;

    fn base_quote_pair() -> (PoolKey, PairOrientation) {
        let base = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        let quote = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
        let key = PoolKey::new_sorted(base, quote, 3000, SPACING, Address::ZERO).unwrap();
        let pair = PairOrientation::new(&key, base, 18, quote, 18).unwrap();
        (key, pair)
    }

    fn thousand_tokens() -> U256 {
        U256::from(1000_u64) * U256::from(10_u64.pow(18))
    }

    #[test]
    fn sky_deposit_above_spot_needs_no_quote() {
        let (_, pair) = base_quote_pair();
        let state = PoolState::at_tick(1000, 0).unwrap();
        let range =
            range_from_usd_band(UsdBand::new(2000.0, 3000.0), 1.0, &pair, SPACING).unwrap();
        assert!(range.lower >= 1000 && range.upper > range.lower);

        ensure_single_sided(&range, state.tick, PairAsset::Base, &pair).unwrap();
        let built = build_position(&state, &range, thousand_tokens(), U256::ZERO).unwrap();
        assert!(built.liquidity > 0);
        assert_eq!(built.amount1, U256::ZERO);
    }

    #[test]
    fn straddling_band_needs_a_companion_quote_amount() {
        let (_, pair) = base_quote_pair();
        let state = PoolState::at_tick(1000, 0).unwrap();
        let range = range_from_usd_band(UsdBand::new(0.9, 3000.0), 1.0, &pair, SPACING).unwrap();
        assert!(range.lower < 1000 && range.upper > 1000);

        let companion =
            solve_companion(&state, &range, pair.pool_token(PairAsset::Base), thousand_tokens())
                .unwrap();
        assert_eq!(companion.token, PoolToken::Token1);
        assert!(companion.amount > U256::ZERO);
    }

    #[test]
    fn equal_bounds_are_an_invalid_range() {
        let (_, pair) = base_quote_pair();
        let err = range_from_usd_band(UsdBand::new(2000.0, 2000.0), 1.0, &pair, SPACING)
            .unwrap_err();
        assert_eq!(err.code(), "invalid_range");
    }

    #[test]
    fn settled_fees_are_zero() {
        let (key, _) = base_quote_pair();
        let five = U256::from(5_u8);
        let position = PositionDetails {
            token_id: U256::from(1_u8),
            pool_key: key,
            range: TickRange { lower: 0, upper: 2000 },
            liquidity: 1_000_000,
            fee_growth_inside0_last_x128: five,
            fee_growth_inside1_last_x128: U256::ZERO
        };
        let current =
            FeeGrowthInside { fee_growth_inside0_x128: five, fee_growth_inside1_x128: U256::ZERO };
        assert_eq!(compute_fees(&position, &current).unclaimed0, U256::ZERO);
    }

    #[test]
    fn mint_side_rounds_up_and_burn_side_rounds_down() {
        let state = PoolState::at_tick(1000, 0).unwrap();
        let range = TickRange::new(-1000, 3000, 200).unwrap();
        let liquidity = 50_000_000_000;

        let (up0, up1) = amounts_for_liquidity(&state, &range, liquidity, true).unwrap();
        let (down0, down1) = amounts_for_liquidity(&state, &range, liquidity, false).unwrap();

        assert!(up0 >= down0 && up0 - down0 <= U256::from(1_u8));
        assert!(up1 >= down1 && up1 - down1 <= U256::from(1_u8));
        assert!(down0 > U256::ZERO && down1 > U256::ZERO);
    }

    #[test]
    fn built_position_burns_back_to_at_most_what_it_used() {
        let state = PoolState::at_tick(1000, 0).unwrap();
        let range = TickRange::new(-1000, 3000, 200).unwrap();
        let amount0 = U256::from(10_u128.pow(21));
        let amount1 = U256::from(10_u128.pow(21));

        let built = build_position(&state, &range, amount0, amount1).unwrap();
        let (burn0, burn1) = amounts_for_liquidity(&state, &range, built.liquidity, false).unwrap();

        assert!(burn0 <= built.amount0 && built.amount0 - burn0 <= U256::from(1_u8));
        assert!(burn1 <= built.amount1 && built.amount1 - burn1 <= U256::from(1_u8));
        assert!(built.amount0 <= amount0 + U256::from(1_u8));
        assert!(built.amount1 <= amount1 + U256::from(1_u8));
    }
}
