use std::ops::Deref;

use alloy::primitives::{U160, U256};
use uniswap_v3_math::tick_math::{get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio};

use super::Tick;

const Q96_F64: f64 = 79_228_162_514_264_337_593_543_950_336.0;

/// Q64.96 square root of the pool price (token1 per token0, in base units).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SqrtPriceX96(U160);

impl SqrtPriceX96 {
    pub fn at_tick(tick: Tick) -> eyre::Result<Self> {
        Ok(Self::from(get_sqrt_ratio_at_tick(tick)?))
    }

    pub fn to_tick(&self) -> eyre::Result<Tick> {
        Ok(get_tick_at_sqrt_ratio(U256::from(self.0))?)
    }

    /// Approximate square root price as a float. Display and ratio math only.
    pub fn as_f64(&self) -> f64 {
        u256_to_f64(U256::from(self.0)) / Q96_F64
    }

    /// Approximate raw price (token1 base units per token0 base unit).
    pub fn price_f64(&self) -> f64 {
        let sqrt = self.as_f64();
        sqrt * sqrt
    }
}

impl Deref for SqrtPriceX96 {
    type Target = U160;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<U160> for SqrtPriceX96 {
    fn from(value: U160) -> Self {
        Self(value)
    }
}

impl From<U256> for SqrtPriceX96 {
    fn from(value: U256) -> Self {
        Self(U160::saturating_from(value))
    }
}

impl From<SqrtPriceX96> for U256 {
    fn from(value: SqrtPriceX96) -> Self {
        U256::from(value.0)
    }
}

/// Lossy conversion used wherever an integer amount has to meet a float price.
pub fn u256_to_f64(value: U256) -> f64 {
    value
        .as_limbs()
        .iter()
        .rev()
        .fold(0.0, |acc, limb| acc * 18_446_744_073_709_551_616.0 + *limb as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_zero_is_price_one() {
        let price = SqrtPriceX96::at_tick(0).unwrap();
        assert_eq!(<U256 as From<SqrtPriceX96>>::from(price), U256::from(1_u8) << 96);
        assert!((price.price_f64() - 1.0).abs() < 1e-12);
        assert_eq!(price.to_tick().unwrap(), 0);
    }

    #[test]
    fn tick_round_trips_through_sqrt_price() {
        for tick in [-887_000, -200, -1, 1, 1000, 76_000, 887_000] {
            let price = SqrtPriceX96::at_tick(tick).unwrap();
            assert_eq!(price.to_tick().unwrap(), tick);
        }
    }

    #[test]
    fn float_price_tracks_tick() {
        let price = SqrtPriceX96::at_tick(1000).unwrap();
        let expected = 1.0001_f64.powi(1000);
        assert!((price.price_f64() / expected - 1.0).abs() < 1e-9);
    }

    #[test]
    fn u256_to_f64_spans_limbs() {
        assert_eq!(u256_to_f64(U256::from(12345_u64)), 12345.0);
        let big = U256::from(1_u8) << 130;
        assert_eq!(u256_to_f64(big), 2f64.powi(130));
    }
}
