use super::{SqrtPriceX96, Tick};

/// Point in time view of a pool's slot0 and active liquidity. Fetched once per
/// request and never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolState {
    pub sqrt_price_x96: SqrtPriceX96,
    pub tick:           Tick,
    pub liquidity:      u128
}

impl PoolState {
    pub fn new(sqrt_price_x96: SqrtPriceX96, tick: Tick, liquidity: u128) -> Self {
        Self { sqrt_price_x96, tick, liquidity }
    }

    /// Snapshot sitting exactly on `tick`.
    pub fn at_tick(tick: Tick, liquidity: u128) -> eyre::Result<Self> {
        Ok(Self { sqrt_price_x96: SqrtPriceX96::at_tick(tick)?, tick, liquidity })
    }

    /// Raw price, token1 base units per token0 base unit.
    pub fn price(&self) -> f64 {
        self.sqrt_price_x96.price_f64()
    }
}
