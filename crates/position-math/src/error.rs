use alloy::primitives::U256;
use m00n_types::pool::Tick;

/// Deterministic failures of the position math. None of these are worth
/// retrying without changing the inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MathError {
    #[error("invalid range: {0}")]
    InvalidRange(String),
    #[error(
        "range [{tick_lower}, {tick_upper}) must sit above the current price (tick {current_tick})"
    )]
    RangeMustBeAboveCurrent { current_tick: Tick, tick_lower: Tick, tick_upper: Tick },
    #[error(
        "range [{tick_lower}, {tick_upper}) must sit below the current price (tick {current_tick})"
    )]
    RangeMustBeBelowCurrent { current_tick: Tick, tick_lower: Tick, tick_upper: Tick },
    #[error(
        "a base only deposit needs a range above spot, got [{tick_lower}, {tick_upper}) at tick \
         {current_tick}"
    )]
    SingleBaseRequiresRangeAboveSpot { current_tick: Tick, tick_lower: Tick, tick_upper: Tick },
    #[error(
        "a quote only deposit needs a range below spot, got [{tick_lower}, {tick_upper}) at tick \
         {current_tick}"
    )]
    SingleQuoteRequiresRangeBelowSpot { current_tick: Tick, tick_lower: Tick, tick_upper: Tick },
    #[error(
        "in range amount calculation failed for [{tick_lower}, {tick_upper}) at tick \
         {current_tick}: {reason}"
    )]
    InRangeAmountCalcFailed {
        current_tick: Tick,
        tick_lower:   Tick,
        tick_upper:   Tick,
        reason:       String
    },
    #[error(
        "failed to build position [{tick_lower}, {tick_upper}) at tick {current_tick} with \
         amount0 {amount0} amount1 {amount1}: {reason}"
    )]
    PositionBuildFailed {
        current_tick: Tick,
        tick_lower:   Tick,
        tick_upper:   Tick,
        amount0:      U256,
        amount1:      U256,
        reason:       String
    },
    #[error("amount0 {amount0} amount1 {amount1} mint zero liquidity in [{tick_lower}, {tick_upper})")]
    ZeroLiquidity { tick_lower: Tick, tick_upper: Tick, amount0: U256, amount1: U256 },
    #[error("tick {0} does not fit the protocol's int24 tick range")]
    TickOutOfRange(Tick)
}

impl MathError {
    /// Stable machine readable code handed to callers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRange(_) => "invalid_range",
            Self::RangeMustBeAboveCurrent { .. } => "range_must_be_above_current",
            Self::RangeMustBeBelowCurrent { .. } => "range_must_be_below_current",
            Self::SingleBaseRequiresRangeAboveSpot { .. } => "single_base_requires_range_above_spot",
            Self::SingleQuoteRequiresRangeBelowSpot { .. } => {
                "single_quote_requires_range_below_spot"
            }
            Self::InRangeAmountCalcFailed { .. } => "in_range_amount_calc_failed",
            Self::PositionBuildFailed { .. } => "position_build_failed",
            Self::ZeroLiquidity { .. } => "zero_liquidity",
            Self::TickOutOfRange(_) => "tick_out_of_range"
        }
    }
}
