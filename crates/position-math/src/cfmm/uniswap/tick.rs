//! Conversions between prices and the protocol's discrete tick grid.

use m00n_types::pool::Tick;

use crate::MathError;

/// `ln(1.0001)`, the log base of the tick grid.
const LN_TICK_BASE: f64 = 0.000_099_995_000_333_308_34;

/// Real valued tick for a raw price. Callers reject `ratio <= 0` first, the
/// log of a non-positive number is NaN.
pub fn price_to_tick(ratio: f64) -> f64 {
    ratio.ln() / LN_TICK_BASE
}

pub fn tick_to_price(tick: Tick) -> f64 {
    (tick as f64 * LN_TICK_BASE).exp()
}

/// Largest multiple of `spacing` that is `<= tick`.
pub fn snap_down(tick: Tick, spacing: i32) -> Tick {
    tick.div_euclid(spacing) * spacing
}

/// Smallest multiple of `spacing` that is `>= tick`.
pub fn snap_up(tick: Tick, spacing: i32) -> Tick {
    if tick.rem_euclid(spacing) == 0 {
        tick
    } else {
        (tick.div_euclid(spacing) + 1) * spacing
    }
}

/// Floor of [`price_to_tick`], rejecting ratios the log cannot take.
pub fn floor_tick(ratio: f64) -> Result<Tick, MathError> {
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(MathError::InvalidRange(format!("price ratio {ratio} must be positive")))
    }
    let tick = price_to_tick(ratio).floor();
    if tick < i32::MIN as f64 || tick > i32::MAX as f64 {
        return Err(MathError::InvalidRange(format!("price ratio {ratio} is off the tick grid")))
    }
    Ok(tick as Tick)
}
