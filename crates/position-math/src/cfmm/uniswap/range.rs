//! Tick ranges from user supplied USD bands, plus the directional checks for
//! one sided deposits.

use m00n_types::{
    pool::{RangePlacement, Tick, TickRange},
    token::{PairAsset, PairOrientation, PoolToken}
};

use super::tick::{floor_tick, snap_down, snap_up};
use crate::MathError;

/// Lower and upper USD price of the base token. Order does not matter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsdBand {
    pub lower_usd: f64,
    pub upper_usd: f64
}

impl UsdBand {
    pub fn new(lower_usd: f64, upper_usd: f64) -> Self {
        Self { lower_usd, upper_usd }
    }

    /// Band around a spot price, `spot * lower_multiplier ..= spot *
    /// upper_multiplier`.
    pub fn around_spot(spot_usd: f64, lower_multiplier: f64, upper_multiplier: f64) -> Self {
        Self { lower_usd: spot_usd * lower_multiplier, upper_usd: spot_usd * upper_multiplier }
    }

    fn ordered(&self) -> Result<(f64, f64), MathError> {
        let (a, b) = (self.lower_usd, self.upper_usd);
        if !a.is_finite() || !b.is_finite() {
            return Err(MathError::InvalidRange(format!("band bounds {a} and {b} must be finite")))
        }
        if a == b {
            return Err(MathError::InvalidRange(format!("band [{a}, {b}] has zero width")))
        }
        Ok((a.min(b), a.max(b)))
    }
}

/// Snaps `lower` down and `upper` up to the spacing. If that leaves an empty
/// range the upper bound becomes `lower + spacing`.
pub fn snap_range(lower: Tick, upper: Tick, spacing: i32) -> Result<TickRange, MathError> {
    if spacing <= 0 {
        return Err(MathError::InvalidRange(format!("tick spacing {spacing} must be positive")))
    }
    let tick_lower = snap_down(lower, spacing);
    let mut tick_upper = snap_up(upper, spacing);
    if tick_upper <= tick_lower {
        tick_upper = tick_lower + spacing;
    }

    TickRange::new(tick_lower, tick_upper, spacing)
        .map_err(|e| MathError::InvalidRange(e.to_string()))
}

/// Converts a USD band for the base token into an aligned pool tick range.
///
/// Each bound becomes a quote-per-base ratio (`usd / quote_usd`), then a raw
/// pool price through `pair`, then a floored tick. When the base token is
/// token1 a higher USD price is a lower pool tick, so the bounds swap.
pub fn range_from_usd_band(
    band: UsdBand,
    quote_usd: f64,
    pair: &PairOrientation,
    spacing: i32
) -> Result<TickRange, MathError> {
    let (lower_usd, upper_usd) = band.ordered()?;
    if !quote_usd.is_finite() || quote_usd <= 0.0 {
        return Err(MathError::InvalidRange(format!("quote price {quote_usd} must be positive")))
    }

    let ratio_lower = lower_usd / quote_usd;
    let ratio_upper = upper_usd / quote_usd;
    if ratio_lower <= 0.0 || ratio_upper <= 0.0 {
        return Err(MathError::InvalidRange(format!(
            "band [{lower_usd}, {upper_usd}] gives non-positive ratios at quote price {quote_usd}"
        )))
    }

    let tick_a = floor_tick(pair.raw_price(ratio_lower))?;
    let tick_b = floor_tick(pair.raw_price(ratio_upper))?;
    let range = snap_range(tick_a.min(tick_b), tick_a.max(tick_b), spacing)?;

    tracing::trace!(lower_usd, upper_usd, quote_usd, tick_a, tick_b, ?range, "usd band to ticks");
    Ok(range)
}

/// Directional check for single sided deposits. A base only deposit needs the
/// whole range above spot (in base USD terms), a quote only deposit needs it
/// below. In pool terms the token0 only side is `lower > current` and the
/// token1 only side is `upper < current`.
pub fn ensure_single_sided(
    range: &TickRange,
    current_tick: Tick,
    asset: PairAsset,
    pair: &PairOrientation
) -> Result<(), MathError> {
    let fits = match pair.pool_token(asset) {
        PoolToken::Token0 => range.lower > current_tick,
        PoolToken::Token1 => range.upper < current_tick
    };
    if fits {
        return Ok(())
    }

    let (tick_lower, tick_upper) = (range.lower, range.upper);
    Err(match asset {
        PairAsset::Base => {
            MathError::RangeMustBeAboveCurrent { current_tick, tick_lower, tick_upper }
        }
        PairAsset::Quote => {
            MathError::RangeMustBeBelowCurrent { current_tick, tick_lower, tick_upper }
        }
    })
}

/// For a range that does not contain spot, the only token it can hold.
/// `None` when spot is inside the range and both tokens are needed.
pub fn out_of_range_token(range: &TickRange, current_tick: Tick) -> Option<PoolToken> {
    match range.placement(current_tick) {
        RangePlacement::AboveCurrent => Some(PoolToken::Token0),
        RangePlacement::BelowCurrent => Some(PoolToken::Token1),
        RangePlacement::InRange => None
    }
}

/// A double sided request that only supplied one asset, against a range that
/// can only hold the other asset.
pub fn ensure_usable_alone(
    range: &TickRange,
    current_tick: Tick,
    asset: PairAsset,
    pair: &PairOrientation
) -> Result<(), MathError> {
    match out_of_range_token(range, current_tick) {
        Some(token) if token != pair.pool_token(asset) => {
            let (tick_lower, tick_upper) = (range.lower, range.upper);
            Err(match asset {
                PairAsset::Base => MathError::SingleBaseRequiresRangeAboveSpot {
                    current_tick,
                    tick_lower,
                    tick_upper
                },
                PairAsset::Quote => MathError::SingleQuoteRequiresRangeBelowSpot {
                    current_tick,
                    tick_lower,
                    tick_upper
                },
            })
        }
        _ => Ok(())
    }
}
