use super::Tick;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TickRangeError {
    #[error("tick spacing must be positive, got {0}")]
    InvalidSpacing(i32),
    #[error("tick range [{lower}, {upper}) is empty")]
    Empty { lower: Tick, upper: Tick },
    #[error("tick {tick} is not a multiple of spacing {spacing}")]
    Unaligned { tick: Tick, spacing: i32 }
}

/// Where the pool's current tick sits relative to a range, using the pool's
/// own classification (`tick < lower`, `tick < upper`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePlacement {
    /// Current tick below the range. The position holds token0 only.
    AboveCurrent,
    InRange,
    /// Current tick at or above the upper bound. The position holds token1
    /// only.
    BelowCurrent
}

/// `[lower, upper)`, both multiples of the pool's tick spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickRange {
    pub lower: Tick,
    pub upper: Tick
}

impl TickRange {
    pub fn new(lower: Tick, upper: Tick, spacing: i32) -> Result<Self, TickRangeError> {
        if spacing <= 0 {
            return Err(TickRangeError::InvalidSpacing(spacing))
        }
        if lower >= upper {
            return Err(TickRangeError::Empty { lower, upper })
        }
        for tick in [lower, upper] {
            if tick % spacing != 0 {
                return Err(TickRangeError::Unaligned { tick, spacing })
            }
        }
        Ok(Self { lower, upper })
    }

    pub fn placement(&self, current_tick: Tick) -> RangePlacement {
        if current_tick < self.lower {
            RangePlacement::AboveCurrent
        } else if current_tick < self.upper {
            RangePlacement::InRange
        } else {
            RangePlacement::BelowCurrent
        }
    }

    pub fn width(&self) -> i32 {
        self.upper - self.lower
    }
}
