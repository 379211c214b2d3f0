use alloy::primitives::U256;
use position_math::MathError;

/// Everything a planning request can fail with. Each variant maps to a stable
/// code through [`PlanError::code`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("invalid range: {0}")]
    InvalidRange(String),
    #[error("invalid single deposit asset: {0}")]
    InvalidSingleAsset(String),
    #[error("invalid side: {0}")]
    InvalidSide(String),
    #[error("invalid slippage: {0}")]
    InvalidSlippage(String),
    #[error("invalid percent: {0}")]
    InvalidPercent(String),
    #[error("token id is required")]
    MissingTokenId,
    #[error("invalid token id: {0}")]
    InvalidTokenId(String),
    #[error("position {token_id} belongs to a different pool than the configured pair")]
    PositionNotInPool { token_id: U256 },
    #[error(transparent)]
    Math(#[from] MathError),
    #[error("pool state unavailable: {0}")]
    PoolStateUnavailable(String),
    #[error("price unavailable: {0}")]
    PriceUnavailable(String),
    #[error("position unavailable: {0}")]
    PositionUnavailable(String)
}

impl PlanError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRecipient(_) => "invalid_recipient",
            Self::InvalidAmount(_) => "invalid_amount",
            Self::InvalidRange(_) => "invalid_range",
            Self::InvalidSingleAsset(_) => "invalid_single_asset",
            Self::InvalidSide(_) => "invalid_side",
            Self::InvalidSlippage(_) => "invalid_slippage",
            Self::InvalidPercent(_) => "invalid_percent",
            Self::MissingTokenId => "missing_token_id",
            Self::InvalidTokenId(_) => "invalid_token_id",
            Self::PositionNotInPool { .. } => "position_not_in_pool",
            Self::Math(e) => e.code(),
            Self::PoolStateUnavailable(_) => "pool_state_unavailable",
            Self::PriceUnavailable(_) => "price_unavailable",
            Self::PositionUnavailable(_) => "position_unavailable"
        }
    }

    /// Failures caused by an upstream read rather than by the request itself.
    /// The request may succeed if retried unchanged.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::PoolStateUnavailable(_) | Self::PriceUnavailable(_) | Self::PositionUnavailable(_)
        )
    }

    pub(crate) fn pool_state(err: eyre::Report) -> Self {
        tracing::warn!(error = %format!("{err:#}"), "pool state read failed");
        Self::PoolStateUnavailable(format!("{err:#}"))
    }

    pub(crate) fn price(err: eyre::Report) -> Self {
        tracing::warn!(error = %format!("{err:#}"), "price lookup failed");
        Self::PriceUnavailable(format!("{err:#}"))
    }

    pub(crate) fn position(err: eyre::Report) -> Self {
        tracing::warn!(error = %format!("{err:#}"), "position read failed");
        Self::PositionUnavailable(format!("{err:#}"))
    }
}
