//! Incoming JSON requests and their validation. Everything here runs before
//! any chain read, so a malformed request never costs an RPC round trip.

use std::str::FromStr;

use alloy::primitives::{
    utils::{parse_units, ParseUnits},
    Address, U256
};
use m00n_types::token::{PairAsset, PairOrientation, PoolToken};
use position_math::cfmm::uniswap::range::UsdBand;
use serde::Deserialize;

use crate::{encoder::BPS_DENOMINATOR, PlanError};

/// A token id as either a JSON number or a decimal / `0x` string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TokenIdInput {
    Number(u64),
    Text(String)
}

impl TokenIdInput {
    pub fn parse(&self) -> Result<U256, PlanError> {
        match self {
            Self::Number(id) => Ok(U256::from(*id)),
            Self::Text(text) => U256::from_str(text.trim())
                .map_err(|e| PlanError::InvalidTokenId(format!("{text:?}: {e}")))
        }
    }
}

impl From<U256> for TokenIdInput {
    fn from(value: U256) -> Self {
        Self::Text(value.to_string())
    }
}

pub fn require_token_id(input: Option<&TokenIdInput>) -> Result<U256, PlanError> {
    input.ok_or(PlanError::MissingTokenId)?.parse()
}

pub fn parse_recipient(input: Option<&str>) -> Result<Address, PlanError> {
    let raw = input.ok_or_else(|| PlanError::InvalidRecipient("recipient is required".into()))?;
    let recipient = Address::from_str(raw.trim())
        .map_err(|e| PlanError::InvalidRecipient(format!("{raw:?}: {e}")))?;
    if recipient.is_zero() {
        return Err(PlanError::InvalidRecipient("recipient is the zero address".into()))
    }
    Ok(recipient)
}

/// Human decimal string to base units. Zero and negative amounts are
/// rejected.
pub fn parse_amount(raw: &str, decimals: u8) -> Result<U256, PlanError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PlanError::InvalidAmount("amount is empty".into()))
    }
    let amount = match parse_units(trimmed, decimals) {
        Ok(ParseUnits::U256(amount)) => amount,
        Ok(ParseUnits::I256(_)) => {
            return Err(PlanError::InvalidAmount(format!("{raw:?} is negative")))
        }
        Err(e) => return Err(PlanError::InvalidAmount(format!("{raw:?}: {e}")))
    };
    if amount.is_zero() {
        return Err(PlanError::InvalidAmount(format!("{raw:?} is zero")))
    }
    Ok(amount)
}

/// `slippagePercent` (0 to 100, fractions allowed) to basis points.
pub fn slippage_bps(percent: Option<f64>, default_bps: u32) -> Result<u32, PlanError> {
    let Some(percent) = percent else { return Ok(default_bps) };
    if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
        return Err(PlanError::InvalidSlippage(format!("{percent} is outside [0, 100]")))
    }
    Ok((percent * 100.0).round() as u32)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Single,
    Double
}

/// What the user is depositing, in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deposit {
    /// One asset only, into a range entirely on that asset's side of spot.
    Single { asset: PairAsset, amount: U256 },
    /// Pool token amounts. A missing side is derived from the range.
    Double { amount0: Option<U256>, amount1: Option<U256> }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedDeposit {
    pub deposit: Deposit,
    /// `None` falls back to the configured band around spot.
    pub band:    Option<UsdBand>
}

/// Planning request shared by quote and mint.
///
/// `amount` and `singleDepositAsset` name one asset of the pair. For a single
/// sided deposit that is the whole deposit, for a double sided one the other
/// asset is derived from the range. `amount0` / `amount1` are the pool's
/// currency0 / currency1 amounts and only apply to double sided deposits. All
/// amounts are human decimal strings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuoteRequest {
    pub amount:               Option<String>,
    pub amount0:              Option<String>,
    pub amount1:              Option<String>,
    pub range_lower_usd:      Option<f64>,
    pub range_upper_usd:      Option<f64>,
    pub side:                 Option<String>,
    pub single_deposit_asset: Option<String>
}

impl RangeQuoteRequest {
    pub fn side(&self) -> Result<Side, PlanError> {
        match self.side.as_deref().map(str::trim) {
            None | Some("double") => Ok(Side::Double),
            Some("single") => Ok(Side::Single),
            Some(other) => {
                Err(PlanError::InvalidSide(format!("{other:?}, expected single or double")))
            }
        }
    }

    pub fn band(&self) -> Result<Option<UsdBand>, PlanError> {
        match (self.range_lower_usd, self.range_upper_usd) {
            (None, None) => Ok(None),
            (Some(lower), Some(upper)) => {
                if !lower.is_finite() || !upper.is_finite() || lower <= 0.0 || upper <= 0.0 {
                    return Err(PlanError::InvalidRange(format!(
                        "bounds {lower} and {upper} must be positive"
                    )))
                }
                if lower == upper {
                    return Err(PlanError::InvalidRange(format!("lower and upper are both {lower}")))
                }
                Ok(Some(UsdBand::new(lower, upper)))
            }
            _ => Err(PlanError::InvalidRange(
                "rangeLowerUsd and rangeUpperUsd must be given together".into()
            ))
        }
    }

    pub fn validate(&self, pair: &PairOrientation) -> Result<ValidatedDeposit, PlanError> {
        let deposit = match self.side()? {
            Side::Single => {
                let asset = parse_asset(self.single_deposit_asset.as_deref())?;
                let raw = self.amount.as_deref().ok_or_else(|| {
                    PlanError::InvalidAmount("amount is required for a single sided deposit".into())
                })?;
                Deposit::Single { asset, amount: parse_amount(raw, pair.decimals(asset))? }
            }
            Side::Double => match self.amount.as_deref() {
                Some(raw) => {
                    if self.amount0.is_some() || self.amount1.is_some() {
                        return Err(PlanError::InvalidAmount(
                            "amount cannot be combined with amount0 or amount1".into()
                        ))
                    }
                    let asset = parse_asset(self.single_deposit_asset.as_deref())?;
                    let amount = parse_amount(raw, pair.decimals(asset))?;
                    let (amount0, amount1) = match pair.pool_token(asset) {
                        PoolToken::Token0 => (Some(amount), None),
                        PoolToken::Token1 => (None, Some(amount))
                    };
                    Deposit::Double { amount0, amount1 }
                }
                None => {
                    let (amount0, amount1) =
                        pool_amounts(self.amount0.as_deref(), self.amount1.as_deref(), pair)?;
                    Deposit::Double { amount0, amount1 }
                }
            },
        };

        Ok(ValidatedDeposit { deposit, band: self.band()? })
    }
}

fn parse_asset(raw: Option<&str>) -> Result<PairAsset, PlanError> {
    match raw.map(str::trim) {
        Some("base") => Ok(PairAsset::Base),
        Some("quote") => Ok(PairAsset::Quote),
        Some(other) => {
            Err(PlanError::InvalidSingleAsset(format!("{other:?}, expected base or quote")))
        }
        None => Err(PlanError::InvalidSingleAsset("singleDepositAsset is required".into()))
    }
}

/// Parses currency0 / currency1 amounts with the pool's decimals. At least one
/// side must be present.
pub fn pool_amounts(
    amount0: Option<&str>,
    amount1: Option<&str>,
    pair: &PairOrientation
) -> Result<(Option<U256>, Option<U256>), PlanError> {
    if amount0.is_none() && amount1.is_none() {
        return Err(PlanError::InvalidAmount("amount0 or amount1 is required".into()))
    }
    let decimals = |token| pair.decimals(pair.pair_asset(token));
    let amount0 = amount0
        .map(|raw| parse_amount(raw, decimals(PoolToken::Token0)))
        .transpose()?;
    let amount1 = amount1
        .map(|raw| parse_amount(raw, decimals(PoolToken::Token1)))
        .transpose()?;
    Ok((amount0, amount1))
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintRequest {
    #[serde(flatten)]
    pub quote:            RangeQuoteRequest,
    pub recipient:        Option<String>,
    pub slippage_percent: Option<f64>
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncreaseRequest {
    pub token_id:         Option<TokenIdInput>,
    pub amount0:          Option<String>,
    pub amount1:          Option<String>,
    pub slippage_percent: Option<f64>
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectRequest {
    pub token_id:  Option<TokenIdInput>,
    pub recipient: Option<String>
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundRequest {
    pub token_id:         Option<TokenIdInput>,
    pub slippage_percent: Option<f64>
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    pub token_id:         Option<TokenIdInput>,
    pub recipient:        Option<String>,
    /// Share of the position's liquidity to remove, defaults to 100.
    pub percent:          Option<f64>,
    /// Burn the NFT as well. Only valid when removing everything.
    #[serde(default)]
    pub burn:             bool,
    pub slippage_percent: Option<f64>
}

impl WithdrawRequest {
    /// The removed share in basis points of the position's liquidity.
    pub fn share_bps(&self) -> Result<u32, PlanError> {
        let percent = self.percent.unwrap_or(100.0);
        if !percent.is_finite() || percent <= 0.0 || percent > 100.0 {
            return Err(PlanError::InvalidPercent(format!("{percent} is outside (0, 100]")))
        }
        let bps = (percent * 100.0).round() as u32;
        if bps == 0 {
            return Err(PlanError::InvalidPercent(format!("{percent} is below one basis point")))
        }
        if self.burn && bps != BPS_DENOMINATOR {
            return Err(PlanError::InvalidPercent(format!(
                "burning needs the whole position, got {percent}%"
            )))
        }
        Ok(bps)
    }
}

/// One id or a batch.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeesRequest {
    pub token_id:  Option<TokenIdInput>,
    #[serde(default)]
    pub token_ids: Vec<TokenIdInput>
}

impl FeesRequest {
    pub fn token_ids(&self) -> Result<Vec<U256>, PlanError> {
        let ids = self
            .token_id
            .iter()
            .chain(self.token_ids.iter())
            .map(TokenIdInput::parse)
            .collect::<Result<Vec<_>, _>>()?;
        if ids.is_empty() {
            return Err(PlanError::MissingTokenId)
        }
        Ok(ids)
    }
}
