//! JSON shapes handed back to callers. Token amounts are decimal strings of
//! base units so nothing loses precision in transport.

use alloy::primitives::U256;
use m00n_types::pool::{Tick, TickRange};
use serde::Serialize;

use crate::{encoder::EncodedCall, PlanError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallResponse {
    pub to:       String,
    pub data:     String,
    pub value:    String,
    pub deadline: String
}

impl From<&EncodedCall> for CallResponse {
    fn from(call: &EncodedCall) -> Self {
        Self {
            to:       call.to.to_string(),
            data:     call.data.to_string(),
            value:    call.value.to_string(),
            deadline: call.deadline.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuoteResponse {
    pub tick_lower:         Tick,
    pub tick_upper:         Tick,
    pub current_tick:       Tick,
    pub required_base_wei:  String,
    pub required_quote_wei: String,
    pub liquidity:          String
}

impl RangeQuoteResponse {
    pub fn range(&self) -> TickRange {
        TickRange { lower: self.tick_lower, upper: self.tick_upper }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MintResponse {
    #[serde(flatten)]
    pub quote: RangeQuoteResponse,
    #[serde(flatten)]
    pub call:  CallResponse
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncreaseResponse {
    pub token_id: String,
    #[serde(flatten)]
    pub quote:    RangeQuoteResponse,
    #[serde(flatten)]
    pub call:     CallResponse
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectResponse {
    pub token_id:  String,
    pub recipient: String,
    #[serde(flatten)]
    pub call:      CallResponse
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundResponse {
    pub token_id:     String,
    pub liquidity:    String,
    pub amount0_used: String,
    pub amount1_used: String,
    #[serde(flatten)]
    pub call:         CallResponse
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawResponse {
    pub token_id:          String,
    pub liquidity_removed: String,
    pub amount0_min:       String,
    pub amount1_min:       String,
    pub burn:              bool,
    #[serde(flatten)]
    pub call:              CallResponse
}

/// Fee accrual for one position. USD totals are `null` when a token could not
/// be priced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeesResponse {
    pub token_id:      String,
    pub lifetime0:     String,
    pub lifetime1:     String,
    pub unclaimed0:    String,
    pub unclaimed1:    String,
    pub lifetime_usd:  Option<f64>,
    pub unclaimed_usd: Option<f64>
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub error:   &'static str,
    pub message: String
}

impl From<&PlanError> for ErrorResponse {
    fn from(err: &PlanError) -> Self {
        Self { error: err.code(), message: err.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeesFailure {
    pub token_id: String,
    pub error:    &'static str,
    pub message:  String
}

/// One entry of a batch fee query. A failed position reports its own error
/// and leaves the others untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeesItem {
    Ok(FeesResponse),
    Err(FeesFailure)
}

impl FeesItem {
    pub fn new(token_id: U256, result: Result<FeesResponse, PlanError>) -> Self {
        match result {
            Ok(fees) => Self::Ok(fees),
            Err(err) => Self::Err(FeesFailure {
                token_id: token_id.to_string(),
                error:    err.code(),
                message:  err.to_string()
            })
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }
}
