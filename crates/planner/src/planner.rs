use alloy::primitives::{Address, U256};
use futures::future::join_all;
use m00n_types::{
    contract_bindings::{ext::PoolKeyExt, position_manager::PoolKey},
    pool::{PoolState, PositionDetails, TickRange},
    token::{PairAsset, PairOrientation, PoolToken}
};
use position_math::{
    cfmm::uniswap::{
        fees::{compute_fees, TokenValuation},
        liquidity::{amounts_for_liquidity, build_position, BuiltPosition},
        range::{
            ensure_single_sided, ensure_usable_alone, out_of_range_token, range_from_usd_band,
            UsdBand
        },
        solver::solve_companion
    },
    MathError
};

use crate::{
    common::{Clock, PoolStateProvider, PriceOracle, SystemClock},
    config::{PlannerConfig, PlanningConfig},
    encoder::{amount_min, CallEncoder, LiquidityBudget, BPS_DENOMINATOR},
    requests::{
        parse_recipient, pool_amounts, require_token_id, slippage_bps, CollectRequest,
        CompoundRequest, Deposit, IncreaseRequest, MintRequest, RangeQuoteRequest,
        WithdrawRequest
    },
    responses::{
        CollectResponse, CompoundResponse, FeesItem, FeesResponse, IncreaseResponse,
        MintResponse, RangeQuoteResponse, WithdrawResponse
    },
    PlanError
};

/// A range and the position built into it at the pool state it was read at.
#[derive(Debug, Clone, Copy)]
struct PlannedRange {
    state: PoolState,
    range: TickRange,
    built: BuiltPosition
}

/// Plans liquidity operations on the configured pool. Each call reads what it
/// needs fresh from the provider, nothing is kept between requests apart from
/// whatever the oracle caches.
pub struct PositionPlanner<P, O, C = SystemClock> {
    provider: P,
    oracle:   O,
    encoder:  CallEncoder<C>,
    pool_key: PoolKey,
    pair:     PairOrientation,
    planning: PlanningConfig
}

impl<P, O, C> PositionPlanner<P, O, C>
where
    P: PoolStateProvider,
    O: PriceOracle,
    C: Clock
{
    pub fn new(
        provider: P,
        oracle: O,
        encoder: CallEncoder<C>,
        pool_key: PoolKey,
        pair: PairOrientation,
        planning: PlanningConfig
    ) -> Self {
        Self { provider, oracle, encoder, pool_key, pair, planning }
    }

    pub fn from_config(
        config: &PlannerConfig,
        provider: P,
        oracle: O,
        clock: C
    ) -> eyre::Result<Self> {
        let encoder = CallEncoder::new(
            config.contracts.position_manager,
            config.planning.deadline_secs,
            clock
        );
        Ok(Self::new(
            provider,
            oracle,
            encoder,
            config.pool_key()?,
            config.pair_orientation()?,
            config.planning
        ))
    }

    pub fn pool_key(&self) -> &PoolKey {
        &self.pool_key
    }

    pub fn pair(&self) -> &PairOrientation {
        &self.pair
    }

    /// Ticks and amounts for a deposit, without any calldata.
    pub async fn quote_range(
        &self,
        request: &RangeQuoteRequest
    ) -> Result<RangeQuoteResponse, PlanError> {
        let planned = self.plan_range(request).await?;
        Ok(self.quote_response(&planned))
    }

    pub async fn plan_mint(&self, request: &MintRequest) -> Result<MintResponse, PlanError> {
        let recipient = parse_recipient(request.recipient.as_deref())?;
        let slippage_bps =
            slippage_bps(request.slippage_percent, self.planning.default_slippage_bps)?;
        let planned = self.plan_range(&request.quote).await?;

        let budget = LiquidityBudget {
            liquidity: planned.built.liquidity,
            amount0: planned.built.amount0,
            amount1: planned.built.amount1,
            slippage_bps
        };
        let call = self
            .encoder
            .mint(self.pool_key, &planned.range, budget, recipient)?;
        tracing::info!(
            %recipient,
            tick_lower = planned.range.lower,
            tick_upper = planned.range.upper,
            liquidity = planned.built.liquidity,
            value = %call.value,
            "planned mint"
        );

        Ok(MintResponse { quote: self.quote_response(&planned), call: (&call).into() })
    }

    /// Adds to a position in the configured pool. A single amount is
    /// completed with its companion the same way a double sided quote is.
    pub async fn plan_increase(
        &self,
        request: &IncreaseRequest
    ) -> Result<IncreaseResponse, PlanError> {
        let token_id = require_token_id(request.token_id.as_ref())?;
        let slippage_bps =
            slippage_bps(request.slippage_percent, self.planning.default_slippage_bps)?;
        let (amount0, amount1) =
            pool_amounts(request.amount0.as_deref(), request.amount1.as_deref(), &self.pair)?;

        let (details, state) =
            tokio::try_join!(self.read_position(token_id), self.read_pool_state(self.pool_key))?;
        if details.pool_key != self.pool_key {
            return Err(PlanError::PositionNotInPool { token_id })
        }

        let range = details.range;
        let (amount0, amount1) = self.double_amounts(&state, &range, amount0, amount1)?;
        let built = build_position(&state, &range, amount0, amount1)?;
        let budget = LiquidityBudget {
            liquidity: built.liquidity,
            amount0: built.amount0,
            amount1: built.amount1,
            slippage_bps
        };
        let call = self.encoder.increase(self.pool_key, token_id, budget);
        tracing::info!(
            %token_id,
            liquidity = built.liquidity,
            value = %call.value,
            "planned increase"
        );

        let planned = PlannedRange { state, range, built };
        Ok(IncreaseResponse {
            token_id: token_id.to_string(),
            quote:    self.quote_response(&planned),
            call:     (&call).into()
        })
    }

    pub async fn plan_collect(
        &self,
        request: &CollectRequest
    ) -> Result<CollectResponse, PlanError> {
        let token_id = require_token_id(request.token_id.as_ref())?;
        let recipient = parse_recipient(request.recipient.as_deref())?;

        let details = self.read_position(token_id).await?;
        let call = self.encoder.collect(details.pool_key, token_id, recipient);
        tracing::info!(%token_id, %recipient, "planned fee collection");

        Ok(CollectResponse {
            token_id:  token_id.to_string(),
            recipient: recipient.to_string(),
            call:      (&call).into()
        })
    }

    /// Turns the position's unclaimed fees into more liquidity in the same
    /// range. Whatever part of the fees does not fit the range ratio stays
    /// with the position manager's caller.
    pub async fn plan_compound(
        &self,
        request: &CompoundRequest
    ) -> Result<CompoundResponse, PlanError> {
        let token_id = require_token_id(request.token_id.as_ref())?;
        let slippage_bps =
            slippage_bps(request.slippage_percent, self.planning.default_slippage_bps)?;

        let details = self.read_position(token_id).await?;
        let key = details.pool_key;
        let (growth, state) = tokio::try_join!(
            async {
                self.provider
                    .fee_growth_inside(key, details.range)
                    .await
                    .map_err(PlanError::pool_state)
            },
            self.read_pool_state(key)
        )?;

        let fees = compute_fees(&details, &growth);
        tracing::debug!(
            %token_id,
            unclaimed0 = %fees.unclaimed0,
            unclaimed1 = %fees.unclaimed1,
            "fees available to compound"
        );
        let built = build_position(&state, &details.range, fees.unclaimed0, fees.unclaimed1)?;
        let budget = LiquidityBudget {
            liquidity: built.liquidity,
            amount0: built.amount0,
            amount1: built.amount1,
            slippage_bps
        };
        let call = self.encoder.compound(key, token_id, budget);
        tracing::info!(%token_id, liquidity = built.liquidity, "planned compound");

        Ok(CompoundResponse {
            token_id:     token_id.to_string(),
            liquidity:    built.liquidity.to_string(),
            amount0_used: built.amount0.to_string(),
            amount1_used: built.amount1.to_string(),
            call:         (&call).into()
        })
    }

    /// Removes a share of a position's liquidity, with minimums derived from
    /// what that share is worth at the current price.
    pub async fn plan_withdraw(
        &self,
        request: &WithdrawRequest
    ) -> Result<WithdrawResponse, PlanError> {
        let token_id = require_token_id(request.token_id.as_ref())?;
        let recipient = parse_recipient(request.recipient.as_deref())?;
        let share_bps = request.share_bps()?;
        let slippage_bps =
            slippage_bps(request.slippage_percent, self.planning.default_slippage_bps)?;

        let details = self.read_position(token_id).await?;
        let state = self.read_pool_state(details.pool_key).await?;
        let range = details.range;

        let share = U256::from(details.liquidity) * U256::from(share_bps)
            / U256::from(BPS_DENOMINATOR);
        let liquidity = u128::try_from(share).unwrap_or(details.liquidity);
        if liquidity == 0 && !request.burn {
            return Err(MathError::ZeroLiquidity {
                tick_lower: range.lower,
                tick_upper: range.upper,
                amount0:    U256::ZERO,
                amount1:    U256::ZERO
            }
            .into())
        }

        let (expected0, expected1) = amounts_for_liquidity(&state, &range, liquidity, false)
            .map_err(|e| MathError::PositionBuildFailed {
                current_tick: state.tick,
                tick_lower:   range.lower,
                tick_upper:   range.upper,
                amount0:      U256::ZERO,
                amount1:      U256::ZERO,
                reason:       format!("{e:#}")
            })?;
        let minimums = (amount_min(expected0, slippage_bps), amount_min(expected1, slippage_bps));
        let call = self.encoder.withdraw(
            details.pool_key,
            token_id,
            liquidity,
            minimums,
            request.burn,
            recipient
        );
        tracing::info!(%token_id, %recipient, liquidity, burn = request.burn, "planned withdraw");

        Ok(WithdrawResponse {
            token_id:          token_id.to_string(),
            liquidity_removed: liquidity.to_string(),
            amount0_min:       minimums.0.to_string(),
            amount1_min:       minimums.1.to_string(),
            burn:              request.burn,
            call:              (&call).into()
        })
    }

    /// Lifetime and unclaimed fees of one position. USD totals are left out
    /// when either token cannot be priced, the raw amounts are still
    /// reported.
    pub async fn position_fees(&self, token_id: U256) -> Result<FeesResponse, PlanError> {
        let details = self.read_position(token_id).await?;
        let key = details.pool_key;

        let (growth, valuation0, valuation1) = tokio::join!(
            self.provider.fee_growth_inside(key, details.range),
            self.valuation(key.currency0),
            self.valuation(key.currency1)
        );
        let growth = growth.map_err(PlanError::pool_state)?;

        let fees = compute_fees(&details, &growth);
        let usd = fees.value_usd(valuation0, valuation1);
        tracing::debug!(%token_id, ?fees, ?usd, "computed position fees");

        Ok(FeesResponse {
            token_id:      token_id.to_string(),
            lifetime0:     fees.lifetime0.to_string(),
            lifetime1:     fees.lifetime1.to_string(),
            unclaimed0:    fees.unclaimed0.to_string(),
            unclaimed1:    fees.unclaimed1.to_string(),
            lifetime_usd:  usd.map(|usd| usd.lifetime),
            unclaimed_usd: usd.map(|usd| usd.unclaimed)
        })
    }

    /// Fees for many positions at once. Every id gets its own entry, in
    /// order, whether it succeeded or not.
    pub async fn positions_fees(&self, token_ids: &[U256]) -> Vec<FeesItem> {
        join_all(token_ids.iter().map(|&token_id| async move {
            FeesItem::new(token_id, self.position_fees(token_id).await)
        }))
        .await
    }

    async fn plan_range(&self, request: &RangeQuoteRequest) -> Result<PlannedRange, PlanError> {
        let validated = request.validate(&self.pair)?;

        let (state, quote_usd) = tokio::try_join!(self.read_pool_state(self.pool_key), async {
            self.oracle
                .usd_price(self.pair.quote)
                .await
                .map_err(PlanError::price)
        })?;

        let band = validated
            .band
            .unwrap_or_else(|| self.default_band(&state, quote_usd));
        let range = range_from_usd_band(band, quote_usd, &self.pair, self.pool_key.tick_spacing())?;
        tracing::debug!(
            current_tick = state.tick,
            lower_usd = band.lower_usd,
            upper_usd = band.upper_usd,
            quote_usd,
            tick_lower = range.lower,
            tick_upper = range.upper,
            "resolved range"
        );

        let (amount0, amount1) = match validated.deposit {
            Deposit::Single { asset, amount } => {
                ensure_single_sided(&range, state.tick, asset, &self.pair)?;
                split(self.pair.pool_token(asset), amount, U256::ZERO)
            }
            Deposit::Double { amount0, amount1 } => {
                self.double_amounts(&state, &range, amount0, amount1)?
            }
        };

        let built = build_position(&state, &range, amount0, amount1)?;
        Ok(PlannedRange { state, range, built })
    }

    /// Base USD band around the current spot price.
    fn default_band(&self, state: &PoolState, quote_usd: f64) -> UsdBand {
        let spot_usd = self.pair.quote_per_base(state.price()) * quote_usd;
        let band = self.planning.default_band;
        UsdBand::around_spot(spot_usd, band.lower_multiplier, band.upper_multiplier)
    }

    /// Fills in whichever side of a double sided deposit was left out. Out of
    /// range, the missing side is zero as long as the given side is the one
    /// the range holds. In range, it is solved from the given side.
    fn double_amounts(
        &self,
        state: &PoolState,
        range: &TickRange,
        amount0: Option<U256>,
        amount1: Option<U256>
    ) -> Result<(U256, U256), PlanError> {
        let (token, amount) = match (amount0, amount1) {
            (Some(amount0), Some(amount1)) => return Ok((amount0, amount1)),
            (Some(amount0), None) => (PoolToken::Token0, amount0),
            (None, Some(amount1)) => (PoolToken::Token1, amount1),
            (None, None) => {
                return Err(PlanError::InvalidAmount("amount0 or amount1 is required".into()))
            }
        };

        if out_of_range_token(range, state.tick).is_some() {
            ensure_usable_alone(range, state.tick, self.pair.pair_asset(token), &self.pair)?;
            return Ok(split(token, amount, U256::ZERO))
        }
        let companion = solve_companion(state, range, token, amount)?;
        tracing::debug!(
            deposit = ?token,
            %amount,
            companion = %companion.amount,
            ratio_1_over_0 = companion.ratio_1_over_0,
            "solved companion amount"
        );
        Ok(split(token, amount, companion.amount))
    }

    fn quote_response(&self, planned: &PlannedRange) -> RangeQuoteResponse {
        let (base, quote) = match self.pair.pool_token(PairAsset::Base) {
            PoolToken::Token0 => (planned.built.amount0, planned.built.amount1),
            PoolToken::Token1 => (planned.built.amount1, planned.built.amount0)
        };
        RangeQuoteResponse {
            tick_lower:         planned.range.lower,
            tick_upper:         planned.range.upper,
            current_tick:       planned.state.tick,
            required_base_wei:  base.to_string(),
            required_quote_wei: quote.to_string(),
            liquidity:          planned.built.liquidity.to_string()
        }
    }

    async fn read_pool_state(&self, key: PoolKey) -> Result<PoolState, PlanError> {
        self.provider
            .pool_state(key)
            .await
            .map_err(PlanError::pool_state)
    }

    async fn read_position(&self, token_id: U256) -> Result<PositionDetails, PlanError> {
        self.provider
            .position_details(token_id)
            .await
            .map_err(PlanError::position)
    }

    /// Decimals and USD price of a token, or `None` if either is unknown.
    async fn valuation(&self, token: Address) -> Option<TokenValuation> {
        let (metadata, price) =
            tokio::join!(self.provider.token_metadata(token), self.oracle.usd_price(token));

        let decimals = match metadata {
            Ok(metadata) => metadata.decimals(),
            Err(err) => {
                tracing::warn!(%token, error = %format!("{err:#}"), "token metadata read failed");
                None
            }
        };
        let usd_price = match price {
            Ok(price) => Some(price),
            Err(err) => {
                tracing::warn!(
                    %token,
                    error = %format!("{err:#}"),
                    "no usd price for fee valuation"
                );
                None
            }
        };
        Some(TokenValuation { usd_price: usd_price?, decimals: decimals? })
    }
}

/// `(amount0, amount1)` with `amount` on `token` and `other` on the other side.
fn split(token: PoolToken, amount: U256, other: U256) -> (U256, U256) {
    match token {
        PoolToken::Token0 => (amount, other),
        PoolToken::Token1 => (other, amount)
    }
}
