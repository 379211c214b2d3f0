//! Slippage bounds and `PositionManager.modifyLiquidities` calldata. Pure
//! serialization, no chain access.

use alloy::{
    primitives::{address, aliases::I24, Address, Bytes, U256},
    sol_types::{SolCall, SolValue}
};
use m00n_types::{
    contract_bindings::{
        ext::PoolKeyExt,
        position_manager::{
            BurnPositionParams, CloseCurrencyParams, DecreaseLiquidityParams,
            IPositionManager::modifyLiquiditiesCall, IncreaseLiquidityParams, MintPositionParams,
            PoolKey, SettlePairParams, SweepParams, TakePairParams
        }
    },
    pool::{Tick, TickRange}
};
use position_math::MathError;

use crate::{common::Clock, PlanError};

pub const BPS_DENOMINATOR: u32 = 10_000;

/// Resolves to the caller of `modifyLiquidities` inside the position manager.
pub const MSG_SENDER: Address = address!("0000000000000000000000000000000000000001");

/// `floor(desired * (10000 + bps) / 10000)`, clamped into the uint128 the
/// position manager takes.
pub fn amount_max(desired: U256, slippage_bps: u32) -> u128 {
    let scaled = desired.saturating_mul(U256::from(BPS_DENOMINATOR + slippage_bps))
        / U256::from(BPS_DENOMINATOR);
    clamp_u128(scaled)
}

/// `floor(desired * (10000 - bps) / 10000)`, never below zero.
pub fn amount_min(desired: U256, slippage_bps: u32) -> u128 {
    let keep = BPS_DENOMINATOR.saturating_sub(slippage_bps);
    let scaled = desired.saturating_mul(U256::from(keep)) / U256::from(BPS_DENOMINATOR);
    clamp_u128(scaled)
}

fn clamp_u128(value: U256) -> u128 {
    u128::try_from(value).unwrap_or(u128::MAX)
}

fn int24(tick: Tick) -> Result<I24, MathError> {
    I24::try_from(tick).map_err(|_| MathError::TickOutOfRange(tick))
}

/// Position manager action codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Actions {
    IncreaseLiquidity = 0x00,
    DecreaseLiquidity = 0x01,
    MintPosition = 0x02,
    BurnPosition = 0x03,
    SettlePair = 0x0d,
    TakePair = 0x11,
    CloseCurrency = 0x12,
    Sweep = 0x14
}

/// Accumulates actions and their abi encoded params, then packs them into
/// `abi.encode(bytes actions, bytes[] params)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionPlanner {
    actions: Vec<u8>,
    params:  Vec<Bytes>
}

impl ActionPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    fn push<T: SolValue>(&mut self, action: Actions, params: &T) -> &mut Self
    where
        for<'a> <T::SolType as alloy::sol_types::SolType>::Token<'a>:
            alloy::sol_types::abi::TokenSeq<'a>
    {
        self.actions.push(action as u8);
        self.params.push(params.abi_encode_params().into());
        self
    }

    pub fn mint_position(
        &mut self,
        key: PoolKey,
        range: &TickRange,
        liquidity: u128,
        amount0_max: u128,
        amount1_max: u128,
        owner: Address
    ) -> Result<&mut Self, MathError> {
        let params = MintPositionParams {
            poolKey: key,
            tickLower: int24(range.lower)?,
            tickUpper: int24(range.upper)?,
            liquidity: U256::from(liquidity),
            amount0Max: amount0_max,
            amount1Max: amount1_max,
            owner,
            hookData: Bytes::new()
        };
        Ok(self.push(Actions::MintPosition, &params))
    }

    pub fn increase_liquidity(
        &mut self,
        token_id: U256,
        liquidity: u128,
        amount0_max: u128,
        amount1_max: u128
    ) -> &mut Self {
        let params = IncreaseLiquidityParams {
            tokenId: token_id,
            liquidity: U256::from(liquidity),
            amount0Max: amount0_max,
            amount1Max: amount1_max,
            hookData: Bytes::new()
        };
        self.push(Actions::IncreaseLiquidity, &params)
    }

    pub fn decrease_liquidity(
        &mut self,
        token_id: U256,
        liquidity: u128,
        amount0_min: u128,
        amount1_min: u128
    ) -> &mut Self {
        let params = DecreaseLiquidityParams {
            tokenId: token_id,
            liquidity: U256::from(liquidity),
            amount0Min: amount0_min,
            amount1Min: amount1_min,
            hookData: Bytes::new()
        };
        self.push(Actions::DecreaseLiquidity, &params)
    }

    pub fn burn_position(
        &mut self,
        token_id: U256,
        amount0_min: u128,
        amount1_min: u128
    ) -> &mut Self {
        let params = BurnPositionParams {
            tokenId: token_id,
            amount0Min: amount0_min,
            amount1Min: amount1_min,
            hookData: Bytes::new()
        };
        self.push(Actions::BurnPosition, &params)
    }

    pub fn settle_pair(&mut self, key: &PoolKey) -> &mut Self {
        let params = SettlePairParams { currency0: key.currency0, currency1: key.currency1 };
        self.push(Actions::SettlePair, &params)
    }

    pub fn take_pair(&mut self, key: &PoolKey, recipient: Address) -> &mut Self {
        let params =
            TakePairParams { currency0: key.currency0, currency1: key.currency1, recipient };
        self.push(Actions::TakePair, &params)
    }

    pub fn close_currency(&mut self, currency: Address) -> &mut Self {
        self.push(Actions::CloseCurrency, &CloseCurrencyParams { currency })
    }

    pub fn sweep(&mut self, currency: Address, to: Address) -> &mut Self {
        self.push(Actions::Sweep, &SweepParams { currency, to })
    }

    pub fn actions(&self) -> &[u8] {
        &self.actions
    }

    /// `abi.encode(actions, params)`, the `unlockData` argument.
    pub fn finalize(&self) -> Bytes {
        (Bytes::from(self.actions.clone()), self.params.clone())
            .abi_encode_params()
            .into()
    }

    pub fn modify_liquidities(&self, deadline: U256) -> Bytes {
        modifyLiquiditiesCall { unlockData: self.finalize(), deadline }
            .abi_encode()
            .into()
    }
}

/// A call ready to hand to a wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCall {
    pub to:       Address,
    pub data:     Bytes,
    /// Native currency to attach.
    pub value:    U256,
    pub deadline: U256
}

/// Amounts and bounds for minting or increasing into a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidityBudget {
    pub liquidity:    u128,
    pub amount0:      U256,
    pub amount1:      U256,
    pub slippage_bps: u32
}

impl LiquidityBudget {
    fn maxes(&self) -> (u128, u128) {
        (amount_max(self.amount0, self.slippage_bps), amount_max(self.amount1, self.slippage_bps))
    }
}

/// Builds every position manager call this crate plans, sharing one deadline
/// window and target.
#[derive(Debug, Clone)]
pub struct CallEncoder<C> {
    position_manager: Address,
    deadline_secs:    u64,
    clock:            C
}

impl<C: Clock> CallEncoder<C> {
    pub fn new(position_manager: Address, deadline_secs: u64, clock: C) -> Self {
        Self { position_manager, deadline_secs, clock }
    }

    pub fn deadline(&self) -> U256 {
        U256::from(self.clock.unix_secs().saturating_add(self.deadline_secs))
    }

    fn call(&self, planner: &ActionPlanner, value: U256) -> EncodedCall {
        let deadline = self.deadline();
        EncodedCall {
            to: self.position_manager,
            data: planner.modify_liquidities(deadline),
            value,
            deadline
        }
    }

    /// The native side's maximum, attached as value. Zero for erc20 pairs.
    fn native_value(key: &PoolKey, amount0_max: u128) -> U256 {
        if key.native_currency().is_some() {
            U256::from(amount0_max)
        } else {
            U256::ZERO
        }
    }

    pub fn mint(
        &self,
        key: PoolKey,
        range: &TickRange,
        budget: LiquidityBudget,
        recipient: Address
    ) -> Result<EncodedCall, PlanError> {
        let (amount0_max, amount1_max) = budget.maxes();
        let mut planner = ActionPlanner::new();
        planner
            .mint_position(key, range, budget.liquidity, amount0_max, amount1_max, recipient)?
            .settle_pair(&key);
        if let Some(native) = key.native_currency() {
            planner.sweep(native, recipient);
        }
        Ok(self.call(&planner, Self::native_value(&key, amount0_max)))
    }

    pub fn increase(&self, key: PoolKey, token_id: U256, budget: LiquidityBudget) -> EncodedCall {
        let (amount0_max, amount1_max) = budget.maxes();
        let mut planner = ActionPlanner::new();
        planner
            .increase_liquidity(token_id, budget.liquidity, amount0_max, amount1_max)
            .settle_pair(&key);
        if let Some(native) = key.native_currency() {
            planner.sweep(native, MSG_SENDER);
        }
        self.call(&planner, Self::native_value(&key, amount0_max))
    }

    /// Zero liquidity decrease to settle fees, then send both currencies to
    /// `recipient`. No slippage bounds, collecting has no price exposure.
    pub fn collect(&self, key: PoolKey, token_id: U256, recipient: Address) -> EncodedCall {
        let mut planner = ActionPlanner::new();
        planner
            .decrease_liquidity(token_id, 0, 0, 0)
            .take_pair(&key, recipient);
        self.call(&planner, U256::ZERO)
    }

    /// Collects fees and adds them straight back as liquidity. The fee credit
    /// pays for the increase, `CLOSE_CURRENCY` settles whatever is left over.
    pub fn compound(&self, key: PoolKey, token_id: U256, budget: LiquidityBudget) -> EncodedCall {
        let (amount0_max, amount1_max) = budget.maxes();
        let mut planner = ActionPlanner::new();
        planner
            .decrease_liquidity(token_id, 0, 0, 0)
            .increase_liquidity(token_id, budget.liquidity, amount0_max, amount1_max)
            .close_currency(key.currency0)
            .close_currency(key.currency1);
        self.call(&planner, U256::ZERO)
    }

    /// Removes `liquidity`, or burns the position outright, and takes the
    /// proceeds.
    pub fn withdraw(
        &self,
        key: PoolKey,
        token_id: U256,
        liquidity: u128,
        minimums: (u128, u128),
        burn: bool,
        recipient: Address
    ) -> EncodedCall {
        let (amount0_min, amount1_min) = minimums;
        let mut planner = ActionPlanner::new();
        if burn {
            planner.burn_position(token_id, amount0_min, amount1_min);
        } else {
            planner.decrease_liquidity(token_id, liquidity, amount0_min, amount1_min);
        }
        planner.take_pair(&key, recipient);
        self.call(&planner, U256::ZERO)
    }
}
