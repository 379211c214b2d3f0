use std::{str::FromStr, time::Duration};

use alloy::{
    primitives::{Bytes, U256},
    sol_types::{SolCall, SolValue}
};
use assert_matches::assert_matches;
use m00n_types::{
    contract_bindings::position_manager::{
        DecreaseLiquidityParams, IPositionManager::modifyLiquiditiesCall, PoolKey
    },
    pool::{FeeGrowthInside, PositionDetails, TickRange}
};
use planner::{
    encoder::Actions,
    requests::{
        CollectRequest, CompoundRequest, IncreaseRequest, MintRequest, RangeQuoteRequest,
        WithdrawRequest
    },
    responses::{CallResponse, FeesItem},
    PlanError
};
use serde_json::json;
use testing_tools::fixtures::{
    base_quote_key, tokens, PlannerHarness, BASE, NOW, POSITION_MANAGER, QUOTE, RECIPIENT, SPACING
};

const Q128: U256 = U256::from_limbs([0, 0, 1, 0]);

fn request<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> T {
    serde_json::from_value(value).unwrap()
}

fn actions(call: &CallResponse) -> (Vec<u8>, Vec<Bytes>) {
    let data = Bytes::from_str(&call.data).unwrap();
    let decoded = modifyLiquiditiesCall::abi_decode(&data, true).unwrap();
    let (actions, params) =
        <(Bytes, Vec<Bytes>)>::abi_decode_params(&decoded.unlockData, true).unwrap();
    (actions.to_vec(), params)
}

#[tokio::test]
async fn sky_deposit_above_spot_is_base_only() {
    let harness = PlannerHarness::at_tick(1000);
    let mint: MintRequest = request(json!({
        "side": "single",
        "singleDepositAsset": "base",
        "amount": "1000",
        "rangeLowerUsd": 2000,
        "rangeUpperUsd": 3000,
        "recipient": RECIPIENT.to_string()
    }));

    let planned = harness.planner.plan_mint(&mint).await.unwrap();
    let quote = &planned.quote;
    assert!(quote.tick_lower >= 1000);
    assert!(quote.tick_upper > quote.tick_lower);
    assert_eq!(quote.tick_lower % SPACING, 0);
    assert_eq!(quote.tick_upper % SPACING, 0);
    assert_eq!(quote.current_tick, 1000);
    assert_eq!(quote.required_quote_wei, "0");
    assert_ne!(quote.liquidity, "0");
    assert!(U256::from_str(&quote.required_base_wei).unwrap() <= tokens(1000) + U256::from(1));

    assert_eq!(planned.call.to, POSITION_MANAGER.to_string());
    assert_eq!(planned.call.value, "0");
    assert_eq!(planned.call.deadline, (NOW + 600).to_string());
    let (actions, _) = actions(&planned.call);
    assert_eq!(actions, vec![Actions::MintPosition as u8, Actions::SettlePair as u8]);
}

#[tokio::test]
async fn straddling_band_needs_a_quote_companion() {
    let harness = PlannerHarness::at_tick(1000);
    let quote_request: RangeQuoteRequest = request(json!({
        "amount0": "1000",
        "rangeLowerUsd": 0.9,
        "rangeUpperUsd": 3000
    }));

    let quote = harness.planner.quote_range(&quote_request).await.unwrap();
    assert!(quote.tick_lower < 1000 && quote.tick_upper > 1000);
    assert_ne!(quote.required_quote_wei, "0");
    assert_ne!(quote.required_base_wei, "0");
}

#[tokio::test]
async fn straddling_band_solves_the_quote_for_a_named_base_amount() {
    let harness = PlannerHarness::at_tick(1000);
    let quote_request: RangeQuoteRequest = request(json!({
        "side": "double",
        "singleDepositAsset": "base",
        "amount": "1000",
        "rangeLowerUsd": 0.9,
        "rangeUpperUsd": 3000
    }));

    let quote = harness.planner.quote_range(&quote_request).await.unwrap();
    assert!(quote.tick_lower < 1000 && quote.tick_upper > 1000);
    assert_ne!(quote.required_base_wei, "0");
    assert_ne!(quote.required_quote_wei, "0");

    let by_pool_token: RangeQuoteRequest = request(json!({
        "amount0": "1000",
        "rangeLowerUsd": 0.9,
        "rangeUpperUsd": 3000
    }));
    assert_eq!(harness.planner.quote_range(&by_pool_token).await.unwrap(), quote);
}

#[tokio::test]
async fn equal_bounds_fail_before_any_read() {
    let harness = PlannerHarness::at_tick(1000);
    let quote_request: RangeQuoteRequest = request(json!({
        "amount0": "1",
        "rangeLowerUsd": 2000,
        "rangeUpperUsd": 2000
    }));

    let err = harness.planner.quote_range(&quote_request).await.unwrap_err();
    assert_eq!(err.code(), "invalid_range");
    assert_eq!(harness.provider.reads(), 0);
    assert_eq!(harness.oracle.lookups(), 0);
}

#[tokio::test]
async fn quote_only_deposit_needs_range_below_spot() {
    let harness = PlannerHarness::at_tick(1000);
    let quote_request: RangeQuoteRequest = request(json!({
        "side": "single",
        "singleDepositAsset": "quote",
        "amount": "5",
        "rangeLowerUsd": 2000,
        "rangeUpperUsd": 3000
    }));

    let err = harness.planner.quote_range(&quote_request).await.unwrap_err();
    assert_eq!(err.code(), "range_must_be_below_current");
}

#[tokio::test]
async fn lone_amount_on_the_wrong_side_of_spot_is_rejected() {
    let harness = PlannerHarness::at_tick(1000);
    // band above spot only holds base, but only quote was supplied
    let quote_request: RangeQuoteRequest = request(json!({
        "amount1": "5",
        "rangeLowerUsd": 2000,
        "rangeUpperUsd": 3000
    }));

    let err = harness.planner.quote_range(&quote_request).await.unwrap_err();
    assert_eq!(err.code(), "single_quote_requires_range_below_spot");
}

#[tokio::test]
async fn default_band_straddles_spot() {
    let harness = PlannerHarness::at_tick(1000);
    let quote_request: RangeQuoteRequest = request(json!({ "amount0": "10" }));

    let quote = harness.planner.quote_range(&quote_request).await.unwrap();
    assert!(quote.tick_lower < 1000 && quote.tick_upper > 1000);
    assert_ne!(quote.required_quote_wei, "0");
}

#[tokio::test]
async fn pool_read_failure_short_circuits() {
    let harness = PlannerHarness::at_tick(1000);
    harness.provider.fail_pool(base_quote_key());
    let quote_request: RangeQuoteRequest = request(json!({ "amount0": "10" }));

    let err = harness.planner.quote_range(&quote_request).await.unwrap_err();
    assert_eq!(err.code(), "pool_state_unavailable");
    assert!(err.is_upstream());
}

#[tokio::test]
async fn price_failure_short_circuits() {
    let harness = PlannerHarness::at_tick(1000);
    harness.oracle.fail(QUOTE);
    let quote_request: RangeQuoteRequest = request(json!({ "amount0": "10" }));

    let err = harness.planner.quote_range(&quote_request).await.unwrap_err();
    assert_matches!(err, PlanError::PriceUnavailable(ref message) if message.contains("feed down"));
}

#[tokio::test]
async fn mint_validates_recipient_and_slippage() {
    let harness = PlannerHarness::at_tick(1000);
    let missing: MintRequest = request(json!({ "amount0": "1" }));
    assert_eq!(harness.planner.plan_mint(&missing).await.unwrap_err().code(), "invalid_recipient");

    let steep: MintRequest = request(json!({
        "amount0": "1",
        "recipient": RECIPIENT.to_string(),
        "slippagePercent": 101
    }));
    assert_eq!(harness.planner.plan_mint(&steep).await.unwrap_err().code(), "invalid_slippage");
    assert_eq!(harness.provider.reads(), 0);
}

#[tokio::test]
async fn increase_completes_a_lone_amount() {
    let harness = PlannerHarness::at_tick(1000);
    let token_id = harness.add_position(7, TickRange { lower: -1200, upper: 3000 }, 1_000_000);
    let increase: IncreaseRequest = request(json!({ "tokenId": 7, "amount0": "10" }));

    let planned = harness.planner.plan_increase(&increase).await.unwrap();
    assert_eq!(planned.token_id, token_id.to_string());
    assert_eq!(planned.quote.tick_lower, -1200);
    assert_ne!(planned.quote.required_quote_wei, "0");

    let (actions, _) = actions(&planned.call);
    assert_eq!(actions, vec![Actions::IncreaseLiquidity as u8, Actions::SettlePair as u8]);
}

#[tokio::test]
async fn increase_rejects_positions_in_other_pools() {
    let harness = PlannerHarness::at_tick(1000);
    let range = TickRange { lower: -1200, upper: 3000 };
    let other = PoolKey { fee: alloy::primitives::aliases::U24::from(500), ..base_quote_key() };
    harness.provider.add_position(PositionDetails {
        token_id: U256::from(8),
        pool_key: other,
        range,
        liquidity: 1,
        fee_growth_inside0_last_x128: U256::ZERO,
        fee_growth_inside1_last_x128: U256::ZERO
    });
    let increase: IncreaseRequest = request(json!({ "tokenId": "8", "amount0": "10" }));

    let err = harness.planner.plan_increase(&increase).await.unwrap_err();
    assert_eq!(err, PlanError::PositionNotInPool { token_id: U256::from(8) });
}

#[tokio::test]
async fn collect_takes_both_currencies() {
    let harness = PlannerHarness::at_tick(1000);
    harness.add_position(3, TickRange { lower: 0, upper: 2000 }, 5);
    let collect: CollectRequest =
        request(json!({ "tokenId": "0x3", "recipient": RECIPIENT.to_string() }));

    let planned = harness.planner.plan_collect(&collect).await.unwrap();
    assert_eq!(planned.token_id, "3");
    let (actions, params) = actions(&planned.call);
    assert_eq!(actions, vec![Actions::DecreaseLiquidity as u8, Actions::TakePair as u8]);
    let decrease = DecreaseLiquidityParams::abi_decode_params(&params[0], true).unwrap();
    assert_eq!(decrease.liquidity, U256::ZERO);
}

#[tokio::test]
async fn collect_of_unknown_position_is_upstream_failure() {
    let harness = PlannerHarness::at_tick(1000);
    let collect: CollectRequest =
        request(json!({ "tokenId": 99, "recipient": RECIPIENT.to_string() }));
    let err = harness.planner.plan_collect(&collect).await.unwrap_err();
    assert_eq!(err.code(), "position_unavailable");
}

#[tokio::test]
async fn compound_reinvests_unclaimed_fees() {
    let harness = PlannerHarness::at_tick(1000);
    let range = TickRange { lower: -1200, upper: 3000 };
    harness.add_position(4, range, 10_u128.pow(18));
    harness.provider.set_fee_growth(
        base_quote_key(),
        range,
        FeeGrowthInside { fee_growth_inside0_x128: Q128, fee_growth_inside1_x128: Q128 }
    );
    let compound: CompoundRequest = request(json!({ "tokenId": 4 }));

    let planned = harness.planner.plan_compound(&compound).await.unwrap();
    assert_ne!(planned.liquidity, "0");
    assert!(U256::from_str(&planned.amount0_used).unwrap() <= tokens(1) + U256::from(1));
    assert_eq!(planned.call.value, "0");
    let (actions, _) = actions(&planned.call);
    assert_eq!(
        actions,
        vec![
            Actions::DecreaseLiquidity as u8,
            Actions::IncreaseLiquidity as u8,
            Actions::CloseCurrency as u8,
            Actions::CloseCurrency as u8
        ]
    );
}

#[tokio::test]
async fn compound_without_fees_has_nothing_to_add() {
    let harness = PlannerHarness::at_tick(1000);
    let range = TickRange { lower: -1200, upper: 3000 };
    harness.add_position(5, range, 10_u128.pow(18));
    harness
        .provider
        .set_fee_growth(base_quote_key(), range, FeeGrowthInside::default());
    let compound: CompoundRequest = request(json!({ "tokenId": 5 }));

    let err = harness.planner.plan_compound(&compound).await.unwrap_err();
    assert_eq!(err.code(), "zero_liquidity");
}

#[tokio::test]
async fn withdraw_half_keeps_slippage_minimums() {
    let harness = PlannerHarness::at_tick(1000);
    let range = TickRange { lower: -1200, upper: 3000 };
    harness.add_position(6, range, 1_000_000_000_000);
    let withdraw: WithdrawRequest = request(json!({
        "tokenId": 6,
        "recipient": RECIPIENT.to_string(),
        "percent": 50,
        "slippagePercent": 1
    }));

    let planned = harness.planner.plan_withdraw(&withdraw).await.unwrap();
    assert_eq!(planned.liquidity_removed, "500000000000");
    assert!(!planned.burn);
    assert_ne!(planned.amount0_min, "0");
    assert_ne!(planned.amount1_min, "0");

    let (actions, params) = actions(&planned.call);
    assert_eq!(actions, vec![Actions::DecreaseLiquidity as u8, Actions::TakePair as u8]);
    let decrease = DecreaseLiquidityParams::abi_decode_params(&params[0], true).unwrap();
    assert_eq!(decrease.liquidity, U256::from(500_000_000_000_u64));
    assert_eq!(decrease.amount0Min.to_string(), planned.amount0_min);
}

#[tokio::test]
async fn withdraw_burns_only_the_whole_position() {
    let harness = PlannerHarness::at_tick(1000);
    harness.add_position(9, TickRange { lower: -1200, upper: 3000 }, 1_000);

    let partial: WithdrawRequest = request(json!({
        "tokenId": 9,
        "recipient": RECIPIENT.to_string(),
        "percent": 50,
        "burn": true
    }));
    let err = harness.planner.plan_withdraw(&partial).await.unwrap_err();
    assert_eq!(err.code(), "invalid_percent");

    let whole: WithdrawRequest =
        request(json!({ "tokenId": 9, "recipient": RECIPIENT.to_string(), "burn": true }));
    let planned = harness.planner.plan_withdraw(&whole).await.unwrap();
    assert!(planned.burn);
    assert_eq!(planned.liquidity_removed, "1000");
    let (actions, _) = actions(&planned.call);
    assert_eq!(actions, vec![Actions::BurnPosition as u8, Actions::TakePair as u8]);
}

#[tokio::test]
async fn settled_fees_report_zero_unclaimed() {
    let harness = PlannerHarness::at_tick(1000);
    let range = TickRange { lower: 0, upper: 2000 };
    let five = U256::from(5);
    harness.provider.add_position(PositionDetails {
        token_id: U256::from(1),
        pool_key: base_quote_key(),
        range,
        liquidity: 1_000_000,
        fee_growth_inside0_last_x128: five,
        fee_growth_inside1_last_x128: U256::ZERO
    });
    harness.provider.set_fee_growth(
        base_quote_key(),
        range,
        FeeGrowthInside { fee_growth_inside0_x128: five, fee_growth_inside1_x128: U256::ZERO }
    );

    let fees = harness.planner.position_fees(U256::from(1)).await.unwrap();
    assert_eq!(fees.unclaimed0, "0");
    assert_eq!(fees.unclaimed1, "0");
}

#[tokio::test]
async fn fees_are_valued_in_usd_when_both_tokens_price() {
    let harness = PlannerHarness::at_tick(1000);
    let range = TickRange { lower: 0, upper: 2000 };
    let token_id = harness.add_position(2, range, 1_000_000);
    let growth = Q128 * U256::from(10_u64.pow(12));
    harness.provider.set_fee_growth(
        base_quote_key(),
        range,
        FeeGrowthInside { fee_growth_inside0_x128: growth, fee_growth_inside1_x128: growth }
    );

    let unpriced = harness.planner.position_fees(token_id).await.unwrap();
    assert_eq!(unpriced.unclaimed0, tokens(1).to_string());
    assert_eq!(unpriced.unclaimed_usd, None);

    harness.oracle.set_price(BASE, 2.0);
    let priced = harness.planner.position_fees(token_id).await.unwrap();
    let unclaimed_usd = priced.unclaimed_usd.unwrap();
    assert!((unclaimed_usd - 3.0).abs() < 1e-9, "{unclaimed_usd}");
    assert_eq!(priced.lifetime_usd, priced.unclaimed_usd);
}

#[tokio::test]
async fn batch_fees_isolate_failures() {
    let harness = PlannerHarness::at_tick(1000);
    let range = TickRange { lower: 0, upper: 2000 };
    let good = harness.add_position(1, range, 1_000_000);
    let broken = harness.add_position(2, range, 1_000_000);
    harness.provider.fail_position(broken);
    harness
        .provider
        .set_fee_growth(base_quote_key(), range, FeeGrowthInside::default());

    let items = harness
        .planner
        .positions_fees(&[good, broken, U256::from(3)])
        .await;
    assert_eq!(items.len(), 3);
    assert_matches!(&items[0], FeesItem::Ok(fees) if fees.token_id == "1");
    assert_matches!(
        &items[1],
        FeesItem::Err(failure)
            if failure.token_id == "2" && failure.error == "position_unavailable"
    );
    assert_matches!(&items[2], FeesItem::Err(failure) if failure.token_id == "3");
}

#[tokio::test]
async fn deadline_follows_the_clock() {
    let harness = PlannerHarness::at_tick(1000);
    harness.add_position(3, TickRange { lower: 0, upper: 2000 }, 5);
    let collect: CollectRequest =
        request(json!({ "tokenId": 3, "recipient": RECIPIENT.to_string() }));

    harness.clock.advance(Duration::from_secs(60));
    let planned = harness.planner.plan_collect(&collect).await.unwrap();
    assert_eq!(planned.call.deadline, (NOW + 660).to_string());

    harness.clock.set(Duration::from_secs(NOW - 3600));
    let planned = harness.planner.plan_collect(&collect).await.unwrap();
    assert_eq!(planned.call.deadline, (NOW - 3000).to_string());
}
