use std::sync::Arc;

use alloy_primitives::{address, Address, U256};
use m00n_types::{
    contract_bindings::{ext::PoolKeyExt, position_manager::PoolKey},
    pool::{PoolState, PositionDetails, TickRange},
    token::PairOrientation
};
use planner::{config::PlanningConfig, encoder::CallEncoder, PositionPlanner};

use crate::mocks::{ManualClock, MockPoolProvider, MockPriceOracle};

pub const BASE: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
pub const QUOTE: Address = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
pub const POSITION_MANAGER: Address = address!("1111111111111111111111111111111111111111");
pub const RECIPIENT: Address = address!("2222222222222222222222222222222222222222");
pub const SPACING: i32 = 200;
pub const NOW: u64 = 1_700_000_000;

pub type TestPlanner =
    PositionPlanner<Arc<MockPoolProvider>, Arc<MockPriceOracle>, Arc<ManualClock>>;

/// 18 decimal base/quote pool with base as token0.
pub fn base_quote_key() -> PoolKey {
    PoolKey::new_sorted(BASE, QUOTE, 3000, SPACING, Address::ZERO)
        .expect("fixture pool key is valid")
}

pub fn base_quote_pair() -> PairOrientation {
    PairOrientation::new(&base_quote_key(), BASE, 18, QUOTE, 18).expect("fixture pair is valid")
}

/// Whole tokens to 18 decimal base units.
pub fn tokens(whole: u64) -> U256 {
    U256::from(whole) * U256::from(10_u64.pow(18))
}

/// Everything a planner flow test touches, with the pool at `tick` and the
/// quote token at one dollar.
pub struct PlannerHarness {
    pub provider: Arc<MockPoolProvider>,
    pub oracle:   Arc<MockPriceOracle>,
    pub clock:    Arc<ManualClock>,
    pub planner:  TestPlanner
}

impl PlannerHarness {
    pub fn at_tick(tick: i32) -> Self {
        let key = base_quote_key();
        let state = PoolState::at_tick(tick, 10_u128.pow(24)).expect("fixture tick is valid");
        let provider = Arc::new(
            MockPoolProvider::default()
                .with_pool(key, state)
                .with_token(BASE, "m00n", 18)
                .with_token(QUOTE, "MON", 18)
        );
        let oracle = Arc::new(MockPriceOracle::default().with_price(QUOTE, 1.0));
        let clock = Arc::new(ManualClock::at_unix_secs(NOW));

        let planning = PlanningConfig::default();
        let encoder = CallEncoder::new(POSITION_MANAGER, planning.deadline_secs, clock.clone());
        let planner = PositionPlanner::new(
            provider.clone(),
            oracle.clone(),
            encoder,
            key,
            base_quote_pair(),
            planning
        );
        Self { provider, oracle, clock, planner }
    }

    /// Registers a position owned in the fixture pool.
    pub fn add_position(&self, token_id: u64, range: TickRange, liquidity: u128) -> U256 {
        let token_id = U256::from(token_id);
        self.provider.add_position(PositionDetails {
            token_id,
            pool_key: base_quote_key(),
            range,
            liquidity,
            fee_growth_inside0_last_x128: U256::ZERO,
            fee_growth_inside1_last_x128: U256::ZERO
        });
        token_id
    }
}
