use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicUsize, Ordering}
};

use alloy_primitives::{Address, U256};
use eyre::eyre;
use m00n_types::{
    contract_bindings::position_manager::PoolKey,
    pool::{FeeGrowthInside, PoolState, PositionDetails, TickRange},
    token::TokenMetadata
};
use parking_lot::RwLock;
use planner::common::{PoolStateProvider, ProviderFuture};

/// Pool and position state held in memory. Reads of anything not set, or
/// explicitly marked failing, resolve to an error the way a failed rpc call
/// would.
#[derive(Debug, Default)]
pub struct MockPoolProvider {
    pools:             RwLock<HashMap<PoolKey, PoolState>>,
    positions:         RwLock<HashMap<U256, PositionDetails>>,
    fee_growth:        RwLock<HashMap<(PoolKey, TickRange), FeeGrowthInside>>,
    tokens:            RwLock<HashMap<Address, TokenMetadata>>,
    failing_pools:     RwLock<HashSet<PoolKey>>,
    failing_positions: RwLock<HashSet<U256>>,
    reads:             AtomicUsize
}

impl MockPoolProvider {
    pub fn with_pool(self, key: PoolKey, state: PoolState) -> Self {
        self.set_pool(key, state);
        self
    }

    pub fn with_token(self, address: Address, symbol: &str, decimals: u8) -> Self {
        self.tokens
            .write()
            .insert(address, TokenMetadata::Known { address, symbol: symbol.into(), decimals });
        self
    }

    pub fn set_pool(&self, key: PoolKey, state: PoolState) {
        self.pools.write().insert(key, state);
    }

    pub fn add_position(&self, position: PositionDetails) {
        self.positions.write().insert(position.token_id, position);
    }

    pub fn set_fee_growth(&self, key: PoolKey, range: TickRange, growth: FeeGrowthInside) {
        self.fee_growth.write().insert((key, range), growth);
    }

    pub fn fail_pool(&self, key: PoolKey) {
        self.failing_pools.write().insert(key);
    }

    pub fn fail_position(&self, token_id: U256) {
        self.failing_positions.write().insert(token_id);
    }

    /// Number of reads served or refused so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn read<T: Send + 'static>(&self, result: eyre::Result<T>) -> ProviderFuture<'_, T> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { result })
    }
}

impl PoolStateProvider for MockPoolProvider {
    fn pool_state(&self, key: PoolKey) -> ProviderFuture<'_, PoolState> {
        let result = if self.failing_pools.read().contains(&key) {
            Err(eyre!("rpc timeout reading slot0"))
        } else {
            self.pools
                .read()
                .get(&key)
                .copied()
                .ok_or_else(|| eyre!("pool {}/{} is not initialized", key.currency0, key.currency1))
        };
        self.read(result)
    }

    fn position_details(&self, token_id: U256) -> ProviderFuture<'_, PositionDetails> {
        let result = if self.failing_positions.read().contains(&token_id) {
            Err(eyre!("rpc timeout reading position {token_id}"))
        } else {
            self.positions
                .read()
                .get(&token_id)
                .cloned()
                .ok_or_else(|| eyre!("position {token_id} does not exist"))
        };
        self.read(result)
    }

    fn fee_growth_inside(
        &self,
        key: PoolKey,
        range: TickRange
    ) -> ProviderFuture<'_, FeeGrowthInside> {
        let result = if self.failing_pools.read().contains(&key) {
            Err(eyre!("rpc timeout reading fee growth"))
        } else {
            self.fee_growth
                .read()
                .get(&(key, range))
                .copied()
                .ok_or_else(|| eyre!("no fee growth for [{}, {})", range.lower, range.upper))
        };
        self.read(result)
    }

    fn token_metadata(&self, token: Address) -> ProviderFuture<'_, TokenMetadata> {
        let metadata = self
            .tokens
            .read()
            .get(&token)
            .cloned()
            .unwrap_or(TokenMetadata::Unknown { address: token });
        self.read(Ok(metadata))
    }
}
