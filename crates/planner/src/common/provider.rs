use std::{future::Future, pin::Pin};

use alloy::primitives::{Address, U256};
use m00n_types::{
    contract_bindings::position_manager::PoolKey,
    pool::{FeeGrowthInside, PoolState, PositionDetails, TickRange},
    token::TokenMetadata
};

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = eyre::Result<T>> + Send + 'a>>;

/// Read access to pool and position state. Every call is a fresh read, nothing
/// here is cached.
#[auto_impl::auto_impl(&, Arc)]
pub trait PoolStateProvider: Send + Sync {
    fn pool_state(&self, key: PoolKey) -> ProviderFuture<'_, PoolState>;

    fn position_details(&self, token_id: U256) -> ProviderFuture<'_, PositionDetails>;

    fn fee_growth_inside(
        &self,
        key: PoolKey,
        range: TickRange
    ) -> ProviderFuture<'_, FeeGrowthInside>;

    /// Resolves to [`TokenMetadata::Unknown`] rather than failing when the
    /// token does not answer the metadata calls.
    fn token_metadata(&self, token: Address) -> ProviderFuture<'_, TokenMetadata>;
}

#[auto_impl::auto_impl(&, Arc)]
pub trait PriceOracle: Send + Sync {
    /// USD value of one whole token (not one base unit).
    fn usd_price(&self, token: Address) -> ProviderFuture<'_, f64>;
}
