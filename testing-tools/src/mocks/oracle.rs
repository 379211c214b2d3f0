use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicUsize, Ordering}
};

use alloy_primitives::Address;
use eyre::eyre;
use parking_lot::RwLock;
use planner::common::{PriceOracle, ProviderFuture};

/// Price feed backed by a map. Tokens marked failing error out even when a
/// price is set.
#[derive(Debug, Default)]
pub struct MockPriceOracle {
    prices:  RwLock<HashMap<Address, f64>>,
    failing: RwLock<HashSet<Address>>,
    lookups: AtomicUsize
}

impl MockPriceOracle {
    pub fn with_price(self, token: Address, usd: f64) -> Self {
        self.set_price(token, usd);
        self
    }

    pub fn set_price(&self, token: Address, usd: f64) {
        self.prices.write().insert(token, usd);
    }

    pub fn fail(&self, token: Address) {
        self.failing.write().insert(token);
    }

    /// Number of `usd_price` calls so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl PriceOracle for MockPriceOracle {
    fn usd_price(&self, token: Address) -> ProviderFuture<'_, f64> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let price = if self.failing.read().contains(&token) {
            Err(eyre!("price feed down for {token}"))
        } else {
            self.prices
                .read()
                .get(&token)
                .copied()
                .ok_or_else(|| eyre!("no price for {token}"))
        };
        Box::pin(async move { price })
    }
}
