use std::collections::HashMap;

use alloy::primitives::Address;
use eyre::eyre;

use crate::common::{PriceOracle, ProviderFuture};

/// USD prices pinned in config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticPriceOracle {
    prices: HashMap<Address, f64>
}

impl StaticPriceOracle {
    pub fn new(prices: HashMap<Address, f64>) -> Self {
        Self { prices }
    }

    pub fn with_price(mut self, token: Address, usd: f64) -> Self {
        self.prices.insert(token, usd);
        self
    }

    pub fn get(&self, token: &Address) -> Option<f64> {
        self.prices.get(token).copied()
    }
}

impl PriceOracle for StaticPriceOracle {
    fn usd_price(&self, token: Address) -> ProviderFuture<'_, f64> {
        let price = self
            .get(&token)
            .ok_or_else(|| eyre!("no fixed usd price for {token}"));
        Box::pin(async move { price })
    }
}
