mod cached;
mod fixed;

use std::collections::{HashMap, HashSet};

use alloy::primitives::Address;
pub use cached::CachedPriceOracle;
use eyre::{bail, eyre, Context};
pub use fixed::StaticPriceOracle;
use itertools::Itertools;
use m00n_types::{contract_bindings::position_manager::PoolKey, pair_with_price::PairWithPrice};

use crate::{
    common::{PoolStateProvider, PriceOracle, ProviderFuture},
    config::OracleConfig
};

/// The token price generator gives the USD price of a token from the spot
/// price of the pools on its configured route. Every route ends at a USD
/// pegged token, or at a token with a fixed price. We assume any token we care
/// about has such an anchor at most two hops away, so there is no route
/// search, just the configured walk.
pub struct TokenPriceGenerator<P> {
    provider:   P,
    usd_pegged: HashSet<Address>,
    fixed:      StaticPriceOracle,
    routes:     HashMap<Address, Vec<PoolKey>>
}

impl<P: PoolStateProvider> TokenPriceGenerator<P> {
    pub fn new(
        provider: P,
        usd_pegged: impl IntoIterator<Item = Address>,
        fixed: StaticPriceOracle
    ) -> Self {
        Self {
            provider,
            usd_pegged: usd_pegged.into_iter().collect(),
            fixed,
            routes: HashMap::new()
        }
    }

    pub fn with_route(mut self, token: Address, pools: Vec<PoolKey>) -> Self {
        self.routes.insert(token, pools);
        self
    }

    pub fn from_config(provider: P, config: &OracleConfig) -> eyre::Result<Self> {
        let fixed = StaticPriceOracle::new(config.fixed.clone());
        let mut this = Self::new(provider, config.usd_pegged.iter().copied(), fixed);
        for route in &config.routes {
            let pools = route
                .pools
                .iter()
                .map(|pool| pool.pool_key())
                .collect::<eyre::Result<Vec<_>>>()
                .wrap_err_with(|| format!("route for {}", route.token))?;
            this = this.with_route(route.token, pools);
        }
        Ok(this)
    }

    /// A price for the end of a route, without walking any pool.
    fn anchor_price(&self, token: &Address) -> Option<f64> {
        if self.usd_pegged.contains(token) {
            return Some(1.0)
        }
        self.fixed.get(token)
    }

    /// Units of the counterpart one `from` is worth in `key`, and that
    /// counterpart.
    async fn hop(&self, key: PoolKey, from: Address) -> eyre::Result<(f64, Address)> {
        let (state, meta0, meta1) = futures::try_join!(
            self.provider.pool_state(key),
            self.provider.token_metadata(key.currency0),
            self.provider.token_metadata(key.currency1)
        )?;
        let decimals0 = meta0
            .decimals()
            .ok_or_else(|| eyre!("decimals of {} unknown", key.currency0))?;
        let decimals1 = meta1
            .decimals()
            .ok_or_else(|| eyre!("decimals of {} unknown", key.currency1))?;

        let pair = PairWithPrice::from_pool_state(&key, &state, decimals0, decimals1);
        let price = pair
            .price_of(from)
            .ok_or_else(|| eyre!("{from} is not in pool {}/{}", key.currency0, key.currency1))?;
        let next = pair
            .counterpart(from)
            .ok_or_else(|| eyre!("{from} is not in pool {}/{}", key.currency0, key.currency1))?;
        Ok((price, next))
    }

    async fn route_price(&self, token: Address) -> eyre::Result<f64> {
        let Some(route) = self.routes.get(&token) else {
            bail!(
                "no usd route for {token}, routes are configured for [{}]",
                self.routes.keys().sorted().join(", ")
            )
        };

        let mut price = 1.0;
        let mut current = token;
        for key in route {
            let (hop_price, next) = self.hop(*key, current).await?;
            tracing::trace!(from = %current, to = %next, hop_price, "priced route hop");
            price *= hop_price;
            current = next;
        }

        let anchor = self
            .anchor_price(&current)
            .ok_or_else(|| eyre!("route for {token} ends at {current}, which has no usd price"))?;
        let usd = price * anchor;
        if !usd.is_finite() || usd <= 0.0 {
            bail!("route for {token} priced it at {usd}")
        }
        Ok(usd)
    }
}

impl<P: PoolStateProvider> PriceOracle for TokenPriceGenerator<P> {
    fn usd_price(&self, token: Address) -> ProviderFuture<'_, f64> {
        Box::pin(async move {
            if let Some(price) = self.anchor_price(&token) {
                return Ok(price)
            }
            let price = self.route_price(token).await?;
            tracing::debug!(%token, price, "priced token via pool route");
            Ok(price)
        })
    }
}
