use alloy::primitives::Address;

use crate::common::{Clock, PriceOracle, ProviderFuture, SystemClock, TtlCache};

/// Remembers another oracle's answers for the cache's ttl. Failures are not
/// cached.
pub struct CachedPriceOracle<O, C = SystemClock> {
    inner: O,
    cache: TtlCache<Address, f64, C>
}

impl<O, C> CachedPriceOracle<O, C>
where
    O: PriceOracle,
    C: Clock
{
    pub fn new(inner: O, cache: TtlCache<Address, f64, C>) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &TtlCache<Address, f64, C> {
        &self.cache
    }
}

impl<O, C> PriceOracle for CachedPriceOracle<O, C>
where
    O: PriceOracle,
    C: Clock
{
    fn usd_price(&self, token: Address) -> ProviderFuture<'_, f64> {
        Box::pin(async move {
            if let Some(price) = self.cache.get(&token) {
                tracing::trace!(%token, price, "usd price cache hit");
                return Ok(price)
            }
            let price = self.inner.usd_price(token).await?;
            self.cache.insert(token, price);
            Ok(price)
        })
    }
}
