use std::{collections::HashMap, path::Path};

use alloy::primitives::Address;
use eyre::{bail, eyre, Context};
use m00n_types::{
    contract_bindings::{ext::PoolKeyExt, position_manager::PoolKey},
    token::PairOrientation
};
use serde::Deserialize;
use url::Url;

/// Routes longer than this are not worth the extra reads.
pub const MAX_ROUTE_HOPS: usize = 2;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlannerConfig {
    pub rpc_url:   String,
    pub chain_id:  u64,
    pub contracts: ContractsConfig,
    pub pool:      PoolConfig,
    pub pair:      PairConfig,
    #[serde(default)]
    pub planning:  PlanningConfig,
    #[serde(default)]
    pub oracle:    OracleConfig
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ContractsConfig {
    pub position_manager: Address,
    pub state_view:       Address
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PoolConfig {
    pub currency0:    Address,
    pub currency1:    Address,
    pub fee:          u32,
    pub tick_spacing: i32,
    #[serde(default)]
    pub hooks:        Address
}

impl PoolConfig {
    /// The pool key, refusing currencies given out of canonical order rather
    /// than silently flipping them.
    pub fn pool_key(&self) -> eyre::Result<PoolKey> {
        let key = PoolKey::new_sorted(
            self.currency0,
            self.currency1,
            self.fee,
            self.tick_spacing,
            self.hooks
        )?;
        if key.currency0 != self.currency0 {
            bail!(
                "pool currencies must be sorted, {} should come before {}",
                self.currency1,
                self.currency0
            )
        }
        Ok(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenConfig {
    pub address:  Address,
    pub symbol:   String,
    pub decimals: u8
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PairConfig {
    pub base:  TokenConfig,
    pub quote: TokenConfig
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct BandConfig {
    pub lower_multiplier: f64,
    pub upper_multiplier: f64
}

impl Default for BandConfig {
    fn default() -> Self {
        Self { lower_multiplier: 0.5, upper_multiplier: 2.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    pub deadline_secs:        u64,
    pub default_slippage_bps: u32,
    /// Band around the spot price used when a request names no USD bounds.
    pub default_band:         BandConfig
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self { deadline_secs: 600, default_slippage_bps: 500, default_band: BandConfig::default() }
    }
}

/// Pools to walk from `token` to a USD pegged token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteConfig {
    pub token: Address,
    pub pools: Vec<PoolConfig>
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub cache_ttl_secs: u64,
    pub cache_capacity: u32,
    pub usd_pegged:     Vec<Address>,
    pub routes:         Vec<RouteConfig>,
    /// Fixed USD prices, checked before any route.
    pub fixed:          HashMap<Address, f64>
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 30,
            cache_capacity: 256,
            usd_pegged:     Vec::new(),
            routes:         Vec::new(),
            fixed:          HashMap::new()
        }
    }
}

impl PlannerConfig {
    pub fn load(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&raw).wrap_err_with(|| format!("loading config {}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> eyre::Result<Self> {
        let config: Self = toml::from_str(raw).wrap_err("parsing config toml")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        self.rpc_url()?;
        self.pair_orientation()?;

        let planning = &self.planning;
        if planning.deadline_secs == 0 {
            bail!("planning.deadline_secs must be positive")
        }
        if planning.default_slippage_bps > 10_000 {
            bail!("planning.default_slippage_bps {} exceeds 100%", planning.default_slippage_bps)
        }
        let band = planning.default_band;
        if !(band.lower_multiplier > 0.0
            && band.upper_multiplier.is_finite()
            && band.lower_multiplier < band.upper_multiplier)
        {
            bail!(
                "planning.default_band needs 0 < lower_multiplier < upper_multiplier, got {} and {}",
                band.lower_multiplier,
                band.upper_multiplier
            )
        }

        if self.oracle.cache_capacity == 0 {
            bail!("oracle.cache_capacity must be positive")
        }
        for (token, price) in &self.oracle.fixed {
            if !price.is_finite() || *price <= 0.0 {
                bail!("oracle.fixed price {price} for {token} must be positive")
            }
        }
        for route in &self.oracle.routes {
            if route.pools.is_empty() || route.pools.len() > MAX_ROUTE_HOPS {
                bail!(
                    "route for {} has {} pools, expected 1 to {MAX_ROUTE_HOPS}",
                    route.token,
                    route.pools.len()
                )
            }
            for pool in &route.pools {
                pool.pool_key().wrap_err_with(|| format!("route for {}", route.token))?;
            }
        }
        Ok(())
    }

    pub fn rpc_url(&self) -> eyre::Result<Url> {
        self.rpc_url
            .parse()
            .wrap_err_with(|| format!("invalid rpc_url {:?}", self.rpc_url))
    }

    pub fn pool_key(&self) -> eyre::Result<PoolKey> {
        self.pool.pool_key().wrap_err("invalid [pool]")
    }

    pub fn pair_orientation(&self) -> eyre::Result<PairOrientation> {
        let key = self.pool_key()?;
        let (base, quote) = (&self.pair.base, &self.pair.quote);
        PairOrientation::new(&key, base.address, base.decimals, quote.address, quote.decimals)
            .map_err(|e| eyre!("invalid [pair]: {e}"))
    }
}
