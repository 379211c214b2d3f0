use alloy::primitives::Address;

use crate::contract_bindings::{ext::PoolKeyExt, position_manager::PoolKey};

/// ERC-20 metadata, or an explicit marker that it could not be read. Callers
/// must not substitute a made up symbol or decimals for `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenMetadata {
    Known { address: Address, symbol: String, decimals: u8 },
    Unknown { address: Address }
}

impl TokenMetadata {
    pub fn address(&self) -> Address {
        match self {
            Self::Known { address, .. } | Self::Unknown { address } => *address
        }
    }

    pub fn decimals(&self) -> Option<u8> {
        match self {
            Self::Known { decimals, .. } => Some(*decimals),
            Self::Unknown { .. } => None
        }
    }

    pub fn symbol(&self) -> Option<&str> {
        match self {
            Self::Known { symbol, .. } => Some(symbol.as_str()),
            Self::Unknown { .. } => None
        }
    }
}

/// Which side of the m00n pair a user is talking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairAsset {
    Base,
    Quote
}

/// Which side of the pool key a token sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolToken {
    Token0,
    Token1
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrientationError {
    #[error("token {0} is not part of the pool")]
    NotInPool(Address),
    #[error("base and quote are the same token {0}")]
    SameToken(Address)
}

/// Maps the user facing base/quote view of a pair onto the pool's
/// token0/token1 ordering, and human prices onto raw pool prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairOrientation {
    pub base:           Address,
    pub quote:          Address,
    pub base_is_token0: bool,
    pub decimals0:      u8,
    pub decimals1:      u8
}

impl PairOrientation {
    pub fn new(
        key: &PoolKey,
        base: Address,
        base_decimals: u8,
        quote: Address,
        quote_decimals: u8
    ) -> Result<Self, OrientationError> {
        if base == quote {
            return Err(OrientationError::SameToken(base))
        }
        for token in [base, quote] {
            if !key.contains(token) {
                return Err(OrientationError::NotInPool(token))
            }
        }
        let base_is_token0 = key.currency0 == base;
        let (decimals0, decimals1) = if base_is_token0 {
            (base_decimals, quote_decimals)
        } else {
            (quote_decimals, base_decimals)
        };

        Ok(Self { base, quote, base_is_token0, decimals0, decimals1 })
    }

    pub fn pool_token(&self, asset: PairAsset) -> PoolToken {
        match (asset, self.base_is_token0) {
            (PairAsset::Base, true) | (PairAsset::Quote, false) => PoolToken::Token0,
            _ => PoolToken::Token1
        }
    }

    pub fn pair_asset(&self, token: PoolToken) -> PairAsset {
        match (token, self.base_is_token0) {
            (PoolToken::Token0, true) | (PoolToken::Token1, false) => PairAsset::Base,
            _ => PairAsset::Quote
        }
    }

    pub fn decimals(&self, asset: PairAsset) -> u8 {
        match self.pool_token(asset) {
            PoolToken::Token0 => self.decimals0,
            PoolToken::Token1 => self.decimals1
        }
    }

    /// Quote per base (human units) to raw pool price (token1 base units per
    /// token0 base unit).
    pub fn raw_price(&self, quote_per_base: f64) -> f64 {
        let human_1_over_0 = if self.base_is_token0 { quote_per_base } else { quote_per_base.recip() };
        human_1_over_0 * self.decimal_shift()
    }

    /// Inverse of [`Self::raw_price`].
    pub fn quote_per_base(&self, raw_price: f64) -> f64 {
        let human_1_over_0 = raw_price / self.decimal_shift();
        if self.base_is_token0 {
            human_1_over_0
        } else {
            human_1_over_0.recip()
        }
    }

    fn decimal_shift(&self) -> f64 {
        10f64.powi(self.decimals1 as i32 - self.decimals0 as i32)
    }
}
