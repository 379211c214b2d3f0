use alloy::{
    primitives::{
        aliases::{I24, U24},
        keccak256, Address, B256
    },
    sol_types::SolValue
};

use crate::contract_bindings::position_manager::PoolKey;

/// Fee flag marking a pool whose fee is set by its hook.
pub const DYNAMIC_FEE_FLAG: u32 = 0x80_0000;
/// Largest value a uint24 fee or int24 spacing can carry.
const MAX_U24: u32 = 0xFF_FFFF;
const MAX_TICK_SPACING: i32 = 32_767;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolKeyError {
    #[error("pool currencies must differ, got {0} twice")]
    IdenticalCurrencies(Address),
    #[error("tick spacing {0} is outside 1..=32767")]
    InvalidTickSpacing(i32),
    #[error("fee {0} does not fit in a uint24")]
    FeeOutOfRange(u32)
}

pub trait PoolKeyExt: Sized {
    /// Builds a key with the two tokens in canonical order (lower address is
    /// currency0).
    fn new_sorted(
        token_a: Address,
        token_b: Address,
        fee: u32,
        tick_spacing: i32,
        hooks: Address
    ) -> Result<Self, PoolKeyError>;

    /// `keccak256(abi.encode(key))`, the id used by the pool manager and state
    /// view.
    fn pool_id(&self) -> B256;

    fn tick_spacing(&self) -> i32;

    fn fee_pips(&self) -> u32;

    fn is_dynamic_fee(&self) -> bool;

    /// The native asset is the zero address, so it can only ever be currency0.
    fn native_currency(&self) -> Option<Address>;

    fn contains(&self, token: Address) -> bool;
}

impl PoolKeyExt for PoolKey {
    fn new_sorted(
        token_a: Address,
        token_b: Address,
        fee: u32,
        tick_spacing: i32,
        hooks: Address
    ) -> Result<Self, PoolKeyError> {
        if token_a == token_b {
            return Err(PoolKeyError::IdenticalCurrencies(token_a))
        }
        if !(1..=MAX_TICK_SPACING).contains(&tick_spacing) {
            return Err(PoolKeyError::InvalidTickSpacing(tick_spacing))
        }
        if fee > MAX_U24 {
            return Err(PoolKeyError::FeeOutOfRange(fee))
        }
        let (currency0, currency1) =
            if token_a < token_b { (token_a, token_b) } else { (token_b, token_a) };

        Ok(PoolKey {
            currency0,
            currency1,
            fee: U24::from(fee),
            tickSpacing: I24::try_from(tick_spacing)
                .map_err(|_| PoolKeyError::InvalidTickSpacing(tick_spacing))?,
            hooks
        })
    }

    fn pool_id(&self) -> B256 {
        keccak256(self.abi_encode())
    }

    fn tick_spacing(&self) -> i32 {
        self.tickSpacing.as_i32()
    }

    fn fee_pips(&self) -> u32 {
        self.fee.to::<u32>()
    }

    fn is_dynamic_fee(&self) -> bool {
        self.fee_pips() == DYNAMIC_FEE_FLAG
    }

    fn native_currency(&self) -> Option<Address> {
        (self.currency0 == Address::ZERO).then_some(Address::ZERO)
    }

    fn contains(&self, token: Address) -> bool {
        self.currency0 == token || self.currency1 == token
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn sorts_currencies() {
        let high = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
        let low = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        let key = PoolKey::new_sorted(high, low, 3000, 60, Address::ZERO).unwrap();
        assert_eq!(key.currency0, low);
        assert_eq!(key.currency1, high);
        assert_eq!(key.tick_spacing(), 60);
        assert_eq!(key.fee_pips(), 3000);
        assert!(key.native_currency().is_none());
    }

    #[test]
    fn rejects_bad_keys() {
        let a = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        let b = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
        assert_matches!(
            PoolKey::new_sorted(a, a, 3000, 60, Address::ZERO),
            Err(PoolKeyError::IdenticalCurrencies(_))
        );
        assert_matches!(
            PoolKey::new_sorted(a, b, 3000, 0, Address::ZERO),
            Err(PoolKeyError::InvalidTickSpacing(0))
        );
        assert_matches!(
            PoolKey::new_sorted(a, b, 0x100_0000, 60, Address::ZERO),
            Err(PoolKeyError::FeeOutOfRange(_))
        );
    }

    #[test]
    fn native_pool_and_dynamic_fee() {
        let token = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
        let key =
            PoolKey::new_sorted(token, Address::ZERO, DYNAMIC_FEE_FLAG, 200, Address::ZERO).unwrap();
        assert_eq!(key.native_currency(), Some(Address::ZERO));
        assert!(key.is_dynamic_fee());
        assert!(key.contains(token));
    }

    #[test]
    fn pool_id_depends_on_every_field() {
        let a = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        let b = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
        let base = PoolKey::new_sorted(a, b, 3000, 60, Address::ZERO).unwrap();
        let other_fee = PoolKey::new_sorted(a, b, 500, 60, Address::ZERO).unwrap();
        let other_spacing = PoolKey::new_sorted(a, b, 3000, 10, Address::ZERO).unwrap();
        assert_eq!(base.pool_id(), PoolKey::new_sorted(b, a, 3000, 60, Address::ZERO).unwrap().pool_id());
        assert_ne!(base.pool_id(), other_fee.pool_id());
        assert_ne!(base.pool_id(), other_spacing.pool_id());
    }
}
