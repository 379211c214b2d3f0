use alloy::primitives::U256;

// PositionInfo packing used by the v4 position manager:
// | 200 bits pool id prefix | 24 bits tickUpper | 24 bits tickLower | 8 bits hasSubscriber |
const TICK_LOWER_OFFSET: u32 = 8;
const TICK_UPPER_OFFSET: u32 = 32;
const POOL_ID_OFFSET: u32 = 56;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnpackedPositionInfo {
    /// first 25 bytes of the pool id, the key into the manager's `poolKeys`
    pub pool_id_prefix: [u8; 25],
    pub tick_lower:     i32,
    pub tick_upper:     i32,
    pub has_subscriber: bool
}

pub trait UnpackPositionInfo {
    fn unpack_position_info(&self) -> UnpackedPositionInfo;

    fn tick_lower(&self) -> i32;

    fn tick_upper(&self) -> i32;
}

impl UnpackPositionInfo for U256 {
    fn unpack_position_info(&self) -> UnpackedPositionInfo {
        let shifted: U256 = *self >> POOL_ID_OFFSET;
        let mut pool_id_prefix = [0u8; 25];
        pool_id_prefix.copy_from_slice(&shifted.to_be_bytes_vec()[7..]);

        UnpackedPositionInfo {
            pool_id_prefix,
            tick_lower: self.tick_lower(),
            tick_upper: self.tick_upper(),
            has_subscriber: (*self & U256::from(0xff_u8)) != U256::ZERO
        }
    }

    fn tick_lower(&self) -> i32 {
        signed_24(*self >> TICK_LOWER_OFFSET)
    }

    fn tick_upper(&self) -> i32 {
        signed_24(*self >> TICK_UPPER_OFFSET)
    }
}

fn signed_24(word: U256) -> i32 {
    let raw = (word & U256::from((1u32 << 24) - 1)).to::<u32>();
    // sign extend from bit 23
    ((raw << 8) as i32) >> 8
}
