//! Plans Uniswap v4 liquidity positions for the m00n pool: USD bands to
//! ticks, deposits to amounts and liquidity, and the position manager calls
//! that carry them out.

pub mod chain;
pub mod common;
pub mod config;
pub mod encoder;
mod error;
mod planner;
pub mod pricing;
pub mod requests;
pub mod responses;

pub use error::PlanError;
pub use planner::PositionPlanner;
