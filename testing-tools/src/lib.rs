//! In-memory stand-ins for the chain and the price feed, and the fixtures the
//! planner's flow tests share.

pub mod fixtures;
pub mod mocks;
