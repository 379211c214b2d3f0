pub mod contract_bindings;
pub mod pair_with_price;
pub mod pool;
pub mod token;
