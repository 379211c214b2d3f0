mod position;
mod range;
mod sqrt_price;
mod state;

pub use position::*;
pub use range::*;
pub use sqrt_price::*;
pub use state::*;

pub type Tick = i32;
