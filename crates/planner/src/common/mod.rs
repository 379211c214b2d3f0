mod cache;
mod clock;
mod provider;

pub use cache::*;
pub use clock::*;
pub use provider::*;
