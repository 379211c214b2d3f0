mod pool_key_ext;
mod position_info_ext;

pub use pool_key_ext::*;
pub use position_info_ext::*;
