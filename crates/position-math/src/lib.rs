pub mod cfmm;
mod error;

pub use error::MathError;
