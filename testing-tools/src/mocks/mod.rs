mod clock;
mod oracle;
mod provider;

pub use clock::ManualClock;
pub use oracle::MockPriceOracle;
pub use provider::MockPoolProvider;
