use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of wall clock time, injected so tests can move time by hand.
#[auto_impl::auto_impl(&, Arc)]
pub trait Clock: Send + Sync {
    /// Time since the unix epoch.
    fn now(&self) -> Duration;

    fn unix_secs(&self) -> u64 {
        self.now().as_secs()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
    }
}
