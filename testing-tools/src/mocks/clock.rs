use std::time::Duration;

use parking_lot::Mutex;
use planner::common::Clock;

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Duration>
}

impl ManualClock {
    pub fn at_unix_secs(secs: u64) -> Self {
        Self { now: Mutex::new(Duration::from_secs(secs)) }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    pub fn set(&self, now: Duration) {
        *self.now.lock() = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock()
    }
}
