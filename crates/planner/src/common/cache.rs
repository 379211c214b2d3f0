use std::{hash::Hash, time::Duration};

use parking_lot::Mutex;
use schnellru::{ByLength, LruMap};

use super::{Clock, SystemClock};

/// Bounded key/value cache whose entries expire `ttl` after insertion.
///
/// Owned by whoever needs it and handed in at construction, so two planners
/// never share entries unless they share the cache.
pub struct TtlCache<K, V, C = SystemClock>
where
    K: Hash + PartialEq
{
    entries: Mutex<LruMap<K, (V, Duration), ByLength>>,
    ttl:     Duration,
    clock:   C
}

impl<K, V, C> TtlCache<K, V, C>
where
    K: Hash + PartialEq,
    V: Clone,
    C: Clock
{
    pub fn new(capacity: u32, ttl: Duration, clock: C) -> Self {
        Self { entries: Mutex::new(LruMap::new(ByLength::new(capacity))), ttl, clock }
    }

    /// The cached value, if present and not yet expired. Expired entries are
    /// evicted on the way out.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        let (value, expires_at) = entries.get(key)?;
        if *expires_at > now {
            return Some(value.clone())
        }
        entries.remove(key);
        None
    }

    pub fn insert(&self, key: K, value: V) {
        let expires_at = self.clock.now() + self.ttl;
        self.entries.lock().insert(key, (value, expires_at));
    }

    pub fn invalidate(&self, key: &K) {
        self.entries.lock().remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
