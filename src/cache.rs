//! TTL read-through cache with at most one refresh in flight per key.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

type Slot<V> = Arc<tokio::sync::Mutex<Option<(Instant, V)>>>;

pub struct ForecastCache<K, V> {
    ttl: Duration,
    slots: Mutex<HashMap<K, Slot<V>>>,
}

impl<K, V> ForecastCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, key: &K) -> Slot<V> {
        let mut slots = self.slots.lock();
        slots.entry(key.clone()).or_default().clone()
    }

    /// Returns the cached value for `key` while it is younger than the TTL,
    /// otherwise runs `refresh` and stores its result. Errors are not cached.
    pub async fn get_or_refresh<F, Fut, E>(&self, key: K, refresh: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let slot = self.slot(&key);
        let mut entry = slot.lock().await;

        if let Some((stored_at, value)) = entry.as_ref() {
            if stored_at.elapsed() < self.ttl {
                return Ok(value.clone());
            }
        }

        let value = refresh().await?;
        *entry = Some((Instant::now(), value.clone()));
        Ok(value)
    }

    /// Drops entries older than the TTL. Slots with a refresh in flight stay.
    pub fn purge_expired(&self) {
        let ttl = self.ttl;
        self.slots.lock().retain(|_, slot| match slot.try_lock() {
            Ok(entry) => entry
                .as_ref()
                .is_some_and(|(stored_at, _)| stored_at.elapsed() < ttl),
            Err(_) => true,
        });
    }

    /// Drops every slot whose key fails `keep`. A caller mid-refresh on a
    /// dropped slot still gets its value; it just is not stored.
    pub fn retain_keys<F>(&self, mut keep: F)
    where
        F: FnMut(&K) -> bool,
    {
        self.slots.lock().retain(|key, _| keep(key));
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
