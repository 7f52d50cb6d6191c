use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

type Clock = Arc<dyn Fn() -> Instant + Send + Sync>;

/// TTL-bounded in-memory cache. The clock is injectable so tests can expire
/// entries without sleeping; capacity eviction drops the oldest entry.
pub struct Cache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Mutex<HashMap<K, (Instant, V)>>>,
    ttl: Duration,
    capacity: usize,
    clock: Clock,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self::with_clock(ttl, capacity, Arc::new(Instant::now))
    }

    pub fn with_clock(ttl: Duration, capacity: usize, clock: Clock) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
            capacity: capacity.max(1),
            clock,
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let now = (self.clock)();
        let mut cache = self.inner.lock().await;
        match cache.get(key) {
            Some((inserted_at, value)) if now.duration_since(*inserted_at) < self.ttl => {
                debug!("Cache HIT");
                Some(value.clone())
            }
            Some(_) => {
                debug!("Cache EXPIRED");
                cache.remove(key);
                None
            }
            None => {
                debug!("Cache MISS");
                None
            }
        }
    }

    pub async fn put(&self, key: K, value: V) {
        let now = (self.clock)();
        let mut cache = self.inner.lock().await;
        if cache.len() >= self.capacity && !cache.contains_key(&key) {
            let oldest = cache
                .iter()
                .min_by_key(|(_, (inserted_at, _))| *inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                debug!("Cache EVICT");
                cache.remove(&oldest);
            }
        }
        debug!("Cache PUT");
        cache.insert(key, (now, value));
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new(Duration::from_secs(300), 256)
    }
}
