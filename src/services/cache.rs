//! TTL memoization for upstream responses.
//!
//! Each key owns a slot guarded by an async mutex. Callers that miss on the same
//! key queue on that slot, so only the first one reaches the network and the rest
//! read what it stored. Expiry is judged against a pluggable [`Clock`].

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use moka::future::Cache;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;

pub const DEFAULT_TTL_SECS: i64 = 600;
pub const DEFAULT_MAX_CAPACITY: u64 = 1000;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: ChronoDuration) {
        let mut now = self.now.lock();
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CacheSettings {
    pub ttl: ChronoDuration,
    pub max_capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: ChronoDuration::seconds(DEFAULT_TTL_SECS),
            max_capacity: DEFAULT_MAX_CAPACITY,
        }
    }
}

struct Entry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

type Slot<V> = Arc<AsyncMutex<Option<Entry<V>>>>;

#[derive(Clone)]
pub struct TtlCache<K, V> {
    slots: Cache<K, Slot<V>>,
    ttl: ChronoDuration,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(settings: CacheSettings, clock: Arc<dyn Clock>) -> Self {
        let slots = Cache::builder()
            .max_capacity(settings.max_capacity)
            .build();

        Self {
            slots,
            ttl: settings.ttl,
            clock,
        }
    }

    /// Return the live value for `key`, or run `fetch` and cache what it yields.
    ///
    /// Only `Ok` values are stored; an `Err` is handed back and the next caller
    /// fetches again.
    pub async fn get_or_try_insert<F, Fut, E>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let slot = self
            .slots
            .get_with(key.clone(), async { Arc::new(AsyncMutex::new(None)) })
            .await;

        let mut entry = slot.lock().await;

        if let Some(cached) = entry.as_ref() {
            if cached.expires_at > self.clock.now() {
                tracing::debug!("Cache hit for {:?}", key);
                return Ok(cached.value.clone());
            }
        }

        let value = fetch().await?;

        *entry = Some(Entry {
            value: value.clone(),
            expires_at: self.clock.now() + self.ttl,
        });

        Ok(value)
    }

    /// Drop every entry; the next call for any key goes back to `fetch`.
    pub async fn invalidate_all(&self) {
        self.slots.invalidate_all();
        self.slots.run_pending_tasks().await;
    }

    /// Seconds until the entry for `key` expires; `None` when absent or stale.
    pub async fn expires_in_secs(&self, key: &K) -> Option<i64> {
        let slot = self.slots.get(key).await?;
        let entry = slot.lock().await;
        let remaining = entry.as_ref()?.expires_at - self.clock.now();

        (remaining > ChronoDuration::zero()).then(|| remaining.num_seconds())
    }
}
