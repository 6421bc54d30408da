use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use crate::domain::entities::product::{Product, ProductId};
use crate::usecase::ports::catalog_api::ApiError;

/// Logical resource identifiers used by the product screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Products,
    Product(ProductId),
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Products => f.write_str("products"),
            QueryKey::Product(id) => write!(f, "product #{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryData {
    Products(Vec<Product>),
    Product(Product),
}

pub type CatalogCache = QueryCache<QueryKey, QueryData>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("failed to fetch {key}: {source}")]
    Remote { key: String, source: ApiError },
    #[error("fetch for {0} was abandoned before completing")]
    Abandoned(String),
}

impl FetchError {
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            FetchError::Remote { source, .. } => Some(source),
            FetchError::Abandoned(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.api_error(), Some(ApiError::NotFound))
    }
}

struct Entry<V> {
    data: Option<V>,
    stale: bool,
    in_flight: bool,
    observers: usize,
    last_error: Option<FetchError>,
}

impl<V> Default for Entry<V> {
    fn default() -> Self {
        Self {
            data: None,
            stale: true,
            in_flight: false,
            observers: 0,
            last_error: None,
        }
    }
}

struct Shared<K, V> {
    entries: Mutex<HashMap<K, Entry<V>>>,
    settled: Condvar,
}

/// Keyed fetch cache. Concurrent fetches of one key share a single request;
/// failed refetches keep the last good value for display.
pub struct QueryCache<K, V> {
    shared: Arc<Shared<K, V>>,
}

impl<K, V> Clone for QueryCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<K, V> Default for QueryCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Display,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Display,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                entries: Mutex::new(HashMap::new()),
                settled: Condvar::new(),
            }),
        }
    }

    /// Returns fresh cached data, joins an in-flight request for `key`, or runs
    /// `fetcher` as the single leader for the key.
    pub fn fetch<F>(&self, key: &K, fetcher: F) -> Result<V, FetchError>
    where
        F: FnOnce() -> Result<V, ApiError>,
    {
        let mut entries = self.lock();
        loop {
            let entry = entries.entry(key.clone()).or_default();
            if !entry.in_flight {
                if let (false, Some(data)) = (entry.stale, entry.data.as_ref()) {
                    tracing::debug!("cache hit for {key}");
                    return Ok(data.clone());
                }
                entry.in_flight = true;
                break;
            }
            tracing::debug!("joining in-flight fetch for {key}");
            entries = self
                .shared
                .settled
                .wait_while(entries, |entries| {
                    entries.get(key).is_some_and(|entry| entry.in_flight)
                })
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let entry = entries.entry(key.clone()).or_default();
            if let Some(err) = entry.last_error.clone() {
                return Err(err);
            }
            if let (false, Some(data)) = (entry.stale, entry.data.as_ref()) {
                return Ok(data.clone());
            }
        }
        drop(entries);

        let guard = InFlight {
            shared: &self.shared,
            key,
            settled: false,
        };
        let result = fetcher();
        guard.settle(result)
    }

    /// Cached data for `key`, fresh or stale.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.lock().get(key).and_then(|entry| entry.data.clone())
    }

    pub fn is_stale(&self, key: &K) -> bool {
        self.lock().get(key).map(|entry| entry.stale).unwrap_or(true)
    }

    pub fn last_error(&self, key: &K) -> Option<FetchError> {
        self.lock().get(key).and_then(|entry| entry.last_error.clone())
    }

    /// Marks `key` stale. Returns true when a view currently observes the key
    /// and should refetch it in the background.
    pub fn invalidate(&self, key: &K) -> bool {
        let mut entries = self.lock();
        match entries.get_mut(key) {
            Some(entry) => {
                entry.stale = true;
                tracing::debug!("invalidated {key} (observers: {})", entry.observers);
                entry.observers > 0
            }
            None => false,
        }
    }

    /// Registers interest in `key` until the returned guard is dropped.
    pub fn observe(&self, key: K) -> Observer<K, V> {
        self.lock().entry(key.clone()).or_default().observers += 1;
        Observer {
            cache: self.clone(),
            key,
        }
    }

    pub fn observers(&self, key: &K) -> usize {
        self.lock().get(key).map(|entry| entry.observers).unwrap_or(0)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Entry<V>>> {
        self.shared
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Clears the in-flight flag even if the fetcher panics, so waiters wake up.
struct InFlight<'a, K: Eq + Hash + Clone + fmt::Display, V> {
    shared: &'a Shared<K, V>,
    key: &'a K,
    settled: bool,
}

impl<K: Eq + Hash + Clone + fmt::Display, V: Clone> InFlight<'_, K, V> {
    fn settle(mut self, result: Result<V, ApiError>) -> Result<V, FetchError> {
        self.settled = true;
        let mut entries = self
            .shared
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let entry = entries.entry(self.key.clone()).or_default();
        entry.in_flight = false;
        let outcome = match result {
            Ok(data) => {
                entry.data = Some(data.clone());
                entry.stale = false;
                entry.last_error = None;
                Ok(data)
            }
            Err(source) => {
                tracing::warn!("fetch for {} failed: {source}", self.key);
                let err = FetchError::Remote {
                    key: self.key.to_string(),
                    source,
                };
                entry.last_error = Some(err.clone());
                Err(err)
            }
        };
        drop(entries);
        self.shared.settled.notify_all();
        outcome
    }
}

impl<K: Eq + Hash + Clone + fmt::Display, V> Drop for InFlight<'_, K, V> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut entries = self
            .shared
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(entry) = entries.get_mut(self.key) {
            entry.in_flight = false;
            entry.last_error = Some(FetchError::Abandoned(self.key.to_string()));
        }
        drop(entries);
        self.shared.settled.notify_all();
    }
}

pub struct Observer<K: Eq + Hash + Clone + fmt::Display, V: Clone> {
    cache: QueryCache<K, V>,
    key: K,
}

impl<K: Eq + Hash + Clone + fmt::Display, V: Clone> Observer<K, V> {
    pub fn key(&self) -> &K {
        &self.key
    }
}

impl<K: Eq + Hash + Clone + fmt::Display, V: Clone> Drop for Observer<K, V> {
    fn drop(&mut self) {
        let mut entries = self.cache.lock();
        let idle = match entries.get_mut(&self.key) {
            Some(entry) => {
                entry.observers = entry.observers.saturating_sub(1);
                entry.observers == 0 && entry.data.is_none() && !entry.in_flight
            }
            None => false,
        };
        if idle {
            entries.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    fn cache() -> QueryCache<QueryKey, u32> {
        QueryCache::new()
    }

    #[test]
    fn second_fetch_is_served_from_cache() {
        let cache = cache();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .fetch(&QueryKey::Products, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .expect("fetch should succeed");
            assert_eq!(value, 7);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_fetches_share_one_request() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(4));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                let calls = calls.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    cache.fetch(&QueryKey::Products, || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(50));
                        Ok(42)
                    })
                })
            })
            .collect();

        for handle in handles {
            let value = handle
                .join()
                .expect("thread should not panic")
                .expect("fetch should succeed");
            assert_eq!(value, 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_fetches_share_the_leaders_error() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(4));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                let calls = calls.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    cache.fetch(&QueryKey::Products, || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(50));
                        Err(ApiError::Transport("connection refused".to_string()))
                    })
                })
            })
            .collect();

        for handle in handles {
            let err = handle
                .join()
                .expect("thread should not panic")
                .expect_err("fetch should fail");
            assert_eq!(
                err.api_error(),
                Some(&ApiError::Transport("connection refused".to_string()))
            );
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_last_observer_evicts_empty_entries() {
        let cache = cache();
        let missing = QueryKey::Product(ProductId(7));
        let loaded = QueryKey::Product(ProductId(8));

        let observer = cache.observe(missing);
        cache
            .fetch(&missing, || Err(ApiError::NotFound))
            .expect_err("missing product should fail");
        drop(observer);
        assert!(!cache.lock().contains_key(&missing));

        let observer = cache.observe(loaded);
        cache
            .fetch(&loaded, || Ok(8))
            .expect("fetch should succeed");
        drop(observer);
        assert_eq!(cache.peek(&loaded), Some(8));
    }

    #[test]
    fn invalidate_forces_refetch_and_reports_observers() {
        let cache = cache();
        cache
            .fetch(&QueryKey::Products, || Ok(1))
            .expect("first fetch should succeed");

        assert!(!cache.invalidate(&QueryKey::Products));
        assert!(cache.is_stale(&QueryKey::Products));
        assert_eq!(cache.peek(&QueryKey::Products), Some(1));

        let observer = cache.observe(QueryKey::Products);
        assert!(cache.invalidate(&QueryKey::Products));

        let value = cache
            .fetch(&QueryKey::Products, || Ok(2))
            .expect("refetch should succeed");
        assert_eq!(value, 2);

        drop(observer);
        assert_eq!(cache.observers(&QueryKey::Products), 0);
    }

    #[test]
    fn failed_refetch_keeps_previous_data() {
        let cache = cache();
        cache
            .fetch(&QueryKey::Products, || Ok(5))
            .expect("first fetch should succeed");
        cache.invalidate(&QueryKey::Products);

        let err = cache
            .fetch(&QueryKey::Products, || {
                Err(ApiError::Transport("connection refused".to_string()))
            })
            .expect_err("refetch should fail");

        assert!(matches!(err, FetchError::Remote { .. }));
        assert_eq!(cache.peek(&QueryKey::Products), Some(5));
        assert!(cache.last_error(&QueryKey::Products).is_some());
    }

    #[test]
    fn not_found_is_reported_without_data() {
        let cache = cache();
        let key = QueryKey::Product(ProductId(99));

        let err = cache
            .fetch(&key, || Err(ApiError::NotFound))
            .expect_err("missing product should fail");

        assert!(err.is_not_found());
        assert_eq!(cache.peek(&key), None);
    }

    #[test]
    fn keys_are_cached_independently() {
        let cache = cache();
        cache
            .fetch(&QueryKey::Product(ProductId(1)), || Ok(1))
            .expect("fetch should succeed");
        let value = cache
            .fetch(&QueryKey::Product(ProductId(2)), || Ok(2))
            .expect("fetch should succeed");

        assert_eq!(value, 2);
        assert_eq!(cache.peek(&QueryKey::Product(ProductId(1))), Some(1));
    }
}
