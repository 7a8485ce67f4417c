//! Cached, coalescing issue search.
//!
//! `IssueFinder` puts a [`ResultCache`] in front of an [`IssueProvider`]:
//!
//! 1. A fresh cache entry for the filters is returned without a request.
//! 2. Otherwise, if a request for the same filters is already running, the
//!    caller waits for that one instead of starting another.
//! 3. Each request runs in its own task, which writes the cache on success,
//!    then retires its in-flight entry. Callers going away does not stop it.
//!    Errors are never cached.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use gfi_core::{CacheStats, ResultCache, SearchFilters, SessionStore, fingerprint};
use tokio::sync::Mutex;

use crate::github::{GithubError, IssueProvider, SearchPage};

type PendingSearch = Shared<BoxFuture<'static, Result<SearchPage, GithubError>>>;
type InFlight = Arc<StdMutex<HashMap<String, PendingSearch>>>;
type SharedCache<S> = Arc<Mutex<ResultCache<SearchPage, S>>>;

/// Result of [`IssueFinder::find`].
#[derive(Debug, Clone, PartialEq)]
pub struct FindOutcome {
    pub page: SearchPage,
    /// Whether the page came from the cache.
    pub cache_hit: bool,
}

pub struct IssueFinder<P, S> {
    provider: Arc<P>,
    cache: SharedCache<S>,
    in_flight: InFlight,
}

impl<P, S> IssueFinder<P, S>
where
    P: IssueProvider + 'static,
    S: SessionStore + 'static,
{
    pub fn new(provider: P, cache: ResultCache<SearchPage, S>) -> Self {
        Self {
            provider: Arc::new(provider),
            cache: Arc::new(Mutex::new(cache)),
            in_flight: Arc::new(StdMutex::new(HashMap::new())),
        }
    }

    /// Search for issues matching `filters`, from cache when possible.
    pub async fn find(&self, filters: &SearchFilters) -> Result<FindOutcome, GithubError> {
        let key = fingerprint(filters).map_err(|e| GithubError::InvalidRequest(e.to_string()))?;

        {
            let mut cache = self.cache.lock().await;
            let hit = cache.get_by_key(&key);
            cache.flush().await;
            if let Some(page) = hit {
                return Ok(FindOutcome { page, cache_hit: true });
            }
        }

        let pending = {
            let mut in_flight = lock_in_flight(&self.in_flight);
            match in_flight.get(&key) {
                Some(pending) => {
                    tracing::debug!(key = %key, "joining in-flight search");
                    pending.clone()
                }
                None => {
                    let task = tokio::spawn(run_search(
                        Arc::clone(&self.provider),
                        Arc::clone(&self.cache),
                        Arc::clone(&self.in_flight),
                        key.clone(),
                        filters.clone(),
                    ));
                    let pending = async move {
                        task.await
                            .unwrap_or_else(|e| Err(GithubError::TaskFailed(e.to_string())))
                    }
                    .boxed()
                    .shared();
                    in_flight.insert(key, pending.clone());
                    pending
                }
            }
        };

        pending
            .await
            .map(|page| FindOutcome { page, cache_hit: false })
    }

    /// Drop all cached pages.
    pub async fn clear_cache(&self) {
        let mut cache = self.cache.lock().await;
        cache.clear();
        cache.flush().await;
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.lock().await.stats()
    }
}

/// One search request, run to completion whether or not anyone still waits.
async fn run_search<P, S>(
    provider: Arc<P>, cache: SharedCache<S>, in_flight: InFlight, key: String, filters: SearchFilters,
) -> Result<SearchPage, GithubError>
where
    P: IssueProvider,
    S: SessionStore,
{
    let result = provider.search(&filters).await;

    match &result {
        Ok(page) => {
            let mut cache = cache.lock().await;
            let ttl = cache.default_ttl();
            cache.set_by_key(key.clone(), page.clone(), ttl);
            cache.flush().await;
        }
        Err(e) => tracing::warn!("issue search failed, not caching: {}", e),
    }

    // retired only after the cache write
    lock_in_flight(&in_flight).remove(&key);
    result
}

fn lock_in_flight(in_flight: &InFlight) -> MutexGuard<'_, HashMap<String, PendingSearch>> {
    in_flight.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::Issue;
    use async_trait::async_trait;
    use gfi_core::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Provider that counts calls and answers after a delay.
    struct StubProvider {
        calls: Arc<AtomicUsize>,
        delay: Duration,
        fail: bool,
    }

    impl StubProvider {
        fn new(calls: Arc<AtomicUsize>) -> Self {
            Self { calls, delay: Duration::from_millis(0), fail: false }
        }
    }

    #[async_trait]
    impl IssueProvider for StubProvider {
        async fn search(&self, filters: &SearchFilters) -> Result<SearchPage, GithubError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(GithubError::RateLimited("API rate limit exceeded".into()));
            }
            Ok(SearchPage { items: Vec::<Issue>::new(), total_count: u64::from(filters.page) * 100 })
        }
    }

    async fn finder(provider: StubProvider) -> IssueFinder<StubProvider, MemoryStore> {
        IssueFinder::new(provider, ResultCache::new(MemoryStore::new()).await)
    }

    fn in_flight_len<P, S>(finder: &IssueFinder<P, S>) -> usize {
        lock_in_flight(&finder.in_flight).len()
    }

    #[tokio::test]
    async fn test_second_find_hits_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let finder = finder(StubProvider::new(calls.clone())).await;
        let filters = SearchFilters::default().with_language("Rust");

        let first = finder.find(&filters).await.unwrap();
        assert!(!first.cache_hit);
        let second = finder.find(&filters).await.unwrap();
        assert!(second.cache_hit);
        assert_eq!(first.page, second.page);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_different_filters_miss() {
        let calls = Arc::new(AtomicUsize::new(0));
        let finder = finder(StubProvider::new(calls.clone())).await;

        finder.find(&SearchFilters::default()).await.unwrap();
        let page_two = finder.find(&SearchFilters::default().with_page(2)).await.unwrap();
        assert!(!page_two.cache_hit);
        assert_eq!(page_two.page.total_count, 200);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let finder = finder(StubProvider { fail: true, ..StubProvider::new(calls.clone()) }).await;
        let filters = SearchFilters::default();

        let err = finder.find(&filters).await.unwrap_err();
        assert!(err.is_rate_limited());
        assert!(finder.find(&filters).await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(finder.cache_stats().await.size, 0);
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_coalesced() {
        let calls = Arc::new(AtomicUsize::new(0));
        let finder =
            finder(StubProvider { delay: Duration::from_millis(50), ..StubProvider::new(calls.clone()) }).await;
        let filters = SearchFilters::default().with_language("Go");

        let (a, b) = tokio::join!(finder.find(&filters), finder.find(&filters));
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.page, b.page);
        assert!(!a.cache_hit && !b.cache_hit);
        assert_eq!(finder.cache_stats().await.size, 1);
        assert_eq!(in_flight_len(&finder), 0);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_refetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let finder = finder(StubProvider::new(calls.clone())).await;
        let filters = SearchFilters::default();

        finder.find(&filters).await.unwrap();
        finder.clear_cache().await;
        assert!(!finder.find(&filters).await.unwrap().cache_hit);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_reload_reuses_persisted_pages() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = MemoryStore::new();
        let filters = SearchFilters::default().with_language("Rust");

        let first = IssueFinder::new(StubProvider::new(calls.clone()), ResultCache::new(store.clone()).await);
        first.find(&filters).await.unwrap();
        drop(first);

        let reloaded = IssueFinder::new(StubProvider::new(calls.clone()), ResultCache::new(store).await);
        assert!(reloaded.find(&filters).await.unwrap().cache_hit);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_caller_still_populates_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let finder = finder(StubProvider { delay: Duration::from_millis(50), ..StubProvider::new(calls.clone()) }).await;
        let filters = SearchFilters::default().with_language("Zig");

        let cancelled = tokio::time::timeout(Duration::from_millis(10), finder.find(&filters)).await;
        assert!(cancelled.is_err());
        assert_eq!(in_flight_len(&finder), 1);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(in_flight_len(&finder), 0);
        assert_eq!(finder.cache_stats().await.size, 1);

        assert!(finder.find(&filters).await.unwrap().cache_hit);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_caller_joins_search_left_by_cancelled_caller() {
        let calls = Arc::new(AtomicUsize::new(0));
        let finder = finder(StubProvider { delay: Duration::from_millis(50), ..StubProvider::new(calls.clone()) }).await;
        let filters = SearchFilters::default().with_language("Zig");

        assert!(tokio::time::timeout(Duration::from_millis(10), finder.find(&filters)).await.is_err());

        let joined = finder.find(&filters).await.unwrap();
        assert!(!joined.cache_hit);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(in_flight_len(&finder), 0);
    }

    #[tokio::test]
    async fn test_failed_search_is_retired() {
        let calls = Arc::new(AtomicUsize::new(0));
        let finder = finder(StubProvider { fail: true, ..StubProvider::new(calls.clone()) }).await;

        assert!(finder.find(&SearchFilters::default()).await.is_err());
        assert_eq!(in_flight_len(&finder), 0);
    }
}
