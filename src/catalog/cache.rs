//! Request-once-per-key query cache.
//!
//! The cache sits between the UI thread and a [`Catalog`]. Fetches run as
//! tasks on a tokio runtime and report back over a channel; the UI thread
//! applies them in [`QueryCache::poll`] without blocking.
//!
//! ```text
//! ensure(key) ──▶ spawn fetch ──▶ Completion { key, request, result }
//!                                        │
//!                      poll() ◀──────────┘  (stale request tokens dropped)
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;

use super::{Catalog, CatalogError, GenreTable, MediaKind, Payload, QueryKey, ResultPage};

/// State of one cached query as seen by a consumer.
#[derive(Debug, Clone)]
pub enum Fetch<T> {
    /// Request in flight or not yet issued.
    NotYetLoaded,
    /// Data arrived.
    Ready(Loaded<T>),
    /// The request failed; carries the reason.
    Unavailable(String),
}

impl<T> Fetch<T> {
    /// The loaded value, treating both pending and failed as absent.
    pub fn ready(self) -> Option<Loaded<T>> {
        match self {
            Fetch::Ready(loaded) => Some(loaded),
            _ => None,
        }
    }

    /// Whether the request is still pending.
    pub fn is_pending(&self) -> bool {
        matches!(self, Fetch::NotYetLoaded)
    }
}

/// A value delivered by the cache, stamped with the revision it arrived at.
///
/// Revisions are unique per delivery: a refetch of the same key produces a
/// new revision, which consumers use as the identity of the data.
#[derive(Debug)]
pub struct Loaded<T> {
    pub revision: u64,
    pub value: Arc<T>,
}

impl<T> Clone for Loaded<T> {
    fn clone(&self) -> Self {
        Self {
            revision: self.revision,
            value: Arc::clone(&self.value),
        }
    }
}

#[derive(Debug)]
enum Entry {
    InFlight { request: u64 },
    Ready { revision: u64, payload: Payload },
    Failed { reason: String },
}

#[derive(Debug)]
struct Completion {
    key: QueryKey,
    request: u64,
    result: Result<Payload, CatalogError>,
}

/// Keyed store of catalog responses.
///
/// Repeated or concurrent [`ensure`](QueryCache::ensure) calls for the same
/// key share one request and one cached result until the key is refetched or
/// evicted.
#[derive(Debug)]
pub struct QueryCache {
    catalog: Arc<dyn Catalog>,
    runtime: Handle,
    entries: HashMap<QueryKey, Entry>,
    sender: mpsc::UnboundedSender<Completion>,
    receiver: mpsc::UnboundedReceiver<Completion>,
    next_request: u64,
    next_revision: u64,
}

impl QueryCache {
    /// Create a cache that runs fetches on `runtime`.
    pub fn new(catalog: Arc<dyn Catalog>, runtime: Handle) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            catalog,
            runtime,
            entries: HashMap::new(),
            sender,
            receiver,
            next_request: 0,
            next_revision: 0,
        }
    }

    /// Returns a description of the underlying catalog.
    pub fn description(&self) -> &str {
        self.catalog.description()
    }

    /// Issue a request for `key` unless one is cached or already in flight.
    ///
    /// Returns true if a new request was issued.
    pub fn ensure(&mut self, key: &QueryKey) -> bool {
        if self.entries.contains_key(key) {
            return false;
        }
        self.spawn_fetch(key.clone());
        true
    }

    /// Replace the entry for `key` with a fresh request.
    ///
    /// A completion from the previous request is discarded when it arrives.
    pub fn refetch(&mut self, key: &QueryKey) {
        self.spawn_fetch(key.clone());
    }

    /// Refetch every key whose last request failed. Returns how many were retried.
    pub fn retry_failed(&mut self) -> usize {
        let failed: Vec<QueryKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| matches!(entry, Entry::Failed { .. }))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &failed {
            self.refetch(key);
        }
        failed.len()
    }

    /// Drop the entry for `key`. An in-flight result for it will be discarded.
    pub fn evict(&mut self, key: &QueryKey) {
        if self.entries.remove(key).is_some() {
            tracing::debug!(endpoint = %key, "evicted query");
        }
    }

    /// Number of requests still in flight.
    pub fn in_flight(&self) -> usize {
        self.entries.values().filter(|entry| matches!(entry, Entry::InFlight { .. })).count()
    }

    /// Apply any completed fetches without blocking.
    ///
    /// Returns the number of completions that changed an entry.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.receiver.try_recv() {
            if self.apply(completion).is_some() {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next completion that changes an entry.
    ///
    /// Returns `None` immediately when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<QueryKey> {
        while self.in_flight() > 0 {
            let completion = self.receiver.recv().await?;
            if let Some(key) = self.apply(completion) {
                return Some(key);
            }
        }
        None
    }

    /// Wait until no request is in flight.
    pub async fn settle(&mut self) {
        while self.next_completion().await.is_some() {}
    }

    /// Look up a result page.
    pub fn page(&self, key: &QueryKey) -> Fetch<ResultPage> {
        match self.entries.get(key) {
            None | Some(Entry::InFlight { .. }) => Fetch::NotYetLoaded,
            Some(Entry::Failed { reason }) => Fetch::Unavailable(reason.clone()),
            Some(Entry::Ready {
                revision,
                payload: Payload::Page(page),
            }) => Fetch::Ready(Loaded {
                revision: *revision,
                value: Arc::clone(page),
            }),
            Some(Entry::Ready { .. }) => {
                Fetch::Unavailable(CatalogError::UnexpectedPayload(key.to_string()).to_string())
            }
        }
    }

    /// Look up the genre table for a media kind.
    pub fn genres(&self, kind: MediaKind) -> Fetch<GenreTable> {
        let key = QueryKey::Genres(kind);
        match self.entries.get(&key) {
            None | Some(Entry::InFlight { .. }) => Fetch::NotYetLoaded,
            Some(Entry::Failed { reason }) => Fetch::Unavailable(reason.clone()),
            Some(Entry::Ready {
                revision,
                payload: Payload::Genres(table),
            }) => Fetch::Ready(Loaded {
                revision: *revision,
                value: Arc::clone(table),
            }),
            Some(Entry::Ready { .. }) => {
                Fetch::Unavailable(CatalogError::UnexpectedPayload(key.to_string()).to_string())
            }
        }
    }

    fn spawn_fetch(&mut self, key: QueryKey) {
        self.next_request += 1;
        let request = self.next_request;
        self.entries.insert(key.clone(), Entry::InFlight { request });

        let catalog = Arc::clone(&self.catalog);
        let sender = self.sender.clone();
        tracing::debug!(endpoint = %key, request, "issuing query");

        self.runtime.spawn(async move {
            let result = catalog.fetch(&key).await;
            // A closed channel means the cache is gone; the result has nowhere to go.
            let _ = sender.send(Completion {
                key,
                request,
                result,
            });
        });
    }

    fn apply(&mut self, completion: Completion) -> Option<QueryKey> {
        let Completion {
            key,
            request,
            result,
        } = completion;

        match self.entries.get(&key) {
            Some(Entry::InFlight { request: current }) if *current == request => {}
            _ => {
                tracing::debug!(endpoint = %key, request, "discarding stale completion");
                return None;
            }
        }

        let entry = match result {
            Ok(payload) => {
                self.next_revision += 1;
                tracing::info!(endpoint = %key, revision = self.next_revision, "query ready");
                Entry::Ready {
                    revision: self.next_revision,
                    payload,
                }
            }
            Err(err) => {
                tracing::warn!(endpoint = %key, error = %err, "query failed");
                Entry::Failed {
                    reason: err.to_string(),
                }
            }
        };
        self.entries.insert(key.clone(), entry);
        Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Collection, Genre, Item, StaticCatalog};
    use std::time::Duration;

    fn now_playing() -> QueryKey {
        QueryKey::collection(MediaKind::Movie, Collection::NowPlaying)
    }

    fn page_of(ids: &[u64]) -> ResultPage {
        ResultPage::new(
            ids.iter()
                .map(|&id| Item {
                    id,
                    title: format!("Item {id}"),
                    ..Default::default()
                })
                .collect(),
        )
    }

    fn cache_with(catalog: &Arc<StaticCatalog>) -> QueryCache {
        QueryCache::new(catalog.clone(), Handle::current())
    }

    #[tokio::test]
    async fn test_repeated_ensure_issues_one_request() {
        let catalog = Arc::new(StaticCatalog::new());
        catalog.insert_page(now_playing(), page_of(&[1, 2, 3]));
        let mut cache = cache_with(&catalog);

        assert!(cache.ensure(&now_playing()));
        assert!(!cache.ensure(&now_playing()));
        assert!(cache.page(&now_playing()).is_pending());

        cache.settle().await;
        assert!(!cache.ensure(&now_playing()));

        let loaded = cache.page(&now_playing()).ready().unwrap();
        assert_eq!(loaded.value.results.len(), 3);
        assert_eq!(catalog.calls(&now_playing()), 1);
    }

    #[tokio::test]
    async fn test_same_instance_returned_for_cached_key() {
        let catalog = Arc::new(StaticCatalog::new());
        catalog.insert_page(now_playing(), page_of(&[1]));
        let mut cache = cache_with(&catalog);

        cache.ensure(&now_playing());
        cache.settle().await;

        let a = cache.page(&now_playing()).ready().unwrap();
        let b = cache.page(&now_playing()).ready().unwrap();
        assert!(Arc::ptr_eq(&a.value, &b.value));
        assert_eq!(a.revision, b.revision);
    }

    #[tokio::test]
    async fn test_failure_is_unavailable_and_can_be_retried() {
        let catalog = Arc::new(StaticCatalog::new());
        catalog.insert_failure(now_playing(), 503, "maintenance");
        let mut cache = cache_with(&catalog);

        cache.ensure(&now_playing());
        cache.settle().await;
        match cache.page(&now_playing()) {
            Fetch::Unavailable(reason) => assert!(reason.contains("503")),
            other => panic!("expected unavailable, got {other:?}"),
        }

        catalog.insert_page(now_playing(), page_of(&[9]));
        assert_eq!(cache.retry_failed(), 1);
        cache.settle().await;

        assert!(cache.page(&now_playing()).ready().is_some());
        assert_eq!(catalog.calls(&now_playing()), 2);
    }

    #[tokio::test]
    async fn test_refetch_produces_new_revision() {
        let catalog = Arc::new(StaticCatalog::new());
        catalog.insert_page(now_playing(), page_of(&[1]));
        let mut cache = cache_with(&catalog);

        cache.ensure(&now_playing());
        cache.settle().await;
        let first = cache.page(&now_playing()).ready().unwrap().revision;

        cache.refetch(&now_playing());
        assert!(cache.page(&now_playing()).is_pending());
        cache.settle().await;
        let second = cache.page(&now_playing()).ready().unwrap().revision;

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_evicted_in_flight_result_is_discarded() {
        let catalog = Arc::new(StaticCatalog::new());
        catalog.insert_page(now_playing(), page_of(&[1]));
        let mut cache = cache_with(&catalog);

        cache.ensure(&now_playing());
        cache.evict(&now_playing());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.poll(), 0);
        assert!(cache.page(&now_playing()).is_pending());
        assert_eq!(cache.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_superseded_request_is_discarded() {
        let catalog = Arc::new(StaticCatalog::new().with_delay(Duration::from_millis(10)));
        catalog.insert_page(now_playing(), page_of(&[1]));
        let mut cache = cache_with(&catalog);

        cache.ensure(&now_playing());
        cache.refetch(&now_playing());
        cache.settle().await;

        // Both requests completed but only the second one is applied.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.poll(), 0);
        assert!(cache.page(&now_playing()).ready().is_some());
        assert_eq!(catalog.calls(&now_playing()), 2);
    }

    #[tokio::test]
    async fn test_genres_lookup() {
        let catalog = Arc::new(StaticCatalog::new());
        catalog.insert_genres(
            QueryKey::Genres(MediaKind::Movie),
            GenreTable {
                genres: vec![Genre {
                    id: 28,
                    name: "Action".to_string(),
                }],
            },
        );
        let mut cache = cache_with(&catalog);

        cache.ensure(&QueryKey::Genres(MediaKind::Movie));
        assert_eq!(cache.next_completion().await, Some(QueryKey::Genres(MediaKind::Movie)));

        let table = cache.genres(MediaKind::Movie).ready().unwrap();
        assert_eq!(table.value.genres[0].name, "Action");
        assert!(cache.genres(MediaKind::Tv).is_pending());
    }

    #[tokio::test]
    async fn test_payload_kind_mismatch_is_unavailable() {
        let catalog = Arc::new(StaticCatalog::new());
        catalog.insert_genres(now_playing(), GenreTable::default());
        let mut cache = cache_with(&catalog);

        cache.ensure(&now_playing());
        cache.settle().await;
        assert!(matches!(cache.page(&now_playing()), Fetch::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_next_completion_without_requests() {
        let catalog = Arc::new(StaticCatalog::new());
        let mut cache = cache_with(&catalog);
        assert_eq!(cache.next_completion().await, None);
    }
}
