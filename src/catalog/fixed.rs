//! In-memory catalog.
//!
//! Serves canned responses from a map. Useful for embedding reelwatch's
//! browsing logic without network access and for exercising the query cache
//! in tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use super::{Catalog, CatalogError, GenreTable, Payload, QueryKey, ResultPage};

#[derive(Debug, Clone)]
enum Canned {
    Payload(Payload),
    Failure { status: u16, body: String },
}

/// A catalog that answers from an in-memory table.
///
/// Keys without a canned response fail with [`CatalogError::Missing`].
/// Every call is counted per key, so callers can check request
/// de-duplication.
///
/// # Example
///
/// ```
/// use reelwatch::catalog::{Item, MediaKind, QueryKey, ResultPage, StaticCatalog};
///
/// let catalog = StaticCatalog::new();
/// catalog.insert_page(
///     QueryKey::search(MediaKind::Movie, "heat"),
///     ResultPage::new(vec![Item { id: 949, title: "Heat".into(), ..Default::default() }]),
/// );
/// ```
#[derive(Debug, Default)]
pub struct StaticCatalog {
    responses: Mutex<HashMap<QueryKey, Canned>>,
    calls: Mutex<HashMap<QueryKey, usize>>,
    delay: Option<Duration>,
}

impl StaticCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every response by `delay` to keep requests in flight.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Serve `page` for `key`.
    pub fn insert_page(&self, key: QueryKey, page: ResultPage) {
        self.insert(key, Canned::Payload(Payload::Page(Arc::new(page))));
    }

    /// Serve `table` for `key`.
    pub fn insert_genres(&self, key: QueryKey, table: GenreTable) {
        self.insert(key, Canned::Payload(Payload::Genres(Arc::new(table))));
    }

    /// Fail requests for `key` with the given HTTP status.
    pub fn insert_failure(&self, key: QueryKey, status: u16, body: &str) {
        self.insert(
            key,
            Canned::Failure {
                status,
                body: body.to_string(),
            },
        );
    }

    /// Number of fetches issued for `key` so far.
    pub fn calls(&self, key: &QueryKey) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    fn insert(&self, key: QueryKey, canned: Canned) {
        self.responses.lock().unwrap_or_else(PoisonError::into_inner).insert(key, canned);
    }
}

#[async_trait]
impl Catalog for StaticCatalog {
    async fn fetch(&self, key: &QueryKey) -> Result<Payload, CatalogError> {
        *self
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.clone())
            .or_default() += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let canned = self.responses.lock().unwrap_or_else(PoisonError::into_inner).get(key).cloned();
        match canned {
            Some(Canned::Payload(payload)) => Ok(payload),
            Some(Canned::Failure { status, body }) => Err(CatalogError::Status { status, body }),
            None => Err(CatalogError::Missing(key.to_string())),
        }
    }

    fn description(&self) -> &str {
        "static catalog"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Collection, MediaKind};

    #[tokio::test]
    async fn test_static_catalog_serves_and_counts() {
        let key = QueryKey::collection(MediaKind::Movie, Collection::NowPlaying);
        let catalog = StaticCatalog::new();
        catalog.insert_page(key.clone(), ResultPage::default());

        assert!(matches!(catalog.fetch(&key).await, Ok(Payload::Page(_))));
        assert!(matches!(catalog.fetch(&key).await, Ok(Payload::Page(_))));
        assert_eq!(catalog.calls(&key), 2);
    }

    #[tokio::test]
    async fn test_static_catalog_missing_and_failure() {
        let catalog = StaticCatalog::new();
        let missing = QueryKey::Genres(MediaKind::Tv);
        let failing = QueryKey::search(MediaKind::Movie, "x");
        catalog.insert_failure(failing.clone(), 500, "boom");

        assert!(matches!(catalog.fetch(&missing).await, Err(CatalogError::Missing(_))));
        match catalog.fetch(&failing).await {
            Err(CatalogError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
