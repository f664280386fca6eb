//! Catalog access: query keys, the [`Catalog`] trait and its implementations.
//!
//! A [`Catalog`] answers a [`QueryKey`] with a [`Payload`]. The UI never talks
//! to a catalog directly; it goes through the [`QueryCache`], which issues at
//! most one request per key and hands results back on the UI thread.

mod cache;
mod error;
mod fixed;
mod http;
mod image;
mod types;

pub use cache::{Fetch, Loaded, QueryCache};
pub use error::CatalogError;
pub use fixed::StaticCatalog;
pub use http::HttpCatalog;
pub use image::{ImageResolver, ImageSize};
pub use types::{DateRange, Genre, GenreTable, Item, ResultPage};

use std::fmt::{self, Debug, Display};
use std::sync::Arc;

use async_trait::async_trait;

/// Movie vs. TV-show discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    /// Path segment used by the catalog API.
    pub fn segment(self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }

    /// Collections the catalog offers for this kind.
    pub fn collections(self) -> &'static [Collection] {
        match self {
            MediaKind::Movie => &[Collection::NowPlaying, Collection::TopRated, Collection::Upcoming],
            MediaKind::Tv => &[Collection::AiringToday, Collection::Popular, Collection::TopRated],
        }
    }
}

/// A named result set from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    NowPlaying,
    TopRated,
    Upcoming,
    AiringToday,
    Popular,
}

impl Collection {
    /// Path segment used by the catalog API.
    pub fn segment(self) -> &'static str {
        match self {
            Collection::NowPlaying => "now_playing",
            Collection::TopRated => "top_rated",
            Collection::Upcoming => "upcoming",
            Collection::AiringToday => "airing_today",
            Collection::Popular => "popular",
        }
    }

    /// Display title.
    pub fn label(self) -> &'static str {
        match self {
            Collection::NowPlaying => "Now Playing",
            Collection::TopRated => "Top Rated",
            Collection::Upcoming => "Upcoming",
            Collection::AiringToday => "Airing Today",
            Collection::Popular => "Popular",
        }
    }

    /// Short tag identifying the collection inside a page.
    pub fn tag(self) -> &'static str {
        match self {
            Collection::NowPlaying => "nowPlaying",
            Collection::TopRated => "topRated",
            Collection::Upcoming => "upcoming",
            Collection::AiringToday => "airingToday",
            Collection::Popular => "popular",
        }
    }
}

/// Cache key for a catalog request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// A named collection of one media kind.
    Collection {
        kind: MediaKind,
        collection: Collection,
    },
    /// Free-text search within one media kind.
    Search { kind: MediaKind, keyword: String },
    /// The genre table of one media kind.
    Genres(MediaKind),
}

impl QueryKey {
    /// Key for a named collection.
    pub fn collection(kind: MediaKind, collection: Collection) -> Self {
        QueryKey::Collection { kind, collection }
    }

    /// Key for a keyword search.
    pub fn search(kind: MediaKind, keyword: impl Into<String>) -> Self {
        QueryKey::Search {
            kind,
            keyword: keyword.into(),
        }
    }

    /// Endpoint path relative to the API base, e.g. `movie/now_playing`.
    pub fn endpoint(&self) -> String {
        match self {
            QueryKey::Collection { kind, collection } => {
                format!("{}/{}", kind.segment(), collection.segment())
            }
            QueryKey::Search { kind, .. } => format!("search/{}", kind.segment()),
            QueryKey::Genres(kind) => format!("genre/{}/list", kind.segment()),
        }
    }

    /// Whether this key returns a genre table rather than a result page.
    pub fn is_genres(&self) -> bool {
        matches!(self, QueryKey::Genres(_))
    }
}

impl Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Search { keyword, .. } => write!(f, "{}?query={}", self.endpoint(), keyword),
            _ => f.write_str(&self.endpoint()),
        }
    }
}

/// A catalog response.
#[derive(Debug, Clone)]
pub enum Payload {
    Page(Arc<ResultPage>),
    Genres(Arc<GenreTable>),
}

/// A read-only source of catalog data.
///
/// Implementations must be cheap to share across tasks; the query cache
/// holds one behind an `Arc` and calls it from spawned fetch tasks.
///
/// # Example
///
/// ```
/// use reelwatch::catalog::{Catalog, MediaKind, QueryKey, ResultPage, StaticCatalog};
///
/// let catalog = StaticCatalog::new();
/// catalog.insert_page(QueryKey::search(MediaKind::Movie, "dune"), ResultPage::default());
/// assert_eq!(catalog.description(), "static catalog");
/// ```
#[async_trait]
pub trait Catalog: Send + Sync + Debug {
    /// Fetch the payload for `key`.
    async fn fetch(&self, key: &QueryKey) -> Result<Payload, CatalogError>;

    /// Returns a human-readable description of the catalog.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;
}
