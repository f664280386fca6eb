//! Browsable pages and the carousels each one shows.

use super::carousel::Carousel;
use super::location::{Location, Route, Scope};
use super::overlay::DetailOverlay;
use crate::catalog::{Collection, MediaKind, QueryKey};

/// A top-level page, derived from the location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    /// Movie collections with a featured banner.
    Home,
    /// TV collections.
    Tv,
    /// Movie and TV search results for a keyword.
    Search { keyword: String },
}

impl Page {
    /// The page a location belongs to. Unknown paths map to Home.
    pub fn for_location(location: &Location) -> Self {
        match location.route() {
            Route::Home | Route::Unknown => Page::Home,
            Route::Tv => Page::Tv,
            Route::Search => Page::Search {
                keyword: location.keyword().unwrap_or_default().to_string(),
            },
            Route::Detail { scope, .. } => match scope {
                Scope::Movies => Page::Home,
                Scope::Tv => Page::Tv,
                Scope::Search => Page::Search {
                    keyword: location.keyword().unwrap_or_default().to_string(),
                },
            },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Tv => "TV Shows",
            Page::Search { .. } => "Search",
        }
    }

    pub fn scope(&self) -> Scope {
        match self {
            Page::Home => Scope::Movies,
            Page::Tv => Scope::Tv,
            Page::Search { .. } => Scope::Search,
        }
    }

    /// The detail overlay hosted by this page.
    pub fn overlay(&self) -> DetailOverlay {
        DetailOverlay::new(self.scope())
    }

    /// Location of the page itself, without any selection.
    pub fn root(&self) -> Location {
        match self {
            Page::Search { keyword } if !keyword.is_empty() => Location::search(keyword),
            _ => Location::new(self.scope().root_path()),
        }
    }

    /// Build the carousels shown on this page, top to bottom.
    pub fn carousels(&self) -> Vec<Carousel> {
        match self {
            Page::Home => collection_rows(MediaKind::Movie, Some(Collection::NowPlaying)),
            Page::Tv => collection_rows(MediaKind::Tv, None),
            Page::Search { keyword } if keyword.is_empty() => Vec::new(),
            Page::Search { keyword } => vec![
                Carousel::new("Movies", "movies", MediaKind::Movie, QueryKey::search(MediaKind::Movie, keyword), 0),
                Carousel::new("TV Shows", "tvShow", MediaKind::Tv, QueryKey::search(MediaKind::Tv, keyword), 0),
            ],
        }
    }

    /// Media kinds whose genre tables this page needs.
    pub fn genre_kinds(&self) -> &'static [MediaKind] {
        match self {
            Page::Home => &[MediaKind::Movie],
            Page::Tv => &[MediaKind::Tv],
            Page::Search { .. } => &[MediaKind::Movie, MediaKind::Tv],
        }
    }
}

fn collection_rows(kind: MediaKind, featured: Option<Collection>) -> Vec<Carousel> {
    kind.collections()
        .iter()
        .map(|&collection| {
            let lead = usize::from(featured == Some(collection));
            Carousel::new(
                collection.label(),
                collection.tag(),
                kind,
                QueryKey::collection(kind, collection),
                lead,
            )
        })
        .collect()
}
