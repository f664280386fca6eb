//! Wire types for catalog responses.
//!
//! These match the JSON returned by the TMDB v3 list, search and genre
//! endpoints. Movie and TV objects share one [`Item`] shape: TV results carry
//! `name` and `first_air_date`, which deserialize into `title` and
//! `release_date`.

use serde::{Deserialize, Serialize};

/// One page of results from a collection or search endpoint.
///
/// Immutable once fetched. The query cache replaces it wholesale on refetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultPage {
    /// 1-based page number reported by the catalog.
    #[serde(default)]
    pub page: u32,
    /// Items in catalog order.
    #[serde(default)]
    pub results: Vec<Item>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
    /// Release window, only present on some movie collections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dates: Option<DateRange>,
}

impl ResultPage {
    /// Create a page holding the given items.
    pub fn new(results: Vec<Item>) -> Self {
        let total = results.len() as u32;
        Self {
            page: 1,
            results,
            total_pages: 1,
            total_results: total,
            dates: None,
        }
    }

    /// Find an item by identifier.
    pub fn find(&self, id: u64) -> Option<&Item> {
        self.results.iter().find(|item| item.id == id)
    }
}

/// Date window attached to movie collections such as "now playing".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub maximum: String,
    pub minimum: String,
}

/// A single movie or TV show.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique within a [`ResultPage`].
    pub id: u64,
    /// Display title (`title` for movies, `name` for TV).
    #[serde(default, alias = "name")]
    pub title: String,
    /// Synopsis.
    #[serde(default)]
    pub overview: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    /// Average rating on a 0-10 scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    /// `release_date` for movies, `first_air_date` for TV.
    #[serde(default, alias = "first_air_date", skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    /// References into the genre table of the item's media kind.
    #[serde(default)]
    pub genre_ids: Vec<u32>,
}

impl Item {
    /// Release date, treating the empty string the catalog sometimes sends as absent.
    pub fn release(&self) -> Option<&str> {
        self.release_date.as_deref().filter(|d| !d.is_empty())
    }
}

/// A genre identifier and its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

/// The genre list for one media kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreTable {
    #[serde(default)]
    pub genres: Vec<Genre>,
}

impl GenreTable {
    /// Names of the genres referenced by `ids`, in table order.
    pub fn names_for<'a>(&'a self, ids: &'a [u32]) -> impl Iterator<Item = &'a str> + 'a {
        self.genres
            .iter()
            .filter(move |genre| ids.contains(&genre.id))
            .map(|genre| genre.name.as_str())
    }
}
