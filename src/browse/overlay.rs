//! Detail overlay coordination.
//!
//! Whether the overlay is open is never stored: it is recomputed from the
//! current [`Location`] on every call, so a directly-opened location and one
//! reached by navigation behave the same.

use super::location::{location_to_selection, Location, Scope, SelectionRef, KEYWORD_PARAM, ORIGIN_PARAM};
use crate::catalog::{Fetch, Item, ResultPage};

/// Outcome of looking up the selected item in fetched data.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(Item),
    /// The data that could contain the item has not arrived.
    NotYetLoaded,
    /// The data failed to load.
    Unavailable(String),
    /// Data is present but the item is not in it, or the id is malformed.
    NotFound,
}

impl Resolution {
    /// Ordering used when combining several sources: a hit beats anything,
    /// then the most pending state wins.
    fn rank(&self) -> u8 {
        match self {
            Resolution::Found(_) => 3,
            Resolution::NotYetLoaded => 2,
            Resolution::Unavailable(_) => 1,
            Resolution::NotFound => 0,
        }
    }

    pub fn item(&self) -> Option<&Item> {
        match self {
            Resolution::Found(item) => Some(item),
            _ => None,
        }
    }
}

/// Coordinates the detail overlay of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailOverlay {
    scope: Scope,
}

impl DetailOverlay {
    pub fn new(scope: Scope) -> Self {
        Self { scope }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// The selection at `location` if it belongs to this overlay's scope.
    pub fn selection(&self, location: &Location) -> Option<SelectionRef> {
        location_to_selection(location).filter(|selection| selection.scope == self.scope)
    }

    /// True iff `location` matches this scope's detail pattern.
    pub fn is_visible(&self, location: &Location) -> bool {
        self.selection(location).is_some()
    }

    /// Location that opens the overlay for `item_id`, raised from the
    /// carousel tagged `origin`. Any active keyword is carried over.
    pub fn activate(&self, location: &Location, item_id: u64, origin: &str) -> Location {
        let mut next = Location::new(&self.scope.detail_path(&item_id.to_string()));
        if let Some(keyword) = location.keyword() {
            next = next.with_param(KEYWORD_PARAM, keyword);
        }
        if !origin.is_empty() {
            next = next.with_param(ORIGIN_PARAM, origin);
        }
        tracing::debug!(from = %location, to = %next, "opening detail");
        next
    }

    /// Location that closes the overlay, keeping any active keyword.
    pub fn dismiss(&self, location: &Location) -> Location {
        let mut next = Location::new(self.scope.root_path());
        if let Some(keyword) = location.keyword() {
            next = next.with_param(KEYWORD_PARAM, keyword);
        }
        tracing::debug!(from = %location, to = %next, "closing detail");
        next
    }

    /// Look up `item_id` in one fetched result page.
    pub fn resolve(fetch: &Fetch<ResultPage>, item_id: Option<u64>) -> Resolution {
        match fetch {
            Fetch::NotYetLoaded => Resolution::NotYetLoaded,
            Fetch::Unavailable(reason) => Resolution::Unavailable(reason.clone()),
            Fetch::Ready(loaded) => item_id
                .and_then(|id| loaded.value.find(id))
                .cloned()
                .map(Resolution::Found)
                .unwrap_or(Resolution::NotFound),
        }
    }

    /// Look up `item_id` across several tagged sources.
    ///
    /// The source tagged `origin` is searched first. When no source has the
    /// item, the most pending state among them is reported.
    pub fn resolve_across<'a, I>(sources: I, item_id: Option<u64>, origin: Option<&str>) -> Resolution
    where
        I: IntoIterator<Item = (&'a str, &'a Fetch<ResultPage>)>,
    {
        if item_id.is_none() {
            return Resolution::NotFound;
        }

        let (preferred, rest): (Vec<_>, Vec<_>) = sources
            .into_iter()
            .partition(|(tag, _)| origin.is_some_and(|origin| origin == *tag));

        let mut best = Resolution::NotFound;
        for (_, fetch) in preferred.into_iter().chain(rest) {
            let resolution = Self::resolve(fetch, item_id);
            if matches!(resolution, Resolution::Found(_)) {
                return resolution;
            }
            if resolution.rank() > best.rank() {
                best = resolution;
            }
        }
        best
    }
}
