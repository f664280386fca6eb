//! Navigable locations and the routes they map to.
//!
//! A [`Location`] is a path plus query parameters, formatted like a URL path
//! (`/search/42?keyword=dune&from=movies`). Everything the UI shows beyond
//! carousel positions is derived from the current location, so any location
//! can be opened directly.

use std::fmt::{self, Display};

/// Query parameter carrying the active search term.
pub const KEYWORD_PARAM: &str = "keyword";
/// Query parameter carrying the tag of the carousel that opened a detail view.
pub const ORIGIN_PARAM: &str = "from";

/// A path with ordered query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    path: String,
    query: Vec<(String, String)>,
}

impl Location {
    /// A location with the given path and no query.
    pub fn new(path: &str) -> Self {
        Self {
            path: normalize_path(path),
            query: Vec::new(),
        }
    }

    /// The home location `/`.
    pub fn root() -> Self {
        Self::new("/")
    }

    /// The search results location for `keyword`.
    pub fn search(keyword: &str) -> Self {
        Self::new("/search").with_param(KEYWORD_PARAM, keyword)
    }

    /// Parse a location string. Parsing is lenient: any string yields a location.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let (path, query) = input.split_once('?').unwrap_or((input, ""));

        let query = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode(name), decode(value))
            })
            .collect();

        Self {
            path: normalize_path(path),
            query,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// First value of a query parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    /// Set a query parameter, replacing any previous value.
    pub fn with_param(mut self, name: &str, value: &str) -> Self {
        self.query.retain(|(n, _)| n != name);
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    /// The active search keyword, if any.
    pub fn keyword(&self) -> Option<&str> {
        self.param(KEYWORD_PARAM).filter(|k| !k.is_empty())
    }

    /// The route this location maps to.
    pub fn route(&self) -> Route {
        Route::parse(&self.path)
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::root()
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        for (i, (name, value)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, urlencoding::encode(name), urlencoding::encode(value))?;
        }
        Ok(())
    }
}

impl From<&str> for Location {
    fn from(input: &str) -> Self {
        Self::parse(input)
    }
}

fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

fn decode(raw: &str) -> String {
    let raw = raw.replace('+', " ");
    match urlencoding::decode(&raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw,
    }
}

/// The family of detail routes an overlay belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// `/movies/:id`, opened from the home page.
    Movies,
    /// `/tv/:id`, opened from the TV page.
    Tv,
    /// `/search/:id`, opened from search results.
    Search,
}

impl Scope {
    /// Path of the collection root the scope's overlay sits on.
    pub fn root_path(self) -> &'static str {
        match self {
            Scope::Movies => "/",
            Scope::Tv => "/tv",
            Scope::Search => "/search",
        }
    }

    /// Path of the detail view for `id`.
    pub fn detail_path(self, id: &str) -> String {
        match self {
            Scope::Movies => format!("/movies/{}", id),
            Scope::Tv => format!("/tv/{}", id),
            Scope::Search => format!("/search/{}", id),
        }
    }
}

/// Route patterns recognized by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`
    Home,
    /// `/tv`
    Tv,
    /// `/search`
    Search,
    /// `/movies/:id`, `/tv/:id` or `/search/:id`. The id is kept raw.
    Detail { scope: Scope, id: String },
    /// Anything else.
    Unknown,
}

impl Route {
    /// Match a normalized path against the route table.
    pub fn parse(path: &str) -> Self {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Route::Home,
            ["tv"] => Route::Tv,
            ["search"] => Route::Search,
            ["movies", id] => Route::Detail {
                scope: Scope::Movies,
                id: (*id).to_string(),
            },
            ["tv", id] => Route::Detail {
                scope: Scope::Tv,
                id: (*id).to_string(),
            },
            ["search", id] => Route::Detail {
                scope: Scope::Search,
                id: (*id).to_string(),
            },
            _ => Route::Unknown,
        }
    }
}

/// The detail selection encoded in a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRef {
    pub scope: Scope,
    /// The id segment as it appeared in the path.
    pub raw_id: String,
    /// Tag of the carousel that raised the selection, if recorded.
    pub origin: Option<String>,
}

impl SelectionRef {
    /// Numeric item id; `None` for malformed ids.
    pub fn item_id(&self) -> Option<u64> {
        self.raw_id.parse().ok()
    }

    /// Shared visual-transition key: the id composited with the origin tag,
    /// so two carousels showing the same item never collide.
    pub fn layout_key(&self) -> String {
        format!("{}{}", self.raw_id, self.origin.as_deref().unwrap_or_default())
    }
}

/// Derive the current selection from a location.
///
/// This is the only source of overlay visibility; it is recomputed on every
/// location change and never cached.
pub fn location_to_selection(location: &Location) -> Option<SelectionRef> {
    match location.route() {
        Route::Detail { scope, id } => Some(SelectionRef {
            scope,
            raw_id: id,
            origin: location.param(ORIGIN_PARAM).filter(|o| !o.is_empty()).map(str::to_string),
        }),
        _ => None,
    }
}
