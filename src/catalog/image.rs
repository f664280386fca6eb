//! Image URL resolution against the catalog's CDN.

use std::fmt::{self, Display};

use crate::config::ImageSettings;

/// CDN size tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageSize {
    W200,
    W300,
    W500,
    W780,
    W1280,
    #[default]
    Original,
}

impl ImageSize {
    /// Path segment used by the CDN.
    pub fn segment(self) -> &'static str {
        match self {
            ImageSize::W200 => "w200",
            ImageSize::W300 => "w300",
            ImageSize::W500 => "w500",
            ImageSize::W780 => "w780",
            ImageSize::W1280 => "w1280",
            ImageSize::Original => "original",
        }
    }
}

impl Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

/// Turns image path fragments into fully-qualified URLs.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    base_url: String,
    placeholder: String,
}

impl ImageResolver {
    /// Create a resolver from settings.
    pub fn new(settings: &ImageSettings) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            placeholder: settings.placeholder.clone(),
        }
    }

    /// Resolve a path fragment such as `/abc.jpg`.
    ///
    /// A missing or empty fragment yields the placeholder URL. The size
    /// defaults to [`ImageSize::Original`].
    pub fn resolve(&self, fragment: Option<&str>, size: Option<ImageSize>) -> String {
        let Some(fragment) = fragment.map(str::trim).filter(|f| !f.is_empty()) else {
            return self.placeholder.clone();
        };
        format!(
            "{}/{}/{}",
            self.base_url,
            size.unwrap_or_default(),
            fragment.trim_start_matches('/')
        )
    }
}

impl Default for ImageResolver {
    fn default() -> Self {
        Self::new(&ImageSettings::default())
    }
}
