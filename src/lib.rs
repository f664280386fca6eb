//! # reelwatch
//!
//! A terminal client for browsing movie and TV collections from a TMDB-style
//! catalog API.
//!
//! Each page shows a stack of paginated carousels; selecting a card opens a
//! detail overlay whose visibility is derived entirely from the current
//! location, so any view can be opened directly from a location string.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌──────────┐  │
//! │  │ events  │───▶│   app    │───▶│   ui    │───▶│ Terminal │  │
//! │  │ (keys)  │    │ (state)  │    │(render) │    │          │  │
//! │  └─────────┘    └────┬─────┘    └─────────┘    └──────────┘  │
//! │                      │  browse: Location, Page, Carousel,    │
//! │                      │          DetailOverlay                │
//! │                      ▼                                       │
//! │                ┌───────────┐   spawn    ┌──────────────────┐ │
//! │                │QueryCache │──────────▶ │ Catalog (tokio)  │ │
//! │                │ (catalog) │◀────────── │ HttpCatalog ...  │ │
//! │                └───────────┘   mpsc     └──────────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`catalog`]**: query keys, the [`Catalog`](catalog::Catalog) trait with
//!   HTTP and in-memory implementations, the request-once [`QueryCache`]
//!   and image URL resolution
//! - **[`browse`]**: locations and routes, carousel pagination with its
//!   transition lock, and the detail overlay coordinator
//! - **[`app`]**: application state tying the two together
//! - **[`ui`]**: ratatui rendering
//! - **[`config`]**: layered settings
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Browse with an API key from the environment
//! REELWATCH_API__KEY=... reelwatch
//!
//! # Open a detail view directly
//! reelwatch --api-key ... --location "/movies/550?from=topRated"
//!
//! # Dump what a search shows and exit
//! reelwatch --api-key ... --location "/search?keyword=dune" --export dune.json
//! ```
//!
//! ### As a library with an in-memory catalog
//!
//! ```
//! use std::sync::Arc;
//! use reelwatch::browse::Location;
//! use reelwatch::catalog::{Collection, Item, MediaKind, QueryCache, QueryKey, ResultPage, StaticCatalog};
//! use reelwatch::{App, Settings};
//!
//! # tokio_test::block_on(async {
//! let catalog = Arc::new(StaticCatalog::new());
//! catalog.insert_page(
//!     QueryKey::collection(MediaKind::Movie, Collection::TopRated),
//!     ResultPage::new(vec![Item { id: 550, title: "Fight Club".into(), ..Default::default() }]),
//! );
//!
//! let cache = QueryCache::new(catalog, tokio::runtime::Handle::current());
//! let mut app = App::new(cache, &Settings::default(), Location::parse("/movies/550"));
//! app.cache.settle().await;
//!
//! assert!(app.overlay_visible());
//! assert_eq!(app.resolve_selection().item().map(|item| item.id), Some(550));
//! # });
//! ```

pub mod app;
pub mod browse;
pub mod catalog;
pub mod config;
pub mod events;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use browse::{CarouselController, DetailOverlay, Location, Resolution};
pub use catalog::{Catalog, CatalogError, HttpCatalog, QueryCache, StaticCatalog};
pub use config::Settings;
