//! Browsing state: locations, pages, carousels and the detail overlay.
//!
//! Everything here is synchronous and independent of the terminal. The
//! [`App`](crate::app::App) owns one [`LocationHistory`] and rebuilds the
//! page's [`Carousel`]s whenever the location moves to a different page.

pub mod carousel;
pub mod history;
pub mod location;
pub mod overlay;
pub mod page;

pub use carousel::{Carousel, CarouselController, CarouselState, Direction, Slide, PAGE_SIZE};
pub use history::LocationHistory;
pub use location::{location_to_selection, Location, Route, Scope, SelectionRef};
pub use overlay::{DetailOverlay, Resolution};
pub use page::Page;
