//! Application state and navigation logic.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::browse::{
    Carousel, DetailOverlay, Location, LocationHistory, Page, Resolution, SelectionRef, PAGE_SIZE,
};
use crate::catalog::{Fetch, ImageResolver, Item, MediaKind, QueryCache, QueryKey, ResultPage};
use crate::config::Settings;
use crate::ui::Theme;

/// Origin tag recorded when the detail view is opened from the featured banner.
pub const FEATURED_TAG: &str = "featured";

/// Shortest keyword accepted by the search prompt.
pub const MIN_KEYWORD_CHARS: usize = 2;

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,

    // Data
    pub cache: QueryCache,
    pub images: ImageResolver,

    // Navigation
    history: LocationHistory,
    page: Page,
    carousels: Vec<Carousel>,
    pub focused_row: usize,
    pub focused_card: usize,
    /// Text typed into the search prompt while it is open.
    pub search_input: Option<String>,
    /// Keyword of the last search, reused when tabbing back to Search.
    last_keyword: Option<String>,

    // UI
    pub theme: Theme,
    transition: Duration,
    overlay_opened: Option<(String, Instant)>,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create the app at `initial` and request what that location needs.
    pub fn new(cache: QueryCache, settings: &Settings, initial: Location) -> Self {
        let page = Page::for_location(&initial);
        let carousels = page.carousels();
        let last_keyword = initial.keyword().map(str::to_string);

        let mut app = Self {
            running: true,
            show_help: false,
            cache,
            images: ImageResolver::new(&settings.images),
            history: LocationHistory::new(initial),
            page,
            carousels,
            focused_row: 0,
            focused_card: 0,
            search_input: None,
            last_keyword,
            theme: Theme::dark(),
            transition: settings.ui.transition(),
            overlay_opened: None,
            status_message: None,
        };
        app.request_page_data();
        app.track_overlay(Instant::now());
        app
    }

    /// Returns a description of the catalog behind the cache.
    pub fn source_description(&self) -> &str {
        self.cache.description()
    }

    pub fn location(&self) -> &Location {
        self.history.current()
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn carousels(&self) -> &[Carousel] {
        &self.carousels
    }

    /// Duration of a page slide.
    pub fn transition(&self) -> Duration {
        self.transition
    }

    pub fn can_go_back(&self) -> bool {
        self.history.can_go_back()
    }

    pub fn can_go_forward(&self) -> bool {
        self.history.can_go_forward()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    // ----------------------------------------------------------------------
    // Location handling
    // ----------------------------------------------------------------------

    /// Navigate to `location`, adding it to the history.
    pub fn navigate(&mut self, location: Location) {
        tracing::info!(location = %location, "navigate");
        self.history.push(location);
        self.apply_location();
    }

    /// Step back in the history.
    pub fn back(&mut self) -> bool {
        let moved = self.history.back();
        if moved {
            self.apply_location();
        }
        moved
    }

    /// Step forward in the history.
    pub fn forward(&mut self) -> bool {
        let moved = self.history.forward();
        if moved {
            self.apply_location();
        }
        moved
    }

    fn apply_location(&mut self) {
        let location = self.history.current().clone();
        if let Some(keyword) = location.keyword() {
            self.last_keyword = Some(keyword.to_string());
        }

        let page = Page::for_location(&location);
        if page != self.page {
            let next = page.carousels();
            for carousel in &self.carousels {
                let still_shown = next.iter().any(|c| c.source == carousel.source);
                if matches!(carousel.source, QueryKey::Search { .. }) && !still_shown {
                    self.cache.evict(&carousel.source);
                }
            }
            tracing::debug!(from = self.page.label(), to = page.label(), "page changed");
            self.page = page;
            self.carousels = next;
            self.focused_row = 0;
            self.focused_card = 0;
        }

        self.request_page_data();
        self.track_overlay(Instant::now());
    }

    fn request_page_data(&mut self) {
        for carousel in &self.carousels {
            self.cache.ensure(&carousel.source);
        }
        for &kind in self.page.genre_kinds() {
            self.cache.ensure(&QueryKey::Genres(kind));
        }
    }

    // ----------------------------------------------------------------------
    // Clock
    // ----------------------------------------------------------------------

    /// Apply fetched data and advance transition clocks.
    ///
    /// Returns true if anything visible changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = self.cache.poll() > 0;

        for carousel in &mut self.carousels {
            let revision = self.cache.page(&carousel.source).ready().map(|loaded| loaded.revision);
            if carousel.sync(revision) {
                changed = true;
            }
            if carousel.tick(now, self.transition) {
                changed = true;
            }
        }

        if self.focused_row >= self.carousels.len() {
            self.focused_row = self.carousels.len().saturating_sub(1);
        }
        self.track_overlay(now);
        changed
    }

    fn track_overlay(&mut self, now: Instant) {
        match self.selection() {
            Some(selection) => {
                let key = selection.layout_key();
                if self.overlay_opened.as_ref().map(|(k, _)| k) != Some(&key) {
                    self.overlay_opened = Some((key, now));
                }
            }
            None => self.overlay_opened = None,
        }
    }

    /// How far the overlay has grown in, in `[0, 1]`.
    pub fn overlay_progress(&self, now: Instant) -> f32 {
        let Some((_, opened)) = &self.overlay_opened else {
            return 0.0;
        };
        if self.transition.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(*opened).as_secs_f32();
        (elapsed / self.transition.as_secs_f32()).min(1.0)
    }

    // ----------------------------------------------------------------------
    // Carousel data
    // ----------------------------------------------------------------------

    /// Fetch state of a carousel's data.
    pub fn fetch_for(&self, row: usize) -> Fetch<ResultPage> {
        match self.carousels.get(row) {
            Some(carousel) => self.cache.page(&carousel.source),
            None => Fetch::NotYetLoaded,
        }
    }

    fn items_for(&self, row: usize) -> Option<Arc<ResultPage>> {
        self.fetch_for(row).ready().map(|loaded| loaded.value)
    }

    /// Number of items currently loaded for a carousel.
    pub fn item_count(&self, row: usize) -> usize {
        self.items_for(row).map_or(0, |page| page.results.len())
    }

    /// Items on the current page of a carousel.
    pub fn visible_items(&self, row: usize) -> Vec<Item> {
        let (Some(carousel), Some(page)) = (self.carousels.get(row), self.items_for(row)) else {
            return Vec::new();
        };
        carousel.visible_slice(&page.results).to_vec()
    }

    /// Items on an arbitrary page of a carousel, used to draw the page
    /// sliding out.
    pub fn items_on_page(&self, row: usize, page_index: usize) -> Vec<Item> {
        let (Some(carousel), Some(page)) = (self.carousels.get(row), self.items_for(row)) else {
            return Vec::new();
        };
        carousel.controller().page_slice(&page.results, page_index).to_vec()
    }

    /// The card under the cursor.
    pub fn focused_item(&self) -> Option<Item> {
        let visible = self.visible_items(self.focused_row);
        let index = self.focused_card.min(visible.len().checked_sub(1)?);
        visible.into_iter().nth(index)
    }

    /// The featured banner item (first Now Playing item on Home).
    pub fn featured_item(&self) -> Option<Item> {
        let row = self.carousels.iter().position(Carousel::is_featured)?;
        self.items_for(row)?.results.first().cloned()
    }

    /// Genre names for an item, in table order. Empty until the table loads.
    pub fn genres_for(&self, item: &Item, kind: MediaKind) -> Vec<String> {
        match self.cache.genres(kind) {
            Fetch::Ready(table) => table.value.names_for(&item.genre_ids).map(str::to_string).collect(),
            _ => Vec::new(),
        }
    }

    /// Carousels whose data failed to load, with the reason.
    pub fn unavailable_rows(&self) -> Vec<(&str, String)> {
        self.carousels
            .iter()
            .filter_map(|carousel| match self.cache.page(&carousel.source) {
                Fetch::Unavailable(reason) => Some((carousel.title.as_str(), reason)),
                _ => None,
            })
            .collect()
    }

    // ----------------------------------------------------------------------
    // Carousel navigation
    // ----------------------------------------------------------------------

    /// Page the focused carousel forward.
    pub fn advance_focused(&mut self, now: Instant) -> bool {
        let Some(page) = self.items_for(self.focused_row) else {
            return false;
        };
        let count = page.results.len();
        let Some(carousel) = self.carousels.get_mut(self.focused_row) else {
            return false;
        };
        let started = carousel.advance(count, now);
        if started {
            self.focused_card = 0;
        }
        started
    }

    /// Page the focused carousel back.
    pub fn retreat_focused(&mut self, now: Instant) -> bool {
        let Some(carousel) = self.carousels.get_mut(self.focused_row) else {
            return false;
        };
        let started = carousel.retreat(now);
        if started {
            self.focused_card = PAGE_SIZE - 1;
        }
        started
    }

    /// Move the cursor right, paging forward past the last card.
    pub fn move_right(&mut self, now: Instant) {
        let visible = self.visible_items(self.focused_row).len();
        if self.focused_card + 1 < visible {
            self.focused_card += 1;
        } else {
            self.advance_focused(now);
        }
    }

    /// Move the cursor left, paging back before the first card.
    pub fn move_left(&mut self, now: Instant) {
        let visible = self.visible_items(self.focused_row).len();
        self.focused_card = self.focused_card.min(visible.saturating_sub(1));
        if self.focused_card > 0 {
            self.focused_card -= 1;
        } else {
            self.retreat_focused(now);
        }
    }

    /// Focus the carousel above.
    pub fn focus_up(&mut self) {
        self.focused_row = self.focused_row.saturating_sub(1);
    }

    /// Focus the carousel below.
    pub fn focus_down(&mut self) {
        let max = self.carousels.len().saturating_sub(1);
        self.focused_row = (self.focused_row + 1).min(max);
    }

    // ----------------------------------------------------------------------
    // Detail overlay
    // ----------------------------------------------------------------------

    fn overlay(&self) -> DetailOverlay {
        self.page.overlay()
    }

    /// Whether the detail overlay is open. Derived from the location only.
    pub fn overlay_visible(&self) -> bool {
        self.overlay().is_visible(self.location())
    }

    pub fn selection(&self) -> Option<SelectionRef> {
        self.overlay().selection(self.location())
    }

    /// Open the detail overlay for the focused card.
    pub fn activate_focused(&mut self) -> bool {
        let Some(item) = self.focused_item() else {
            return false;
        };
        let tag = self.carousels[self.focused_row].tag;
        let next = self.overlay().activate(self.location(), item.id, tag);
        self.navigate(next);
        true
    }

    /// Open the detail overlay for the featured item.
    pub fn activate_featured(&mut self) -> bool {
        let Some(item) = self.featured_item() else {
            return false;
        };
        let next = self.overlay().activate(self.location(), item.id, FEATURED_TAG);
        self.navigate(next);
        true
    }

    /// Close the detail overlay, staying on the current page.
    pub fn dismiss_overlay(&mut self) -> bool {
        if !self.overlay_visible() {
            return false;
        }
        let next = self.overlay().dismiss(self.location());
        self.navigate(next);
        true
    }

    /// Look up the selected item in the page's data.
    ///
    /// The origin carousel is searched first, then every other carousel.
    pub fn resolve_selection(&self) -> Resolution {
        let Some(selection) = self.selection() else {
            return Resolution::NotFound;
        };
        let fetches: Vec<(&str, Fetch<ResultPage>)> = self
            .carousels
            .iter()
            .map(|carousel| (carousel.tag, self.cache.page(&carousel.source)))
            .collect();
        DetailOverlay::resolve_across(
            fetches.iter().map(|(tag, fetch)| (*tag, fetch)),
            selection.item_id(),
            selection.origin.as_deref(),
        )
    }

    /// Media kind of the selected item: that of the carousel it came from,
    /// or of the first carousel holding it.
    pub fn selection_kind(&self) -> Option<MediaKind> {
        let selection = self.selection()?;
        let id = selection.item_id()?;
        let origin = selection.origin.as_deref();

        let holds = |row: usize| self.items_for(row).is_some_and(|page| page.find(id).is_some());
        let origin_row = self.carousels.iter().position(|c| Some(c.tag) == origin);
        origin_row
            .filter(|&row| holds(row))
            .or_else(|| (0..self.carousels.len()).find(|&row| holds(row)))
            .map(|row| self.carousels[row].kind)
    }

    // ----------------------------------------------------------------------
    // Pages and search
    // ----------------------------------------------------------------------

    pub fn show_home(&mut self) {
        self.navigate(Page::Home.root());
    }

    pub fn show_tv(&mut self) {
        self.navigate(Page::Tv.root());
    }

    /// Show search results for the last keyword, or open the prompt.
    pub fn show_search(&mut self) {
        match self.last_keyword.clone() {
            Some(keyword) => self.navigate(Page::Search { keyword }.root()),
            None => self.start_search(),
        }
    }

    /// Cycle Home → TV Shows → Search.
    pub fn next_page(&mut self) {
        match self.page {
            Page::Home => self.show_tv(),
            Page::Tv => self.show_search(),
            Page::Search { .. } => self.show_home(),
        }
    }

    /// Cycle Search → TV Shows → Home.
    pub fn prev_page(&mut self) {
        match self.page {
            Page::Home => self.show_search(),
            Page::Tv => self.show_home(),
            Page::Search { .. } => self.show_tv(),
        }
    }

    /// Open the search prompt, prefilled with the active keyword.
    pub fn start_search(&mut self) {
        let current = self.location().keyword().unwrap_or_default().to_string();
        self.search_input = Some(current);
    }

    pub fn cancel_search(&mut self) {
        self.search_input = None;
    }

    pub fn search_push(&mut self, c: char) {
        if let Some(input) = &mut self.search_input {
            input.push(c);
        }
    }

    pub fn search_pop(&mut self) {
        if let Some(input) = &mut self.search_input {
            input.pop();
        }
    }

    /// Submit the prompt. Keywords shorter than two characters are rejected
    /// and the prompt stays open.
    pub fn submit_search(&mut self) -> bool {
        let Some(input) = &self.search_input else {
            return false;
        };
        let keyword = input.trim().to_string();
        if keyword.chars().count() < MIN_KEYWORD_CHARS {
            self.set_status_message(format!(
                "Search needs at least {} characters",
                MIN_KEYWORD_CHARS
            ));
            return false;
        }
        self.search_input = None;
        self.navigate(Location::search(&keyword));
        true
    }

    // ----------------------------------------------------------------------
    // Misc
    // ----------------------------------------------------------------------

    /// Refetch every failed query.
    pub fn retry(&mut self) {
        let retried = self.cache.retry_failed();
        if retried == 0 {
            self.set_status_message("Nothing to retry".to_string());
        } else {
            self.set_status_message(format!("Retrying {} request(s)", retried));
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export current state to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        use std::io::Write;

        let selection = self.selection().map(|selection| {
            let (status, item) = match self.resolve_selection() {
                Resolution::Found(item) => ("found", Some(item)),
                Resolution::NotYetLoaded => ("loading", None),
                Resolution::Unavailable(_) => ("unavailable", None),
                Resolution::NotFound => ("not_found", None),
            };
            serde_json::json!({
                "id": selection.raw_id,
                "origin": selection.origin,
                "status": status,
                "title": item.as_ref().map(|item| item.title.clone()),
            })
        });

        let carousels: Vec<serde_json::Value> = self
            .carousels
            .iter()
            .enumerate()
            .map(|(row, carousel)| {
                let status = match self.cache.page(&carousel.source) {
                    Fetch::NotYetLoaded => "loading".to_string(),
                    Fetch::Ready(_) => "ready".to_string(),
                    Fetch::Unavailable(reason) => format!("unavailable: {}", reason),
                };
                let count = self.item_count(row);
                let state = carousel.state();
                let visible: Vec<serde_json::Value> = self
                    .visible_items(row)
                    .iter()
                    .map(|item| serde_json::json!({ "id": item.id, "title": item.title }))
                    .collect();
                serde_json::json!({
                    "title": carousel.title,
                    "tag": carousel.tag,
                    "status": status,
                    "item_count": count,
                    "page_index": state.page_index,
                    "max_page_index": carousel.max_page_index(count),
                    "transitioning": state.transitioning,
                    "visible": visible,
                })
            })
            .collect();

        let export = serde_json::json!({
            "location": self.location().to_string(),
            "page": self.page.label(),
            "selection": selection,
            "carousels": carousels,
        });

        let json = serde_json::to_string_pretty(&export)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }
}
