//! Carousel pagination and the transition lock.
//!
//! A [`CarouselController`] owns the page index, the direction of travel and
//! the `transitioning` flag for one collection. A [`Carousel`] binds a
//! controller to its data source and runs the transition clock that releases
//! the lock.

use std::time::{Duration, Instant};

use crate::catalog::{Item, MediaKind, QueryKey};

/// Items shown per carousel page.
pub const PAGE_SIZE: usize = 6;

/// Direction of the most recent page change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// Pagination state of one carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CarouselState {
    pub page_index: usize,
    /// True only while a page change is animating.
    pub transitioning: bool,
    pub direction: Direction,
}

/// Pagination logic for one carousel.
///
/// The page count is never cached: every navigation call takes the current
/// item count so a refreshed result set can't leave a stale bound behind.
#[derive(Debug, Clone)]
pub struct CarouselController {
    lead_offset: usize,
    page_size: usize,
    state: CarouselState,
    bound_revision: Option<u64>,
}

impl CarouselController {
    /// Create a controller. `lead_offset` items at the front are reserved
    /// (for the featured banner) and never paginated.
    pub fn new(lead_offset: usize, page_size: usize) -> Self {
        Self {
            lead_offset,
            page_size: page_size.max(1),
            state: CarouselState::default(),
            bound_revision: None,
        }
    }

    pub fn state(&self) -> CarouselState {
        self.state
    }

    pub fn lead_offset(&self) -> usize {
        self.lead_offset
    }

    /// Highest reachable page index for `item_count` items:
    /// `max(0, floor((item_count - 1 - lead_offset) / page_size) - 1)`.
    pub fn max_page_index(&self, item_count: usize) -> usize {
        let usable = item_count as i64 - 1 - self.lead_offset as i64;
        let pages = usable.div_euclid(self.page_size as i64) - 1;
        pages.max(0) as usize
    }

    /// Move to the next page, wrapping to the first after the last.
    ///
    /// Dropped while a transition is running. Returns true if a transition
    /// started.
    pub fn advance(&mut self, item_count: usize) -> bool {
        if self.state.transitioning {
            return false;
        }
        let max = self.max_page_index(item_count);
        self.state.direction = Direction::Forward;
        self.state.transitioning = true;
        self.state.page_index = if self.state.page_index >= max {
            0
        } else {
            self.state.page_index + 1
        };
        true
    }

    /// Move to the previous page. Does not wrap: a no-op on the first page.
    ///
    /// Dropped while a transition is running. Returns true if a transition
    /// started.
    pub fn retreat(&mut self) -> bool {
        if self.state.page_index == 0 || self.state.transitioning {
            return false;
        }
        self.state.direction = Direction::Backward;
        self.state.transitioning = true;
        self.state.page_index -= 1;
        true
    }

    /// Release the transition lock. Called once per completed page change.
    pub fn on_transition_settled(&mut self) {
        self.state.transitioning = false;
    }

    /// Items on the current page.
    pub fn visible_slice<'a>(&self, items: &'a [Item]) -> &'a [Item] {
        self.page_slice(items, self.state.page_index)
    }

    /// Items on page `page_index`, clamped to the data.
    pub fn page_slice<'a>(&self, items: &'a [Item], page_index: usize) -> &'a [Item] {
        let start = (self.lead_offset + page_index * self.page_size).min(items.len());
        let end = (start + self.page_size).min(items.len());
        &items[start..end]
    }

    /// Bind to a data revision, resetting state when it differs from the
    /// bound one. Returns true if the state was reset.
    pub fn sync(&mut self, revision: Option<u64>) -> bool {
        if self.bound_revision == revision {
            return false;
        }
        self.bound_revision = revision;
        self.state = CarouselState::default();
        true
    }
}

/// An in-progress page slide.
#[derive(Debug, Clone, Copy)]
pub struct Slide {
    pub started: Instant,
    /// Page shown before the transition began.
    pub from_page: usize,
}

/// A titled carousel bound to a catalog query.
#[derive(Debug, Clone)]
pub struct Carousel {
    pub title: String,
    /// Short tag naming this carousel within its page.
    pub tag: &'static str,
    pub kind: MediaKind,
    /// Query supplying the carousel's items.
    pub source: QueryKey,
    controller: CarouselController,
    slide: Option<Slide>,
}

impl Carousel {
    pub fn new(
        title: impl Into<String>,
        tag: &'static str,
        kind: MediaKind,
        source: QueryKey,
        lead_offset: usize,
    ) -> Self {
        Self {
            title: title.into(),
            tag,
            kind,
            source,
            controller: CarouselController::new(lead_offset, PAGE_SIZE),
            slide: None,
        }
    }

    /// Whether the first item is reserved for a banner.
    pub fn is_featured(&self) -> bool {
        self.controller.lead_offset() > 0
    }

    pub fn controller(&self) -> &CarouselController {
        &self.controller
    }

    pub fn state(&self) -> CarouselState {
        self.controller.state()
    }

    /// The running slide, if any.
    pub fn slide(&self) -> Option<Slide> {
        self.slide
    }

    /// Advance given the current item count, starting the slide clock.
    pub fn advance(&mut self, item_count: usize, now: Instant) -> bool {
        let from_page = self.controller.state().page_index;
        let started = self.controller.advance(item_count);
        if started {
            self.slide = Some(Slide { started: now, from_page });
        }
        started
    }

    /// Retreat, starting the slide clock.
    pub fn retreat(&mut self, now: Instant) -> bool {
        let from_page = self.controller.state().page_index;
        let started = self.controller.retreat();
        if started {
            self.slide = Some(Slide { started: now, from_page });
        }
        started
    }

    /// Settle the running slide once `duration` has elapsed.
    ///
    /// The slide is taken on settle, so the controller hears about each
    /// transition exactly once. Returns true if it settled.
    pub fn tick(&mut self, now: Instant, duration: Duration) -> bool {
        let due = self
            .slide
            .is_some_and(|slide| now.saturating_duration_since(slide.started) >= duration);
        if !due {
            return false;
        }
        self.slide = None;
        self.controller.on_transition_settled();
        true
    }

    /// Slide progress in `[0, 1]`, or `None` when idle.
    pub fn progress(&self, now: Instant, duration: Duration) -> Option<f32> {
        let slide = self.slide?;
        if duration.is_zero() {
            return Some(1.0);
        }
        let elapsed = now.saturating_duration_since(slide.started).as_secs_f32();
        Some((elapsed / duration.as_secs_f32()).min(1.0))
    }

    /// Bind to the revision of the source data; resets on change.
    pub fn sync(&mut self, revision: Option<u64>) -> bool {
        let reset = self.controller.sync(revision);
        if reset {
            self.slide = None;
        }
        reset
    }

    pub fn max_page_index(&self, item_count: usize) -> usize {
        self.controller.max_page_index(item_count)
    }

    pub fn visible_slice<'a>(&self, items: &'a [Item]) -> &'a [Item] {
        self.controller.visible_slice(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Collection;

    fn items(n: usize) -> Vec<Item> {
        (0..n)
            .map(|i| Item {
                id: i as u64,
                title: format!("Item {i}"),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_max_page_index_formula() {
        let plain = CarouselController::new(0, PAGE_SIZE);
        let featured = CarouselController::new(1, PAGE_SIZE);

        for n in 0..60usize {
            let expected_plain = ((n as i64 - 1).div_euclid(6) - 1).max(0) as usize;
            let expected_featured = ((n as i64 - 2).div_euclid(6) - 1).max(0) as usize;
            assert_eq!(plain.max_page_index(n), expected_plain, "n = {n}");
            assert_eq!(featured.max_page_index(n), expected_featured, "n = {n}");
        }

        assert_eq!(plain.max_page_index(20), 2);
        assert_eq!(featured.max_page_index(19), 1);
        assert_eq!(plain.max_page_index(0), 0);
        assert_eq!(featured.max_page_index(1), 0);
    }

    #[test]
    fn test_featured_nineteen_items_wraps_after_second_page() {
        let mut controller = CarouselController::new(1, PAGE_SIZE);

        assert!(controller.advance(19));
        assert_eq!(controller.state().page_index, 1);
        controller.on_transition_settled();

        assert!(controller.advance(19));
        assert_eq!(controller.state().page_index, 0);
        assert_eq!(controller.state().direction, Direction::Forward);
    }

    #[test]
    fn test_advance_from_max_wraps_to_zero() {
        let mut controller = CarouselController::new(0, PAGE_SIZE);
        let n = 20;
        for _ in 0..controller.max_page_index(n) {
            controller.advance(n);
            controller.on_transition_settled();
        }
        assert_eq!(controller.state().page_index, controller.max_page_index(n));

        controller.advance(n);
        assert_eq!(controller.state().page_index, 0);
    }

    #[test]
    fn test_retreat_at_first_page_is_noop() {
        let mut controller = CarouselController::new(0, PAGE_SIZE);
        let before = controller.state();
        assert!(!controller.retreat());
        assert!(!controller.retreat());
        assert_eq!(controller.state(), before);
    }

    #[test]
    fn test_navigation_is_dropped_while_transitioning() {
        let mut controller = CarouselController::new(0, PAGE_SIZE);
        assert!(controller.advance(40));
        let locked = controller.state();
        assert!(locked.transitioning);

        assert!(!controller.advance(40));
        assert!(!controller.retreat());
        assert_eq!(controller.state(), locked);

        controller.on_transition_settled();
        assert!(controller.retreat());
        assert_eq!(controller.state().page_index, 0);
        assert_eq!(controller.state().direction, Direction::Backward);
    }

    #[test]
    fn test_empty_page() {
        let mut controller = CarouselController::new(0, PAGE_SIZE);
        let empty: Vec<Item> = Vec::new();

        assert_eq!(controller.max_page_index(0), 0);
        assert!(controller.visible_slice(&empty).is_empty());

        controller.advance(0);
        assert_eq!(controller.state().page_index, 0);
    }

    #[test]
    fn test_visible_slice_bounds() {
        let data = items(20);
        let mut controller = CarouselController::new(1, PAGE_SIZE);

        let first: Vec<u64> = controller.visible_slice(&data).iter().map(|i| i.id).collect();
        assert_eq!(first, vec![1, 2, 3, 4, 5, 6]);

        controller.advance(data.len());
        controller.on_transition_settled();
        let second: Vec<u64> = controller.visible_slice(&data).iter().map(|i| i.id).collect();
        assert_eq!(second, vec![7, 8, 9, 10, 11, 12]);

        for n in 0..20 {
            let short = items(n);
            let slice = controller.visible_slice(&short);
            assert!(slice.len() <= PAGE_SIZE);
        }
    }

    #[test]
    fn test_shrinking_result_set_uses_latest_bound() {
        let mut controller = CarouselController::new(0, PAGE_SIZE);
        controller.advance(40);
        controller.on_transition_settled();
        controller.advance(40);
        controller.on_transition_settled();
        assert_eq!(controller.state().page_index, 2);

        // Same identity but fewer items: the bound is recomputed, so it wraps.
        controller.advance(13);
        assert_eq!(controller.state().page_index, 0);
    }

    #[test]
    fn test_sync_resets_on_new_revision() {
        let mut controller = CarouselController::new(0, PAGE_SIZE);
        assert!(controller.sync(Some(1)));
        controller.advance(40);
        assert!(!controller.sync(Some(1)));
        assert_eq!(controller.state().page_index, 1);

        assert!(controller.sync(Some(2)));
        assert_eq!(controller.state(), CarouselState::default());

        controller.advance(40);
        assert!(controller.sync(None));
        assert_eq!(controller.state(), CarouselState::default());
    }

    fn carousel() -> Carousel {
        Carousel::new(
            "Top Rated",
            "topRated",
            MediaKind::Movie,
            QueryKey::collection(MediaKind::Movie, Collection::TopRated),
            0,
        )
    }

    #[test]
    fn test_slide_settles_exactly_once() {
        let mut carousel = carousel();
        let start = Instant::now();
        let duration = Duration::from_millis(500);

        assert!(carousel.advance(40, start));
        assert_eq!(carousel.slide().unwrap().from_page, 0);
        assert!(!carousel.tick(start + Duration::from_millis(100), duration));
        assert!(carousel.state().transitioning);

        assert!(carousel.tick(start + duration, duration));
        assert!(!carousel.state().transitioning);
        assert!(!carousel.tick(start + duration * 2, duration));
        assert!(carousel.slide().is_none());
    }

    #[test]
    fn test_single_page_advance_still_settles() {
        let mut carousel = carousel();
        let start = Instant::now();
        let duration = Duration::from_millis(100);

        assert!(carousel.advance(3, start));
        assert_eq!(carousel.state().page_index, 0);
        assert!(carousel.tick(start + duration, duration));
        assert!(carousel.advance(3, start + duration));
    }

    #[test]
    fn test_progress() {
        let mut carousel = carousel();
        let start = Instant::now();
        let duration = Duration::from_millis(400);

        assert_eq!(carousel.progress(start, duration), None);
        carousel.advance(40, start);
        let halfway = carousel.progress(start + Duration::from_millis(200), duration).unwrap();
        assert!((halfway - 0.5).abs() < 0.01);
        assert_eq!(carousel.progress(start + duration * 3, duration), Some(1.0));
    }

    #[test]
    fn test_sync_drops_running_slide() {
        let mut carousel = carousel();
        carousel.sync(Some(3));
        carousel.advance(40, Instant::now());
        assert!(carousel.sync(Some(4)));
        assert!(carousel.slide().is_none());
        assert!(!carousel.state().transitioning);
    }
}
