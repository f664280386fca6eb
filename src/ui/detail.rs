//! Detail overlay rendering.
//!
//! Displays a modal overlay for the item named by the current location. The
//! overlay grows in over the transition duration; a new layout key restarts
//! the growth.

use std::time::Instant;

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::browse::{Resolution, Scope};
use crate::catalog::{ImageSize, Item, MediaKind};

use super::format_meta;

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 40;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 12;

/// Render the detail overlay for the current selection.
///
/// Renders nothing when the item can't be found or its data failed; shows a
/// small loading box while the data is still on its way.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect, now: Instant) {
    // Skip rendering if terminal is too small for the overlay
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    match app.resolve_selection() {
        Resolution::Found(item) => render_item(frame, app, &item, area, now),
        Resolution::NotYetLoaded => render_loading(frame, app, area),
        Resolution::Unavailable(_) | Resolution::NotFound => {}
    }
}

/// Area of the overlay at `progress` through its growth.
fn overlay_area(area: Rect, progress: f32) -> Rect {
    let four_fifths = |side: u16| (u32::from(side) * 4 / 5) as u16;
    let full_width = four_fifths(area.width).clamp(MIN_OVERLAY_WIDTH, 100);
    let full_height = four_fifths(area.height).clamp(MIN_OVERLAY_HEIGHT, 30);

    let grow = |min: u16, full: u16| min + ((full - min) as f32 * progress.clamp(0.0, 1.0)) as u16;
    let width = grow(MIN_OVERLAY_WIDTH.min(full_width) / 2, full_width);
    let height = grow(MIN_OVERLAY_HEIGHT.min(full_height) / 2, full_height);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn render_item(frame: &mut Frame, app: &App, item: &Item, area: Rect, now: Instant) {
    let overlay = overlay_area(area, app.overlay_progress(now));
    frame.render_widget(Clear, overlay);

    let kind = app.selection_kind().unwrap_or(match app.page().scope() {
        Scope::Tv => MediaKind::Tv,
        Scope::Movies | Scope::Search => MediaKind::Movie,
    });
    let genres = app.genres_for(item, kind);
    let label = Style::default().add_modifier(Modifier::DIM);

    let mut lines = vec![
        Line::from(Span::styled(format!(" {} ", item.title), app.theme.header)),
        Line::from(""),
    ];
    if !genres.is_empty() {
        lines.push(Line::from(vec![Span::styled(" Genres: ", label), Span::raw(genres.join(", "))]));
    }
    let meta = format_meta(item);
    if !meta.is_empty() {
        let style = item
            .vote_average
            .map(|vote| app.theme.rating_style(vote))
            .unwrap_or_default();
        lines.push(Line::from(vec![Span::raw(" "), Span::styled(meta, style)]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(format!(" {}", item.overview)));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(" Poster:   ", label),
        Span::raw(app.images.resolve(item.poster_path.as_deref(), Some(ImageSize::W500))),
    ]));
    lines.push(Line::from(vec![
        Span::styled(" Backdrop: ", label),
        Span::raw(app.images.resolve(item.backdrop_path.as_deref(), None)),
    ]));

    let block = Block::default()
        .title(" Detail ")
        .title_bottom(Line::from(" Esc:close  [:back ").alignment(Alignment::Right))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, overlay);
}

fn render_loading(frame: &mut Frame, app: &App, area: Rect) {
    let width = 20u16.min(area.width);
    let box_area = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + area.height.saturating_sub(3) / 2,
        width,
        3,
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(Clear, box_area);
    frame.render_widget(
        Paragraph::new("Loading...").alignment(Alignment::Center).block(block),
        box_area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browse::Location;
    use crate::catalog::{Collection, QueryCache, QueryKey, ResultPage, StaticCatalog};
    use crate::config::Settings;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;
    use tokio::runtime::Handle;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect()
    }

    async fn app_at(location: &str) -> App {
        let catalog = Arc::new(StaticCatalog::new());
        catalog.insert_page(
            QueryKey::collection(MediaKind::Movie, Collection::TopRated),
            ResultPage::new(vec![Item {
                id: 42,
                title: "Parasite".to_string(),
                overview: "A poor family schemes".to_string(),
                ..Default::default()
            }]),
        );
        let cache = QueryCache::new(catalog, Handle::current());
        let mut settings = Settings::default();
        settings.ui.transition_ms = 0;
        let mut app = App::new(cache, &settings, Location::parse(location));
        app.cache.settle().await;
        app.tick(Instant::now());
        app
    }

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|frame| render_overlay(frame, app, frame.area(), Instant::now()))
            .unwrap();
        screen_text(&terminal)
    }

    #[tokio::test]
    async fn test_found_item_is_drawn() {
        let app = app_at("/movies/42?from=topRated").await;
        let screen = draw(&app);
        assert!(screen.contains("Parasite"));
        assert!(screen.contains("placeholder.png"));
    }

    #[tokio::test]
    async fn test_missing_item_draws_nothing() {
        let app = app_at("/movies/7").await;
        assert!(draw(&app).trim().is_empty());

        let app = app_at("/movies/abc").await;
        assert!(draw(&app).trim().is_empty());
    }

    #[test]
    fn test_overlay_grows() {
        let area = Rect::new(0, 0, 100, 30);
        let start = overlay_area(area, 0.0);
        let end = overlay_area(area, 1.0);
        assert!(start.width < end.width);
        assert!(start.height < end.height);
        assert_eq!(end.width, 80);
        assert_eq!(end.height, 24);
    }

    #[test]
    fn test_overlay_fits_very_wide_terminal() {
        let area = Rect::new(0, 0, 1000, 60);
        let end = overlay_area(area, 1.0);
        assert_eq!(end, Rect::new(450, 15, 100, 30));
    }
}
