//! Terminal rendering with ratatui.
//!
//! ```text
//! header      brand, location, history
//! tabs        Home | TV Shows | Search
//! content     banner (Home) + carousel rows
//! status bar  prompt, messages, failures, controls
//! ```
//!
//! The detail and help overlays are drawn last, on top of everything.

pub mod banner;
pub mod carousel;
pub mod common;
pub mod detail;
pub mod theme;

pub use theme::Theme;

use std::time::Instant;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::browse::Page;
use crate::catalog::Item;

/// Render the content area of the current page.
pub fn render_page(frame: &mut Frame, app: &App, area: Rect, now: Instant) {
    if app.carousels().is_empty() {
        let hint = match app.page() {
            Page::Search { .. } => "Press / to search movies and TV shows",
            _ => "Nothing to show",
        };
        let paragraph = Paragraph::new(hint)
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::DIM));
        let centered = Rect::new(area.x, area.y + area.height / 2, area.width, 1);
        frame.render_widget(paragraph, centered);
        return;
    }

    let has_banner = app.carousels().iter().any(|c| c.is_featured());
    let rows_area = if has_banner {
        let chunks =
            Layout::vertical([Constraint::Length(banner::BANNER_HEIGHT), Constraint::Min(0)]).split(area);
        banner::render(frame, app, chunks[0]);
        chunks[1]
    } else {
        area
    };

    carousel::render_rows(frame, app, rows_area, now);
}

/// `2019 · ★ 7.8`, or whatever part of it is known.
pub fn format_meta(item: &Item) -> String {
    let year = item.release().map(|date| date.split('-').next().unwrap_or(date));
    let rating = item.vote_average.map(|vote| format!("★ {:.1}", vote));
    match (year, rating) {
        (Some(year), Some(rating)) => format!("{} · {}", year, rating),
        (Some(year), None) => year.to_string(),
        (None, Some(rating)) => rating,
        (None, None) => String::new(),
    }
}

/// Truncate to `width` characters, marking the cut with an ellipsis.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(width - 1).collect();
    out.push('…');
    out
}

/// Five centered rows for the terminal-too-small notice, clipped to `area`.
pub fn too_small_area(area: Rect) -> Rect {
    let top = (area.height / 2).saturating_sub(2);
    let height = 5.min(area.height - top);
    Rect::new(area.x, area.y + top, area.width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_small_area_fits_short_terminals() {
        let notice = too_small_area(Rect::new(0, 0, 50, 3));
        assert_eq!(notice, Rect::new(0, 0, 50, 3));

        let notice = too_small_area(Rect::new(0, 0, 50, 1));
        assert_eq!(notice.height, 1);

        let notice = too_small_area(Rect::new(0, 0, 50, 0));
        assert_eq!(notice.height, 0);

        let area = Rect::new(2, 4, 50, 12);
        let notice = too_small_area(area);
        assert_eq!(notice, Rect::new(2, 8, 50, 5));
        assert!(notice.bottom() <= area.bottom());
    }

    #[test]
    fn test_format_meta() {
        let item = Item {
            release_date: Some("2019-10-04".to_string()),
            vote_average: Some(8.44),
            ..Default::default()
        };
        assert_eq!(format_meta(&item), "2019 · ★ 8.4");
        assert_eq!(format_meta(&Item::default()), "");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Parasite", 20), "Parasite");
        assert_eq!(truncate("The Lord of the Rings", 8), "The Lor…");
        assert_eq!(truncate("abc", 0), "");
    }
}
