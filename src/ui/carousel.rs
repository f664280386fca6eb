//! Carousel rows: a title line and six cards that slide on page changes.

use std::time::Instant;

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::browse::{Carousel, Direction, PAGE_SIZE};
use crate::catalog::{Fetch, Item};

use super::{format_meta, truncate};

/// Rows taken by one carousel: title line plus cards.
pub const ROW_HEIGHT: u16 = 6;
const CARD_HEIGHT: u16 = ROW_HEIGHT - 1;

/// Render as many carousels as fit, scrolled so the focused one is visible.
pub fn render_rows(frame: &mut Frame, app: &App, area: Rect, now: Instant) {
    let fits = usize::from((area.height / ROW_HEIGHT).max(1));
    let first = app.focused_row.saturating_sub(fits - 1);

    for (slot, row) in (first..app.carousels().len()).take(fits).enumerate() {
        let y = area.y + slot as u16 * ROW_HEIGHT;
        let height = ROW_HEIGHT.min(area.bottom().saturating_sub(y));
        if height < 2 {
            break;
        }
        render_row(frame, app, row, Rect::new(area.x, y, area.width, height), now);
    }
}

fn render_row(frame: &mut Frame, app: &App, row: usize, area: Rect, now: Instant) {
    let carousel = &app.carousels()[row];
    let focused = row == app.focused_row;
    let count = app.item_count(row);

    let title_style = if focused {
        app.theme.header
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let mut title = vec![Span::styled(format!(" {} ", carousel.title), title_style)];
    match app.fetch_for(row) {
        Fetch::Ready(_) => title.push(Span::styled(
            format!(
                "{}/{}",
                carousel.state().page_index + 1,
                carousel.max_page_index(count) + 1
            ),
            Style::default().add_modifier(Modifier::DIM),
        )),
        // A failed row looks like a loading one; the status bar lists the failure.
        Fetch::NotYetLoaded | Fetch::Unavailable(_) => title.push(Span::styled(
            "loading...",
            Style::default().add_modifier(Modifier::DIM),
        )),
    }
    frame.render_widget(Paragraph::new(Line::from(title)), Rect { height: 1, ..area });

    let cards = Rect::new(area.x, area.y + 1, area.width, area.height.saturating_sub(1));
    let card_width = (cards.width / PAGE_SIZE as u16).max(1);
    let width = i32::from(card_width) * PAGE_SIZE as i32;

    let visible = app.visible_items(row);
    let Some(progress) = carousel.progress(now, app.transition()) else {
        render_cards(frame, app, carousel, &visible, cards, card_width, 0, focused);
        return;
    };

    let slide = carousel.slide();
    let outgoing = slide
        .map(|slide| app.items_on_page(row, slide.from_page))
        .unwrap_or_default();
    let remaining = ((1.0 - progress) * width as f32) as i32;
    let (incoming_shift, outgoing_shift) = match carousel.state().direction {
        Direction::Forward => (remaining, remaining - width),
        Direction::Backward => (-remaining, width - remaining),
    };

    render_cards(frame, app, carousel, &outgoing, cards, card_width, outgoing_shift, false);
    render_cards(frame, app, carousel, &visible, cards, card_width, incoming_shift, focused);
}

#[allow(clippy::too_many_arguments)]
fn render_cards(
    frame: &mut Frame,
    app: &App,
    carousel: &Carousel,
    items: &[Item],
    area: Rect,
    card_width: u16,
    shift: i32,
    focused_row: bool,
) {
    let focused_card = app.focused_card.min(items.len().saturating_sub(1));
    for (i, item) in items.iter().enumerate() {
        let left = i32::from(area.x) + shift + i as i32 * i32::from(card_width);
        let Some(rect) = clip(left, i32::from(card_width), area) else {
            continue;
        };
        let focused = focused_row && i == focused_card;
        render_card(frame, app, carousel, item, rect, focused);
    }
}

/// Horizontal slice `[left, left + width)` of `area`, or `None` if off-screen.
fn clip(left: i32, width: i32, area: Rect) -> Option<Rect> {
    let start = left.max(i32::from(area.x));
    let end = (left + width).min(i32::from(area.right()));
    if end <= start {
        return None;
    }
    Some(Rect::new(start as u16, area.y, (end - start) as u16, area.height.min(CARD_HEIGHT)))
}

fn render_card(frame: &mut Frame, app: &App, carousel: &Carousel, item: &Item, area: Rect, focused: bool) {
    let border_style = if focused {
        Style::default().fg(app.theme.highlight)
    } else {
        Style::default().fg(app.theme.border)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(border_style);

    let inner = usize::from(area.width.saturating_sub(2));
    let title_style = if focused {
        app.theme.selected
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let genres = app.genres_for(item, carousel.kind).join(", ");
    let meta_style = item
        .vote_average
        .map(|vote| app.theme.rating_style(vote))
        .unwrap_or_default();

    let lines = vec![
        Line::from(Span::styled(truncate(&item.title, inner), title_style)),
        Line::from(Span::styled(
            truncate(&genres, inner),
            Style::default().add_modifier(Modifier::DIM),
        )),
        Line::from(Span::styled(truncate(&format_meta(item), inner), meta_style)),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
