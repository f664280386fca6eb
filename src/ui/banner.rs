//! Featured banner shown above the Home carousels.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::catalog::{ImageSize, MediaKind};

use super::format_meta;

/// Rows taken by the banner, borders included.
pub const BANNER_HEIGHT: u16 = 7;

/// Render the featured item: title, genres, overview and its backdrop URL.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Featured ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let Some(item) = app.featured_item() else {
        let paragraph = Paragraph::new(" Loading...")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    };

    let genres = app.genres_for(&item, MediaKind::Movie).join(", ");
    let mut meta = vec![Span::raw(format!(" {} ", format_meta(&item)))];
    if !genres.is_empty() {
        meta.push(Span::styled(format!("│ {}", genres), Style::default().add_modifier(Modifier::DIM)));
    }

    let lines = vec![
        Line::from(vec![
            Span::styled(format!(" {} ", item.title), app.theme.header),
            Span::styled("  i: more info", Style::default().add_modifier(Modifier::DIM)),
        ]),
        Line::from(meta),
        Line::from(Span::styled(
            format!(" {}", app.images.resolve(item.backdrop_path.as_deref(), Some(ImageSize::W1280))),
            Style::default().fg(app.theme.border).add_modifier(Modifier::ITALIC),
        )),
        Line::from(format!(" {}", item.overview)),
    ];

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
