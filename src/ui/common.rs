//! Common UI components shared across pages.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::App;
use crate::browse::Page;

/// Render the header bar.
///
/// Displays: brand, current location, history availability, catalog.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let dim = Style::default().add_modifier(Modifier::DIM);
    let arrow = |enabled: bool, glyph: &'static str| {
        if enabled {
            Span::raw(glyph)
        } else {
            Span::styled(glyph, dim)
        }
    };

    let mut spans = vec![
        Span::styled(" REELWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        arrow(app.can_go_back(), "◀"),
        arrow(app.can_go_forward(), "▶"),
        Span::raw(" "),
        Span::styled(app.location().to_string(), Style::default().fg(app.theme.highlight)),
        Span::raw(" │ "),
    ];

    let loading = app.cache.in_flight();
    if loading > 0 {
        spans.push(Span::raw(format!("loading {} │ ", loading)));
    }
    spans.push(Span::styled(app.source_description().to_string(), dim));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing the pages.
///
/// Highlights the active page and shows the active keyword on Search.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let search = match app.page() {
        Page::Search { keyword } if !keyword.is_empty() => format!(" Search: {} ", keyword),
        _ => " Search ".to_string(),
    };
    let titles: Vec<Line> = vec![
        Line::from(" 1:Home "),
        Line::from(" 2:TV Shows "),
        Line::from(search),
    ];

    let selected = match app.page() {
        Page::Home => 0,
        Page::Tv => 1,
        Page::Search { .. } => 2,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows the search prompt while it is open, then temporary messages, then
/// failed collections, then the available controls.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(input) = &app.search_input {
        let line = Line::from(vec![
            Span::styled(" Search: ", app.theme.header),
            Span::raw(format!("{}█", input)),
            Span::styled(" | Enter:search Esc:cancel", Style::default().add_modifier(Modifier::DIM)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let unavailable = app.unavailable_rows();
    if !unavailable.is_empty() {
        let failed: Vec<String> = unavailable
            .iter()
            .map(|(title, reason)| format!("{} ({})", title, reason))
            .collect();
        let paragraph = Paragraph::new(format!(" Unavailable: {} | r:retry", failed.join(", ")))
            .style(Style::default().fg(app.theme.error));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = if app.overlay_visible() {
        "Esc:close [:back ]:forward ?:help q:quit"
    } else if matches!(app.page(), Page::Home) {
        "←→:move ,.:page ↑↓:row Enter:detail i:featured /:search ?:help q:quit"
    } else {
        "←→:move ,.:page ↑↓:row Enter:detail /:search Tab:page ?:help q:quit"
    };

    let paragraph = Paragraph::new(format!(" {} | {}", app.location(), controls))
        .style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current page.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(title, Style::default().add_modifier(Modifier::BOLD))])
    };
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Carousels"),
        Line::from("  ←/→ h/l    Move card, page at edges"),
        Line::from("  , .        Previous / next page"),
        Line::from("  ↑/↓ j/k    Switch carousel"),
        Line::from("  Enter      Open detail"),
        Line::from("  i          Featured: more info"),
        Line::from(""),
        section(" Navigation"),
        Line::from("  Esc        Close detail"),
        Line::from("  Bksp / [   Back"),
        Line::from("  ]          Forward"),
        Line::from("  Tab 1 2    Switch page"),
        Line::from("  /          Search (2+ characters)"),
        Line::from(""),
        section(" General"),
        Line::from("  r          Retry failed requests"),
        Line::from("  e          Export to JSON"),
        Line::from("  q          Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 44u16.min(area.width.saturating_sub(4));
    let help_height = 24u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
