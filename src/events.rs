use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::app::App;

/// File written by the export key.
pub const EXPORT_FILE: &str = "reelwatch_export.json";

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.search_input.is_some() {
        handle_search_input(app, key);
        return;
    }

    let now = Instant::now();

    // The overlay sits on top of its page; only a few keys reach through it
    if app.overlay_visible() {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                app.dismiss_overlay();
            }
            KeyCode::Backspace | KeyCode::Char('[') => {
                app.back();
            }
            KeyCode::Char(']') => {
                app.forward();
            }
            KeyCode::Char('q') => app.quit(),
            KeyCode::Char('?') => app.toggle_help(),
            _ => {}
        }
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // Page switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_page();
            } else {
                app.next_page();
            }
        }
        KeyCode::BackTab => app.prev_page(),
        KeyCode::Char('1') => app.show_home(),
        KeyCode::Char('2') => app.show_tv(),

        // Cards and carousels
        KeyCode::Left | KeyCode::Char('h') => app.move_left(now),
        KeyCode::Right | KeyCode::Char('l') => app.move_right(now),
        KeyCode::Char(',') => {
            app.retreat_focused(now);
        }
        KeyCode::Char('.') => {
            app.advance_focused(now);
        }
        KeyCode::Up | KeyCode::Char('k') => app.focus_up(),
        KeyCode::Down | KeyCode::Char('j') => app.focus_down(),

        // Detail
        KeyCode::Enter => {
            app.activate_focused();
        }
        KeyCode::Char('i') => {
            app.activate_featured();
        }

        // History
        KeyCode::Backspace | KeyCode::Char('[') => {
            app.back();
        }
        KeyCode::Char(']') => {
            app.forward();
        }

        // Search
        KeyCode::Char('/') => app.start_search(),

        KeyCode::Char('r') => app.retry(),
        KeyCode::Char('?') => app.toggle_help(),

        // Export
        KeyCode::Char('e') => {
            let export_path = std::path::PathBuf::from(EXPORT_FILE);
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle key input while the search prompt is open
fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            app.submit_search();
        }
        KeyCode::Esc => app.cancel_search(),
        KeyCode::Backspace => app.search_pop(),
        KeyCode::Char(c) => app.search_push(c),
        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    let now = Instant::now();
    match mouse.kind {
        MouseEventKind::ScrollUp => app.focus_up(),
        MouseEventKind::ScrollDown => app.focus_down(),
        MouseEventKind::ScrollLeft => {
            app.retreat_focused(now);
        }
        MouseEventKind::ScrollRight => {
            app.advance_focused(now);
        }
        // Right-click goes back
        MouseEventKind::Down(MouseButton::Right) => {
            if !app.dismiss_overlay() {
                app.back();
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browse::Location;
    use crate::catalog::{QueryCache, StaticCatalog};
    use crate::config::Settings;
    use std::sync::Arc;
    use tokio::runtime::Handle;

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn app_at(location: &str) -> App {
        let cache = QueryCache::new(Arc::new(StaticCatalog::new()), Handle::current());
        App::new(cache, &Settings::default(), Location::parse(location))
    }

    #[tokio::test]
    async fn test_search_prompt_captures_keys() {
        let mut app = app_at("/");
        press(&mut app, KeyCode::Char('/'));
        for c in "qa".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert!(app.running);
        assert_eq!(app.search_input.as_deref(), Some("qa"));

        press(&mut app, KeyCode::Enter);
        assert!(app.search_input.is_none());
        assert_eq!(app.location().keyword(), Some("qa"));
    }

    #[tokio::test]
    async fn test_escape_closes_overlay_and_backspace_goes_back() {
        let mut app = app_at("/");
        app.navigate(Location::parse("/movies/7?from=topRated"));

        press(&mut app, KeyCode::Esc);
        assert!(!app.overlay_visible());
        assert_eq!(app.location(), &Location::root());

        press(&mut app, KeyCode::Backspace);
        assert!(app.overlay_visible());
    }

    #[tokio::test]
    async fn test_help_swallows_next_key() {
        let mut app = app_at("/");
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.show_help);
        assert!(app.running);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[tokio::test]
    async fn test_tab_switches_pages() {
        let mut app = app_at("/");
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.location().path(), "/tv");
        press(&mut app, KeyCode::Tab);
        assert!(app.search_input.is_some());
    }
}
