use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelwatch::browse::Location;
use reelwatch::catalog::{HttpCatalog, QueryCache};
use reelwatch::config::{Overrides, Settings};
use reelwatch::ui::{self, Theme};
use reelwatch::{events, App};

#[derive(Parser, Debug)]
#[command(name = "reelwatch")]
#[command(about = "Browse movie and TV collections from the terminal")]
struct Args {
    /// Path to a TOML config file (default: ./reelwatch.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Catalog API key (overrides config file and REELWATCH_API__KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Location to open, e.g. "/movies/550?from=topRated" or "/search?keyword=dune"
    #[arg(short, long)]
    location: Option<String>,

    /// Write logs to this file (the terminal belongs to the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Export the state at --location to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(ref path) = args.log_file {
        init_logging(path)?;
    }

    let overrides = Overrides {
        api_key: args.api_key.clone(),
    };
    let settings =
        Settings::load(args.config.as_deref(), &overrides).context("failed to load configuration")?;

    // Fetches run on a background runtime; the terminal loop stays on this thread
    let runtime = tokio::runtime::Runtime::new()?;
    let catalog = HttpCatalog::new(&settings.api).context("failed to create catalog client")?;
    let cache = QueryCache::new(Arc::new(catalog), runtime.handle().clone());

    let initial = args.location.as_deref().map(Location::parse).unwrap_or_default();
    tracing::info!(location = %initial, "starting");
    let mut app = App::new(cache, &settings, initial);

    // Handle export mode (non-interactive)
    if let Some(export_path) = args.export {
        return export_to_file(&runtime, &mut app, &export_path);
    }

    app.theme = Theme::auto_detect();
    run_tui(&mut app, settings.ui.tick())
}

/// Send `tracing` output to `path`.
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create log file {}", path.display()))?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelwatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .init();
    Ok(())
}

/// Run the TUI until the user quits
fn run_tui(app: &mut App, tick: Duration) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let result = run_app(&mut terminal, app, tick);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tick: Duration,
) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 16;

    while app.running {
        let now = Instant::now();
        app.tick(now);

        terminal.draw(|frame| {
            let area = frame.area();

            // Check for minimum terminal size
            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                frame.render_widget(paragraph, ui::too_small_area(area));
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Banner and carousels
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);
            ui::render_page(frame, app, chunks[2], now);
            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.overlay_visible() {
                ui::detail::render_overlay(frame, app, area, now);
            }

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        if let Some(event) = events::poll_event(tick)? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }
    }

    Ok(())
}

/// Wait for every request the location needs, then export the app state
fn export_to_file(runtime: &tokio::runtime::Runtime, app: &mut App, export_path: &Path) -> Result<()> {
    runtime.block_on(app.cache.settle());
    app.tick(Instant::now());
    app.export_state(export_path)?;

    println!("Exported {} to: {}", app.location(), export_path.display());
    Ok(())
}
