//! Weather News - weather conditions, forecasts and severe weather news
//!
//! A terminal UI application that shows the weather for a city and the
//! user's location, a weather map with overlays, and storm, flood and
//! tornado news from the Weather News API.

use std::io;
use std::panic;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use weathernews::app::App;
use weathernews::cache::CacheManager;
use weathernews::cli::{Cli, StartupConfig};
use weathernews::data::{Geolocator, NewsClient};
use weathernews::fetch::{Clients, Fetcher};
use weathernews::logging;
use weathernews::map::CanvasEngine;
use weathernews::prefs::PreferenceStore;
use weathernews::ui;

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    match logging::init(config.log_file.as_deref()) {
        Ok(path) => info!(log = %path.display(), base_url = %config.base_url, "starting"),
        Err(e) => eprintln!("Warning: logging disabled: {}", e),
    }

    let news = match CacheManager::new() {
        Some(cache) => NewsClient::with_cache(config.base_url.clone(), cache),
        None => {
            warn!("no cache directory, news will not be cached");
            NewsClient::new(config.base_url.clone())
        }
    };
    let geolocator = config.geolocation.then(Geolocator::new);
    let mut fetcher = Fetcher::new(Clients::new(&config.base_url, news, geolocator));

    let mut app = App::new(
        &config,
        Box::new(CanvasEngine),
        PreferenceStore::new(),
        Instant::now(),
    );

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    app.resize(terminal.size()?.width);

    // Main event loop
    loop {
        // Render UI
        terminal.draw(|f| ui::render(f, &app))?;

        // Poll for input with 100ms timeout; animations advance on every pass
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_key(key, Instant::now());
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse, Instant::now()),
                Event::Resize(width, _) => app.resize(width),
                _ => {}
            }
        }

        app.tick(Instant::now());

        for command in app.take_commands() {
            fetcher.dispatch(command);
        }
        while let Some(message) = fetcher.try_recv() {
            app.apply(message);
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    info!("exiting");

    Ok(())
}
