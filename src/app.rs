//! Application state management for weathernews
//!
//! This module contains the main application state: the section strip and
//! its navigator, the per-section data, the map view, the search page and
//! the theme. Input handlers mutate state and queue [`Command`]s; the event
//! loop dispatches them and feeds the results back through [`App::apply`].

use std::collections::HashMap;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use tracing::{debug, info, warn};

use crate::cli::StartupConfig;
use crate::data::{NewsArticle, NewsTopic, WeatherError, WeatherReport};
use crate::fetch::{Command, FetchMessage};
use crate::map::{MapEngine, MapView, TileStatus};
use crate::prefs::PreferenceStore;
use crate::scroll::{ScrollController, WheelEvent};
use crate::search::{SearchPage, SearchState};
use crate::sections::{SectionKind, SectionList};
use crate::theme::Theme;

/// Vertical wheel delta reported per mouse wheel notch
pub const WHEEL_NOTCH_DELTA: f64 = 30.0;

/// Horizontal wheel delta per notch, in columns
pub const WHEEL_NOTCH_COLUMNS: f64 = 4.0;

/// Section width used until the first resize
const INITIAL_SECTION_WIDTH: f64 = 80.0;

/// Application state enum representing the current page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Section strip
    Home,
    /// City search page
    Search,
}

/// State of data loaded from the API
#[derive(Debug, Clone, PartialEq)]
pub enum Remote<T> {
    Loading,
    Loaded(T),
    /// The request succeeded but returned nothing to show
    Empty,
    Failed(String),
}

impl<T> Remote<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Remote::Loading)
    }
}

fn weather_remote(result: Result<WeatherReport, WeatherError>) -> Remote<Box<WeatherReport>> {
    match result {
        Ok(report) => Remote::Loaded(Box::new(report)),
        Err(e) => {
            warn!(error = %e, "weather fetch failed");
            Remote::Failed(e.to_string())
        }
    }
}

/// Main application struct managing state and data
pub struct App {
    /// Current page
    pub state: AppState,
    pub sections: SectionList,
    /// Owns the current section index
    pub scroll: ScrollController,
    pub theme: Theme,
    /// Popular cities, in display order
    pub most_viewed: Remote<Vec<WeatherReport>>,
    /// Highlighted city in the popular list
    pub most_viewed_selected: usize,
    pub current_location: Remote<Box<WeatherReport>>,
    pub news: HashMap<NewsTopic, Remote<Vec<NewsArticle>>>,
    pub map: MapView,
    pub search: SearchPage,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// One-line notice shown in the footer
    pub status: Option<String>,
    prefs: Option<PreferenceStore>,
    map_section: Option<usize>,
    commands: Vec<Command>,
}

impl App {
    /// Creates the application and queues the initial fetches
    ///
    /// A theme given on the command line overrides and replaces the stored one.
    pub fn new(
        config: &StartupConfig,
        engine: Box<dyn MapEngine>,
        prefs: Option<PreferenceStore>,
        now: Instant,
    ) -> Self {
        let theme = match (config.theme_override, &prefs) {
            (Some(theme), Some(store)) => {
                if let Err(e) = store.save_theme(theme) {
                    warn!(error = %e, "failed to save theme");
                }
                theme
            }
            (Some(theme), None) => theme,
            (None, Some(store)) => store.load_theme(),
            (None, None) => Theme::default(),
        };

        let sections = SectionList::home_page();
        let map_section = sections.position_of(SectionKind::WeatherMap);
        let mut scroll = ScrollController::new(sections.len(), INITIAL_SECTION_WIDTH);
        if config.start_section > 0 {
            scroll.navigate_to(config.start_section, now);
            // Start in place rather than animating there.
            scroll.resize(INITIAL_SECTION_WIDTH);
        }

        let news = NewsTopic::all()
            .iter()
            .map(|topic| (*topic, Remote::Loading))
            .collect();

        let mut app = Self {
            state: AppState::Home,
            sections,
            scroll,
            theme,
            most_viewed: Remote::Loading,
            most_viewed_selected: 0,
            current_location: Remote::Loading,
            news,
            map: MapView::new(engine, theme),
            search: SearchPage::new(),
            show_help: false,
            should_quit: false,
            status: None,
            prefs,
            map_section,
            commands: vec![
                Command::Locate,
                Command::MostViewed,
                Command::CurrentLocation,
                Command::News {
                    topics: NewsTopic::all().to_vec(),
                    refresh: false,
                },
            ],
        };
        app.sync_map_activity();
        app
    }

    /// Index of the section in view
    pub fn current_section(&self) -> usize {
        self.scroll.current_index()
    }

    pub fn current_kind(&self) -> Option<SectionKind> {
        self.sections.get(self.current_section()).map(|s| s.kind)
    }

    /// The popular city whose full report is shown
    pub fn selected_popular(&self) -> Option<&WeatherReport> {
        match &self.most_viewed {
            Remote::Loaded(reports) => reports.get(self.most_viewed_selected),
            _ => None,
        }
    }

    /// Drains the work queued since the last call
    pub fn take_commands(&mut self) -> Vec<Command> {
        let mut commands = std::mem::take(&mut self.commands);
        commands.extend(self.map.take_tile_requests().into_iter().map(Command::Tile));
        commands
    }

    /// The map is live only while its section is in view on the home page
    fn sync_map_activity(&mut self) {
        let active =
            self.state == AppState::Home && self.map_section == Some(self.current_section());
        self.map.set_active(active);
    }

    fn navigate_to(&mut self, index: usize, now: Instant) {
        self.scroll.navigate_to(index, now);
        self.sync_map_activity();
    }

    fn step(&mut self, forward: bool, now: Instant) {
        self.scroll.step(forward, now);
        self.sync_map_activity();
    }

    /// Advances timers: scroll animation and debounce, typeahead debounce,
    /// map events
    pub fn tick(&mut self, now: Instant) {
        if self.scroll.tick(now).is_some() {
            self.sync_map_activity();
        }

        if let Some(request) = self.search.typeahead.tick(now) {
            self.commands.push(Command::Suggestions(request));
        }

        self.map.poll_events();
    }

    /// The terminal changed size
    pub fn resize(&mut self, width: u16) {
        self.scroll.resize(width as f64);
        self.map.resize();
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q` or `Esc` (home): Quit; `Ctrl+C` quits anywhere
    /// - `Left`/`h`, `Right`/`l`: Previous / next section
    /// - `Home`/`End`, `1`-`7`: Jump to a section
    /// - `/` or `s`: Open the search page
    /// - `d`: Toggle light/dark theme
    /// - `r`: Re-fetch the section in view
    /// - `[`/`]`, `Space`: Move through and toggle map overlays
    /// - `H`/`J`/`K`/`L`, `c`: Pan and recenter the map
    /// - `?`: Toggle help
    pub fn handle_key(&mut self, key_event: KeyEvent, now: Instant) {
        if key_event.modifiers.contains(KeyModifiers::CONTROL)
            && key_event.code == KeyCode::Char('c')
        {
            self.should_quit = true;
            return;
        }

        // Handle help overlay - intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        match self.state {
            AppState::Home => self.handle_home_key(key_event, now),
            AppState::Search => self.handle_search_key(key_event, now),
        }
    }

    fn handle_home_key(&mut self, key_event: KeyEvent, now: Instant) {
        if self.current_kind() == Some(SectionKind::WeatherMap) && self.handle_map_key(key_event) {
            return;
        }
        if self.current_kind() == Some(SectionKind::MostViewed)
            && self.handle_most_viewed_key(key_event)
        {
            return;
        }

        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.step(false, now);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.step(true, now);
            }
            KeyCode::Home => {
                self.navigate_to(0, now);
            }
            KeyCode::End => {
                self.navigate_to(self.sections.len().saturating_sub(1), now);
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = (c as usize) - ('1' as usize);
                if index < self.sections.len() {
                    self.navigate_to(index, now);
                }
            }
            KeyCode::Char('/') | KeyCode::Char('s') => {
                self.open_search();
            }
            KeyCode::Char('d') => {
                self.toggle_theme();
            }
            KeyCode::Char('r') => {
                self.refresh_current();
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            _ => {}
        }
    }

    /// Map controls; returns true if the key was handled
    fn handle_map_key(&mut self, key_event: KeyEvent) -> bool {
        match key_event.code {
            KeyCode::Char('[') => self.map.move_switcher_cursor(false),
            KeyCode::Char(']') => self.map.move_switcher_cursor(true),
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.map.toggle_selected_overlay();
            }
            KeyCode::Char('H') => self.map.pan(-1.0, 0.0),
            KeyCode::Char('L') => self.map.pan(1.0, 0.0),
            KeyCode::Char('K') => self.map.pan(0.0, 1.0),
            KeyCode::Char('J') => self.map.pan(0.0, -1.0),
            KeyCode::Char('c') => self.map.recenter(),
            _ => return false,
        }
        true
    }

    /// Moves through the popular cities; returns true if the key was handled
    fn handle_most_viewed_key(&mut self, key_event: KeyEvent) -> bool {
        let Remote::Loaded(reports) = &self.most_viewed else {
            return false;
        };
        let last = reports.len().saturating_sub(1);

        match key_event.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.most_viewed_selected = self.most_viewed_selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.most_viewed_selected = (self.most_viewed_selected + 1).min(last);
            }
            _ => return false,
        }
        true
    }

    fn handle_search_key(&mut self, key_event: KeyEvent, now: Instant) {
        let failed = matches!(
            self.search.state(),
            SearchState::NotFound(_) | SearchState::Failed(_)
        );

        match key_event.code {
            KeyCode::Esc => {
                if self.search.typeahead.suggestions().is_empty() {
                    self.close_search();
                } else {
                    self.search.typeahead.dismiss();
                }
            }
            KeyCode::Char('r') if failed && key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                self.search.retry();
            }
            KeyCode::Enter => {
                if let Some(request) = self.search.enter() {
                    info!(city = %request.city, "searching");
                    self.commands.push(Command::Search(request));
                }
            }
            KeyCode::Up => self.search.typeahead.highlight_prev(),
            KeyCode::Down => self.search.typeahead.highlight_next(),
            KeyCode::Backspace => self.search.typeahead.backspace(now),
            KeyCode::Char(c)
                if !key_event
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.search.typeahead.push_char(c, now);
            }
            _ => {}
        }
    }

    /// Mouse wheel over the strip; shift turns vertical scrolling horizontal
    pub fn handle_mouse(&mut self, mouse_event: MouseEvent, now: Instant) {
        if self.state != AppState::Home || self.show_help {
            return;
        }

        let shift = mouse_event.modifiers.contains(KeyModifiers::SHIFT);
        let event = match (mouse_event.kind, shift) {
            (MouseEventKind::ScrollDown, false) => WheelEvent::vertical(WHEEL_NOTCH_DELTA),
            (MouseEventKind::ScrollUp, false) => WheelEvent::vertical(-WHEEL_NOTCH_DELTA),
            (MouseEventKind::ScrollRight, _) | (MouseEventKind::ScrollDown, true) => {
                WheelEvent::horizontal(WHEEL_NOTCH_COLUMNS)
            }
            (MouseEventKind::ScrollLeft, _) | (MouseEventKind::ScrollUp, true) => {
                WheelEvent::horizontal(-WHEEL_NOTCH_COLUMNS)
            }
            _ => return,
        };

        let before = self.current_section();
        self.scroll.on_wheel(event, now);
        if self.current_section() != before {
            self.sync_map_activity();
        }
    }

    fn open_search(&mut self) {
        self.state = AppState::Search;
        self.scroll.cancel_pending();
        self.sync_map_activity();
    }

    fn close_search(&mut self) {
        self.state = AppState::Home;
        self.sync_map_activity();
    }

    /// Switches theme, updates the map and saves the choice
    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        self.map.set_theme(self.theme);
        info!(theme = self.theme.as_str(), "theme changed");

        if let Some(store) = &self.prefs {
            if let Err(e) = store.save_theme(self.theme) {
                warn!(error = %e, "failed to save theme");
                self.status = Some(format!("Theme not saved: {}", e));
            }
        }
    }

    /// Re-fetches the data of the section in view; on the home section,
    /// everything
    pub fn refresh_current(&mut self) {
        match self.current_kind() {
            Some(SectionKind::MostViewed) => self.refresh_most_viewed(),
            Some(SectionKind::CurrentLocation) => self.refresh_current_location(),
            Some(SectionKind::News(topic)) => self.refresh_news(vec![topic]),
            Some(SectionKind::Home) => {
                self.refresh_most_viewed();
                self.refresh_current_location();
                self.refresh_news(NewsTopic::all().to_vec());
            }
            Some(SectionKind::WeatherMap) | None => {}
        }
    }

    fn refresh_most_viewed(&mut self) {
        self.most_viewed = Remote::Loading;
        self.commands.push(Command::MostViewed);
    }

    fn refresh_current_location(&mut self) {
        self.current_location = Remote::Loading;
        self.commands.push(Command::CurrentLocation);
    }

    fn refresh_news(&mut self, topics: Vec<NewsTopic>) {
        for topic in &topics {
            self.news.insert(*topic, Remote::Loading);
        }
        self.commands.push(Command::News {
            topics,
            refresh: true,
        });
    }

    /// Applies the result of a background fetch
    pub fn apply(&mut self, message: FetchMessage) {
        match message {
            FetchMessage::Search { generation, result } => {
                if !self.search.apply_result(generation, result) {
                    debug!(generation, "dropping superseded search result");
                }
            }
            FetchMessage::Suggestions { generation, result } => {
                let suggestions = result.unwrap_or_else(|e| {
                    warn!(error = %e, "suggestion lookup failed");
                    Vec::new()
                });
                self.search.typeahead.apply_suggestions(generation, suggestions);
            }
            FetchMessage::MostViewed(result) => {
                self.most_viewed = match result {
                    Ok(reports) if reports.is_empty() => Remote::Empty,
                    Ok(reports) => Remote::Loaded(reports),
                    Err(e) => {
                        warn!(error = %e, "popular cities failed to load");
                        Remote::Failed(e.to_string())
                    }
                };
                self.most_viewed_selected = 0;
            }
            FetchMessage::CurrentLocation(result) => {
                self.current_location = weather_remote(result);
            }
            FetchMessage::News { topic, result } => {
                let state = match result {
                    Ok(articles) if articles.is_empty() => Remote::Empty,
                    Ok(articles) => Remote::Loaded(articles),
                    Err(e) => {
                        warn!(error = %e, topic = topic.query(), "news fetch failed");
                        Remote::Failed(e.to_string())
                    }
                };
                self.news.insert(topic, state);
            }
            FetchMessage::Located(position) => {
                self.map.center_resolved(position);
            }
            FetchMessage::Tile { request, result } => {
                let status = match result {
                    Ok(size) => TileStatus::Loaded(size),
                    Err(e) => TileStatus::Failed(e.to_string()),
                };
                self.map.record_tile(request, status);
            }
        }
    }
}
