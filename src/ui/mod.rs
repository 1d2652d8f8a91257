//! UI rendering module for weathernews
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.
//!
//! The home page is a horizontal strip: every section is one body-width panel,
//! and the panels are drawn shifted left by the navigator's scroll offset, so
//! two neighbours share the screen while a transition animates.

pub mod help_overlay;
pub mod home;
pub mod map;
pub mod news;
pub mod search;
pub mod weather;
pub mod widgets;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use crate::app::{App, AppState};
use crate::theme::Palette;

pub use help_overlay::render as render_help_overlay;

/// Renders the whole screen for the current application state
pub fn render(frame: &mut Frame, app: &App) {
    let palette = app.theme.palette();
    let area = frame.area();

    frame.render_widget(
        Block::default().style(Style::default().bg(palette.background).fg(palette.text)),
        area,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(frame, app, chunks[0], &palette);
    match app.state {
        AppState::Home => {
            render_strip(app, chunks[1], frame.buffer_mut(), &palette);
            render_nav(frame, app, chunks[2], &palette);
        }
        AppState::Search => search::render(frame, &app.search, chunks[1], &palette),
    }
    render_footer(frame, app, chunks[3], &palette);

    if app.show_help {
        render_help_overlay(frame, &palette);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let title = match app.state {
        AppState::Home => app
            .current_kind()
            .map(|kind| kind.name())
            .unwrap_or_default(),
        AppState::Search => "Search",
    };

    let line = Line::from(vec![
        Span::styled(
            " Weather News ",
            Style::default()
                .fg(palette.background)
                .bg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {}", title), Style::default().fg(palette.text)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Draws the sections overlapping `area` at the current scroll offset
fn render_strip(app: &App, area: Rect, buf: &mut Buffer, palette: &Palette) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let width = area.width as f64;
    let section_width = app.scroll.section_width();
    let offset = if section_width > 0.0 {
        app.scroll.offset() / section_width * width
    } else {
        0.0
    };

    for section in app.sections.iter() {
        let left = (section.index as f64 * width - offset).round() as i64;
        if left >= area.width as i64 || left + area.width as i64 <= 0 {
            continue;
        }

        let local = Rect::new(0, 0, area.width, area.height);
        let mut panel = Buffer::empty(local);
        home::render_section(section.kind, app, local, &mut panel, palette);
        blit(&panel, left, area, buf);
    }
}

/// Copies the columns of `panel` that land inside `area` when shifted by `left`
fn blit(panel: &Buffer, left: i64, area: Rect, buf: &mut Buffer) {
    for y in 0..panel.area.height {
        for x in 0..panel.area.width {
            let column = left + x as i64;
            if column < 0 || column >= area.width as i64 {
                continue;
            }
            let target = (area.x + column as u16, area.y + y);
            if let (Some(src), Some(dst)) = (panel.cell((x, y)), buf.cell_mut(target)) {
                *dst = src.clone();
            }
        }
    }
}

/// Position dots under the strip, one per section
fn render_nav(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let current = app.current_section();
    let mut spans = Vec::with_capacity(app.sections.len() * 2 + 1);
    let home_style = if current == 0 {
        Style::default().fg(palette.accent)
    } else {
        Style::default().fg(palette.muted)
    };
    spans.push(Span::styled("⌂  ", home_style));
    for section in app.sections.iter() {
        let (dot, style) = if section.index == current {
            ("●", Style::default().fg(palette.accent))
        } else {
            ("○", Style::default().fg(palette.muted))
        };
        spans.push(Span::styled(dot, style));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let key = Style::default().fg(palette.accent);
    let muted = Style::default().fg(palette.muted);

    let mut spans = match app.state {
        AppState::Home => vec![
            Span::styled(" ←/→", key),
            Span::styled(" sections  ", muted),
            Span::styled("/", key),
            Span::styled(" search  ", muted),
            Span::styled("d", key),
            Span::styled(" theme  ", muted),
            Span::styled("?", key),
            Span::styled(" help  ", muted),
            Span::styled("q", key),
            Span::styled(" quit", muted),
        ],
        AppState::Search => vec![
            Span::styled(" Enter", key),
            Span::styled(" search  ", muted),
            Span::styled("↑/↓", key),
            Span::styled(" suggestions  ", muted),
            Span::styled("Esc", key),
            Span::styled(" back", muted),
        ],
    };

    if let Some(status) = &app.status {
        spans.push(Span::styled(
            format!("  {}", status),
            Style::default().fg(palette.error),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::StartupConfig;
    use crate::map::CanvasEngine;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::{Duration, Instant};

    fn test_app() -> App {
        let mut app = App::new(
            &StartupConfig::default(),
            Box::new(CanvasEngine),
            None,
            Instant::now(),
        );
        app.resize(80);
        app
    }

    fn draw(app: &App) -> String {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_home_renders_header_and_intro() {
        let content = draw(&test_app());
        assert!(content.contains("Weather News"));
        assert!(content.contains("to search for a city"));
        assert!(content.contains("●"));
    }

    #[test]
    fn test_settled_strip_shows_only_current_section() {
        let mut app = test_app();
        let now = Instant::now();
        app.handle_key(KeyEvent::new(KeyCode::Char('5'), KeyModifiers::NONE), now);
        app.tick(now + Duration::from_secs(5));

        let content = draw(&app);
        assert!(content.contains("Tornado News"));
        assert!(!content.contains("Storm News"));
        assert!(!content.contains("to search for a city"));
    }

    #[test]
    fn test_search_page_replaces_strip() {
        let mut app = test_app();
        app.handle_key(KeyEvent::new(KeyCode::Char('/'), KeyModifiers::NONE), Instant::now());

        let content = draw(&app);
        assert!(content.contains("Enter city name"));
        assert!(!content.contains("●"));
    }

    #[test]
    fn test_help_overlay_on_top() {
        let mut app = test_app();
        app.show_help = true;
        assert!(draw(&app).contains("Keyboard Shortcuts"));
    }

    #[test]
    fn test_status_in_footer() {
        let mut app = test_app();
        app.status = Some("Theme not saved".into());
        assert!(draw(&app).contains("Theme not saved"));
    }

    #[test]
    fn test_blit_clips_to_area() {
        let panel_area = Rect::new(0, 0, 4, 1);
        let mut panel = Buffer::empty(panel_area);
        panel.set_string(0, 0, "abcd", Style::default());

        let mut buf = Buffer::empty(Rect::new(0, 0, 4, 1));
        blit(&panel, 2, buf.area, &mut buf);

        let row: String = buf.content().iter().map(|cell| cell.symbol()).collect();
        assert_eq!(row, "  ab");
    }
}
