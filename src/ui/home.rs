//! Home section and the per-section dispatch

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use super::{map, news, weather};
use crate::app::App;
use crate::sections::SectionKind;
use crate::theme::Palette;

/// Renders one section of the strip into `buf`
pub fn render_section(kind: SectionKind, app: &App, area: Rect, buf: &mut Buffer, palette: &Palette) {
    match kind {
        SectionKind::Home => render_intro(app, area, buf, palette),
        SectionKind::MostViewed => weather::render_popular(
            kind.name(),
            &app.most_viewed,
            app.most_viewed_selected,
            area,
            buf,
            palette,
        ),
        SectionKind::CurrentLocation => {
            weather::render_remote(kind.name(), &app.current_location, area, buf, palette)
        }
        SectionKind::WeatherMap => map::render(&app.map, area, buf, palette),
        SectionKind::News(topic) => news::render(topic, app.news.get(&topic), area, buf, palette),
    }
}

fn render_intro(app: &App, area: Rect, buf: &mut Buffer, palette: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border));

    let key = Style::default().fg(palette.accent);
    let muted = Style::default().fg(palette.muted);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Weather News",
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Forecasts, a live weather map and severe weather news",
            Style::default().fg(palette.text),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("/ or s", key),
            Span::styled(" to search for a city", muted),
        ]),
        Line::from(vec![
            Span::styled("← →", key),
            Span::styled(" or the mouse wheel to browse", muted),
        ]),
        Line::from(""),
    ];

    for section in app.sections.iter().skip(1) {
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", section.index + 1), key),
            Span::styled(section.name.clone(), Style::default().fg(palette.text)),
        ]));
    }

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block)
        .render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::StartupConfig;
    use crate::data::NewsTopic;
    use crate::map::CanvasEngine;
    use crate::theme::Theme;
    use std::time::Instant;

    fn content(buf: &Buffer) -> String {
        buf.content().iter().map(|cell| cell.symbol()).collect()
    }

    fn app() -> App {
        App::new(
            &StartupConfig::default(),
            Box::new(CanvasEngine),
            None,
            Instant::now(),
        )
    }

    #[test]
    fn test_intro_lists_sections_and_search_hint() {
        let area = Rect::new(0, 0, 70, 18);
        let mut buf = Buffer::empty(area);
        render_section(SectionKind::Home, &app(), area, &mut buf, &Theme::Light.palette());

        let text = content(&buf);
        assert!(text.contains("Weather News"));
        assert!(text.contains("to search for a city"));
        assert!(text.contains("Flood News"));
    }

    #[test]
    fn test_dispatch_to_news_section() {
        let area = Rect::new(0, 0, 60, 8);
        let mut buf = Buffer::empty(area);
        render_section(
            SectionKind::News(NewsTopic::Tornado),
            &app(),
            area,
            &mut buf,
            &Theme::Dark.palette(),
        );
        let text = content(&buf);
        assert!(text.contains("Tornado News"));
        assert!(text.contains("Loading news..."));
    }
}
