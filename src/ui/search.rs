//! Search page rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::weather::render_report;
use crate::search::{SearchPage, SearchState, MIN_QUERY_LEN};
use crate::theme::Palette;

pub fn render(frame: &mut Frame, page: &SearchPage, area: Rect, palette: &Palette) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    render_input(frame, page, chunks[0], palette);
    render_result(frame, page, chunks[1], palette);
    render_suggestions(frame, page, chunks[0], area, palette);
}

fn render_input(frame: &mut Frame, page: &SearchPage, area: Rect, palette: &Palette) {
    let input = page.typeahead.input();
    let line = if input.is_empty() {
        Line::from(Span::styled(
            "Enter city name",
            Style::default().fg(palette.muted),
        ))
    } else {
        Line::from(Span::styled(input, Style::default().fg(palette.text)))
    };

    let block = Block::default()
        .title(" Search ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent));
    frame.render_widget(Paragraph::new(line).block(block), area);

    let cursor_x = area.x + 1 + input.chars().count() as u16;
    if cursor_x < area.right().saturating_sub(1) {
        frame.set_cursor_position((cursor_x, area.y + 1));
    }
}

/// Dropdown under the input, drawn over the result area
fn render_suggestions(
    frame: &mut Frame,
    page: &SearchPage,
    input_area: Rect,
    page_area: Rect,
    palette: &Palette,
) {
    let suggestions = page.typeahead.suggestions();
    if suggestions.is_empty() {
        return;
    }

    let height = (suggestions.len() as u16 + 2).min(page_area.bottom().saturating_sub(input_area.bottom()));
    if height < 3 {
        return;
    }
    let area = Rect::new(input_area.x, input_area.bottom(), input_area.width, height);

    let items: Vec<ListItem> = suggestions
        .iter()
        .map(|s| ListItem::new(s.as_str()))
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.border)),
        )
        .style(Style::default().fg(palette.text))
        .highlight_style(
            Style::default()
                .bg(palette.highlight)
                .add_modifier(Modifier::BOLD),
        );
    let mut state = ListState::default().with_selected(page.typeahead.highlighted());

    frame.render_widget(Clear, area);
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_result(frame: &mut Frame, page: &SearchPage, area: Rect, palette: &Palette) {
    let muted = Style::default().fg(palette.muted);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border));

    let lines = match page.state() {
        SearchState::Loaded(report) => {
            let block = block.title(" Weather ");
            render_report(report, block, area, frame.buffer_mut(), palette);
            return;
        }
        SearchState::Empty => vec![
            Line::from(Span::styled("Type a city and press Enter.", muted)),
            Line::from(Span::styled(
                format!("Suggestions appear after {} letters.", MIN_QUERY_LEN),
                muted,
            )),
        ],
        SearchState::Invalid(error) => vec![
            Line::from(Span::styled(
                error.title(),
                Style::default().fg(palette.error).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(error.to_string(), Style::default().fg(palette.text))),
        ],
        SearchState::Loading { city } => vec![Line::from(Span::styled(
            format!("Loading weather for {}...", city),
            Style::default().fg(palette.accent),
        ))],
        SearchState::NotFound(message) => vec![
            Line::from(Span::styled(
                "City Not Found",
                Style::default().fg(palette.error).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(message.clone(), Style::default().fg(palette.text))),
            Line::from(""),
            Line::from(Span::styled("Ctrl+R Try Again", muted)),
        ],
        SearchState::Failed(message) => vec![
            Line::from(Span::styled(
                "Something went wrong",
                Style::default().fg(palette.error).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(message.clone(), Style::default().fg(palette.text))),
            Line::from(""),
            Line::from(Span::styled("Ctrl+R Try Again, or edit and press Enter", muted)),
        ],
    };

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(block),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::WeatherError;
    use crate::theme::Theme;
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::{Duration, Instant};

    fn draw(page: &SearchPage) -> String {
        let backend = TestBackend::new(60, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render(frame, page, area, &Theme::Light.palette());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_empty_page_shows_placeholder() {
        let content = draw(&SearchPage::new());
        assert!(content.contains("Enter city name"));
        assert!(content.contains("Type a city and press Enter."));
    }

    #[test]
    fn test_validation_notice() {
        let mut page = SearchPage::new();
        page.submit();
        let content = draw(&page);
        assert!(content.contains("Input Required"));
    }

    #[test]
    fn test_not_found_offers_retry() {
        let mut page = SearchPage::new();
        page.typeahead.set_input("Atlantis", Instant::now());
        let request = page.submit().unwrap();
        page.apply_result(request.generation, Err(WeatherError::NotFound("City not found".into())));

        let content = draw(&page);
        assert!(content.contains("City Not Found"));
        assert!(content.contains("Try Again"));
    }

    #[test]
    fn test_suggestions_dropdown() {
        let start = Instant::now();
        let mut page = SearchPage::new();
        page.typeahead.set_input("Tor", start);
        let request = page.typeahead.tick(start + Duration::from_secs(1)).unwrap();
        page.typeahead
            .apply_suggestions(request.generation, vec!["Toronto".into(), "Torino".into()]);

        let content = draw(&page);
        assert!(content.contains("Toronto"));
        assert!(content.contains("Torino"));
    }
}
