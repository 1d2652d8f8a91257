//! Help overlay showing all keybindings
//!
//! Renders a centered modal overlay with keyboard shortcuts.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::theme::Palette;

/// Renders the help overlay on top of the current view
pub fn render(frame: &mut Frame, palette: &Palette) {
    let area = frame.area();

    let overlay_area = centered_rect(54, 29, area);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let heading = |text: &'static str| {
        Line::from(Span::styled(text, Style::default().add_modifier(Modifier::BOLD)))
    };

    let lines = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        heading("Sections"),
        help_line("←/h, →/l", "Previous / next section", palette),
        help_line("1-7", "Jump to a section", palette),
        help_line("Home, End", "First / last section", palette),
        help_line("Wheel", "Scroll sections (Shift: pan)", palette),
        help_line("↑, ↓", "Choose city (Most Viewed)", palette),
        help_line("r", "Refresh section", palette),
        Line::from(""),
        heading("Weather Map"),
        help_line("[ ]", "Move through layers", palette),
        help_line("Space", "Toggle layer", palette),
        help_line("H J K L", "Pan", palette),
        help_line("c", "Recenter", palette),
        Line::from(""),
        heading("Search"),
        help_line("/ or s", "Open search", palette),
        help_line("↑, ↓", "Choose suggestion", palette),
        help_line("Enter", "Pick suggestion / search", palette),
        help_line("Ctrl+R", "Try again", palette),
        help_line("Esc", "Close suggestions / back", palette),
        Line::from(""),
        heading("Other"),
        help_line("d", "Toggle dark mode", palette),
        help_line("?", "Toggle this help", palette),
        help_line("q", "Quit application", palette),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent))
        .style(Style::default().bg(palette.background).fg(palette.text));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, overlay_area);
}

/// Creates a help line with key and description
fn help_line(key: &str, description: &str, palette: &Palette) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<12}", key), Style::default().fg(palette.accent)),
        Span::raw(description.to_string()),
    ])
}

/// Helper function to create a centered rect
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Length((area.height.saturating_sub(height)) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width.saturating_sub(width)) / 2),
            Constraint::Length(width),
            Constraint::Length((area.width.saturating_sub(width)) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_help_overlay_renders() {
        let backend = TestBackend::new(80, 30);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal
            .draw(|frame| {
                render(frame, &Theme::Light.palette());
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content().iter().map(|cell| cell.symbol()).collect();

        assert!(content.contains("Help"), "Should render help title");
        assert!(content.contains("Weather Map"), "Should show map section");
        assert!(content.contains("Toggle dark mode"));
        assert!(content.contains("Quit application"), "Last binding should not be clipped");
    }

    #[test]
    fn test_centered_rect_fits_small_area() {
        let area = Rect::new(0, 0, 20, 10);
        let rect = centered_rect(54, 29, area);
        assert!(rect.width <= area.width);
        assert!(rect.height <= area.height);
    }
}
