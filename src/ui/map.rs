//! Weather map section rendering
//!
//! The map is drawn with a ratatui canvas: coastlines over the base layer
//! color, the tile under the center tinted with the highlighted overlay, and
//! a side panel with the layer switcher and the legend.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Map, MapResolution, Rectangle},
        Block, Borders, Paragraph, Widget, Wrap,
    },
};

use crate::map::{
    visible_span, BaseLayer, MapSnapshot, MapState, MapView, TileCoord, TileStatus,
    WeatherOverlay,
};
use crate::theme::Palette;

const PANEL_WIDTH: u16 = 28;

fn base_color(base: BaseLayer) -> Color {
    match base {
        BaseLayer::Light => Color::Rgb(236, 236, 230),
        BaseLayer::Dark => Color::Rgb(24, 26, 33),
    }
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(r, g, b)
}

pub fn render(map: &MapView, area: Rect, buf: &mut Buffer, palette: &Palette) {
    let block = Block::default()
        .title(" Weather Map ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border));

    let Some(snapshot) = map.snapshot() else {
        render_placeholder(map, block, area, buf, palette);
        return;
    };

    let inner = block.inner(area);
    block.render(area, buf);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(PANEL_WIDTH)])
        .split(inner);

    render_canvas(map, &snapshot, chunks[0], buf, palette);
    render_panel(map, &snapshot, chunks[1], buf, palette);
}

fn render_placeholder(map: &MapView, block: Block<'_>, area: Rect, buf: &mut Buffer, palette: &Palette) {
    let muted = Style::default().fg(palette.muted);
    let lines = match map.state() {
        MapState::Unavailable(reason) => vec![
            Line::from(Span::styled(
                "Weather map unavailable",
                Style::default().fg(palette.error).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(reason.clone(), muted)),
        ],
        _ if map.is_loading() => vec![Line::from(Span::styled(
            "Locating you...",
            Style::default().fg(palette.accent),
        ))],
        _ => vec![Line::from(Span::styled("Map paused", muted))],
    };

    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(block)
        .render(area, buf);
}

fn render_canvas(
    map: &MapView,
    snapshot: &MapSnapshot,
    area: Rect,
    buf: &mut Buffer,
    palette: &Palette,
) {
    let center = snapshot.center;
    let (lon_span, lat_span) = visible_span(snapshot.zoom);
    let base = snapshot
        .base_layers
        .first()
        .copied()
        .unwrap_or(BaseLayer::Light);

    let tile = TileCoord::containing(center.latitude, center.longitude, snapshot.zoom);
    let (west, south, east, north) = tile.bounds();
    let tint = map.legend().map(|overlay| {
        let legend = overlay.legend();
        let (low, high) = legend.range();
        rgb(legend.color_at((low + high) / 2.0))
    });
    let land = palette.map_land;
    let marker = palette.error;

    Canvas::default()
        .marker(Marker::Braille)
        .background_color(base_color(base))
        .x_bounds([center.longitude - lon_span / 2.0, center.longitude + lon_span / 2.0])
        .y_bounds([center.latitude - lat_span / 2.0, center.latitude + lat_span / 2.0])
        .paint(|ctx| {
            ctx.draw(&Map {
                color: land,
                resolution: MapResolution::High,
            });
            ctx.layer();
            if let Some(color) = tint {
                ctx.draw(&Rectangle {
                    x: west,
                    y: south,
                    width: east - west,
                    height: north - south,
                    color,
                });
            }
            ctx.print(
                center.longitude,
                center.latitude,
                Span::styled("◉", Style::default().fg(marker)),
            );
        })
        .render(area, buf);
}

fn tile_glyph(status: Option<&TileStatus>) -> Span<'static> {
    match status {
        Some(TileStatus::Loading) => Span::styled(" …", Style::default().fg(Color::Yellow)),
        Some(TileStatus::Loaded(_)) => Span::styled(" ✓", Style::default().fg(Color::Green)),
        Some(TileStatus::Failed(_)) => Span::styled(" ✗", Style::default().fg(Color::Red)),
        None => Span::raw(""),
    }
}

fn render_panel(
    map: &MapView,
    snapshot: &MapSnapshot,
    area: Rect,
    buf: &mut Buffer,
    palette: &Palette,
) {
    let heading = Style::default().fg(palette.text).add_modifier(Modifier::BOLD);
    let muted = Style::default().fg(palette.muted);

    let mut lines = vec![Line::from(Span::styled("Layers", heading))];
    for (i, overlay) in WeatherOverlay::all().iter().enumerate() {
        let cursor = if i == map.switcher_cursor() { "▸" } else { " " };
        let check = if snapshot.overlays.contains(overlay) {
            "[x]"
        } else {
            "[ ]"
        };
        let style = if i == map.switcher_cursor() {
            Style::default().fg(palette.accent)
        } else {
            Style::default().fg(palette.text)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{} {} {}", cursor, check, overlay.label()), style),
            tile_glyph(map.tile_status(*overlay)),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Legend", heading)));
    match map.legend() {
        Some(overlay) => {
            let legend = overlay.legend();
            let (low, high) = legend.range();
            lines.push(Line::from(Span::styled(
                format!("{} ({})", overlay.label(), legend.unit),
                Style::default().fg(palette.text),
            )));

            let steps = area.width.saturating_sub(2).max(1) as usize;
            let bar: Vec<Span> = (0..steps)
                .map(|i| {
                    let t = i as f64 / (steps.max(2) - 1) as f64;
                    let value = low + (high - low) * t;
                    Span::styled("█", Style::default().fg(rgb(legend.color_at(value))))
                })
                .collect();
            lines.push(Line::from(bar));
            lines.push(Line::from(Span::styled(
                format!("{} … {} {}", low, high, legend.unit),
                muted,
            )));
        }
        None => lines.push(Line::from(Span::styled("No overlay shown", muted))),
    }

    lines.push(Line::from(""));
    let base = match snapshot.base_layers.first() {
        Some(BaseLayer::Dark) => "dark",
        _ => "light",
    };
    lines.push(Line::from(Span::styled(format!("Base: {}", base), muted)));
    lines.push(Line::from(Span::styled(
        format!(
            "{:.2}, {:.2}  z{}",
            snapshot.center.latitude, snapshot.center.longitude, snapshot.zoom
        ),
        muted,
    )));

    Paragraph::new(lines).render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::CanvasEngine;
    use crate::theme::Theme;

    fn content(buf: &Buffer) -> String {
        buf.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_active_map_shows_switcher_and_legend() {
        let mut map = MapView::new(Box::new(CanvasEngine), Theme::Dark);
        map.center_resolved(None);
        map.set_active(true);

        let area = Rect::new(0, 0, 80, 20);
        let mut buf = Buffer::empty(area);
        render(&map, area, &mut buf, &Theme::Dark.palette());

        let text = content(&buf);
        assert!(text.contains("Layers"));
        assert!(text.contains("[x] Temperature"));
        assert!(text.contains("[ ] Wind Speed"));
        assert!(text.contains("Temperature (°C)"));
        assert!(text.contains("Base: dark"));
    }

    #[test]
    fn test_inactive_map_shows_placeholder() {
        let map = MapView::new(Box::new(CanvasEngine), Theme::Light);
        let area = Rect::new(0, 0, 60, 10);
        let mut buf = Buffer::empty(area);
        render(&map, area, &mut buf, &Theme::Light.palette());
        assert!(content(&buf).contains("Locating you..."));
    }
}
