//! Weather report card
//!
//! Used by the "Most Viewed" and "Current Location" sections and by the
//! search page result.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use super::widgets::TemperatureSparkline;
use crate::app::Remote;
use crate::data::{condition_from_icon, WeatherReport};
use crate::theme::Palette;

/// Color for temperature (warmer = more red, cooler = more blue)
pub fn temperature_color(temp: f64) -> Color {
    if temp >= 30.0 {
        Color::Red
    } else if temp >= 25.0 {
        Color::LightRed
    } else if temp >= 20.0 {
        Color::Yellow
    } else if temp >= 10.0 {
        Color::Green
    } else if temp >= 0.0 {
        Color::Cyan
    } else {
        Color::Blue
    }
}

/// Renders a section backed by a weather fetch
pub fn render_remote(
    title: &str,
    remote: &Remote<Box<WeatherReport>>,
    area: Rect,
    buf: &mut Buffer,
    palette: &Palette,
) {
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border));

    match remote {
        Remote::Loaded(report) => render_report(report, block, area, buf, palette),
        Remote::Loading => {
            Paragraph::new(Line::from(Span::styled(
                "Loading weather data...",
                Style::default().fg(palette.accent),
            )))
            .block(block)
            .render(area, buf);
        }
        Remote::Empty => {
            Paragraph::new("No weather data available.")
                .style(Style::default().fg(palette.muted))
                .block(block)
                .render(area, buf);
        }
        Remote::Failed(message) => {
            Paragraph::new(vec![
                Line::from(Span::styled(
                    "Could not load weather data",
                    Style::default().fg(palette.error).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(message.clone(), Style::default().fg(palette.muted))),
                Line::from(""),
                Line::from(Span::styled("Press r to retry", Style::default().fg(palette.muted))),
            ])
            .wrap(Wrap { trim: true })
            .block(block)
            .render(area, buf);
        }
    }
}

/// Width of the city list in the "Most Viewed" section
const CITY_LIST_WIDTH: u16 = 30;

/// Renders the popular cities: a list on the left, the selected report on
/// the right
pub fn render_popular(
    title: &str,
    remote: &Remote<Vec<WeatherReport>>,
    selected: usize,
    area: Rect,
    buf: &mut Buffer,
    palette: &Palette,
) {
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border));

    let reports = match remote {
        Remote::Loaded(reports) => reports,
        Remote::Loading => {
            Paragraph::new(Line::from(Span::styled(
                "Loading popular locations...",
                Style::default().fg(palette.accent),
            )))
            .block(block)
            .render(area, buf);
            return;
        }
        Remote::Empty => {
            Paragraph::new("No weather data available.")
                .style(Style::default().fg(palette.muted))
                .block(block)
                .render(area, buf);
            return;
        }
        Remote::Failed(message) => {
            render_remote(title, &Remote::Failed(message.clone()), area, buf, palette);
            return;
        }
    };

    let inner = block.inner(area);
    block.render(area, buf);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(CITY_LIST_WIDTH), Constraint::Min(0)])
        .split(inner);

    let mut lines = Vec::with_capacity(reports.len() * 2);
    for (i, report) in reports.iter().enumerate() {
        let (marker, name_style) = if i == selected {
            (
                "▸ ",
                Style::default()
                    .fg(palette.accent)
                    .bg(palette.highlight)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            ("  ", Style::default().fg(palette.text))
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{}{}", marker, report.city_name), name_style),
            Span::styled(
                format!("  {:.0}°", report.temperature),
                Style::default().fg(temperature_color(report.temperature)),
            ),
        ]));
        lines.push(Line::from(Span::styled(
            format!("  {}", report.description),
            Style::default().fg(palette.muted),
        )));
    }
    Paragraph::new(lines).render(chunks[0], buf);

    if let Some(report) = reports.get(selected) {
        let detail = Block::default()
            .borders(Borders::LEFT)
            .border_style(Style::default().fg(palette.border));
        render_report(report, detail, chunks[1], buf, palette);
    }
}

/// Renders a full report: current conditions, hourly sparkline, daily list
pub fn render_report(
    report: &WeatherReport,
    block: Block<'_>,
    area: Rect,
    buf: &mut Buffer,
    palette: &Palette,
) {
    let inner = block.inner(area);
    block.render(area, buf);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(inner);

    render_current(report, chunks[0], buf, palette);
    render_hourly(report, chunks[1], buf, palette);
    render_daily(report, chunks[2], buf, palette);
}

fn render_current(report: &WeatherReport, area: Rect, buf: &mut Buffer, palette: &Palette) {
    let label = Style::default().fg(palette.muted);
    let value = Style::default().fg(palette.text);
    let glyph = condition_from_icon(&report.icon).glyph();

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                report.city_name.clone(),
                Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                report
                    .city_time
                    .as_deref()
                    .map(|t| format!("  {}", t))
                    .unwrap_or_default(),
                label,
            ),
        ]),
        Line::from(vec![
            Span::raw(format!("{} ", glyph)),
            Span::styled(
                format!("{:.1}°C", report.temperature),
                Style::default()
                    .fg(temperature_color(report.temperature))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", report.description), value),
        ]),
        Line::from(vec![
            Span::styled("Wind ", label),
            Span::styled(format!("{:.1} m/s", report.wind_speed), value),
            Span::styled("   Humidity ", label),
            Span::styled(format!("{:.0}%", report.humidity), value),
        ]),
    ];

    if let Some(pressure) = report.pressure {
        lines.push(Line::from(vec![
            Span::styled("Pressure ", label),
            Span::styled(format!("{:.0} hPa", pressure), value),
        ]));
    }

    if report.sunrise.is_some() || report.sunset.is_some() {
        lines.push(Line::from(vec![
            Span::styled("Sunrise ", label),
            Span::styled(report.sunrise.clone().unwrap_or_else(|| "N/A".into()), value),
            Span::styled("   Sunset ", label),
            Span::styled(report.sunset.clone().unwrap_or_else(|| "N/A".into()), value),
        ]));
    }

    Paragraph::new(lines).render(area, buf);
}

fn render_hourly(report: &WeatherReport, area: Rect, buf: &mut Buffer, palette: &Palette) {
    if report.hourly_forecast.is_empty() || area.height < 2 {
        return;
    }

    let temperatures: Vec<f64> = report
        .hourly_forecast
        .iter()
        .map(|hour| hour.temperature)
        .collect();
    let low = temperatures.iter().copied().fold(f64::INFINITY, f64::min);
    let high = temperatures.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    buf.set_string(
        area.x,
        area.y,
        format!("Today  {:.0}°C … {:.0}°C", low, high),
        Style::default().fg(palette.muted),
    );

    let spark_area = Rect::new(area.x, area.y + 1, area.width, 1);
    let mut sparkline = TemperatureSparkline::new(&temperatures)
        .style(Style::default().fg(palette.accent))
        .marker_style(Style::default().fg(Color::Yellow));
    if let Some(hour) = current_hour_index(report) {
        sparkline = sparkline.current_position(hour);
    }
    sparkline.render(spark_area, buf);
}

/// Index of the forecast hour matching the city's local time
fn current_hour_index(report: &WeatherReport) -> Option<usize> {
    // city_time looks like "2024-07-15 14:02:11"
    let time = report.city_time.as_deref()?;
    let hour = time.split_whitespace().nth(1)?.get(..2)?;
    report
        .hourly_forecast
        .iter()
        .position(|h| h.time.get(..2) == Some(hour))
}

fn render_daily(report: &WeatherReport, area: Rect, buf: &mut Buffer, palette: &Palette) {
    let lines: Vec<Line> = report
        .daily_forecast
        .iter()
        .map(|day| {
            Line::from(vec![
                Span::styled(
                    day.date.format("%a %d %b").to_string(),
                    Style::default().fg(palette.muted),
                ),
                Span::raw(format!("  {} ", condition_from_icon(&day.icon).glyph())),
                Span::styled(
                    format!("{:>5.1}°", day.maxtemp),
                    Style::default().fg(temperature_color(day.maxtemp)),
                ),
                Span::styled(
                    format!(" / {:>5.1}°", day.mintemp),
                    Style::default().fg(temperature_color(day.mintemp)),
                ),
                Span::styled(format!("  {}", day.condition), Style::default().fg(palette.text)),
            ])
        })
        .collect();

    Paragraph::new(lines).render(area, buf);
}
