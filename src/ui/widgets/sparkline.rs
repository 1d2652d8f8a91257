//! Temperature sparkline widget for the hourly forecast

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Block characters for different temperatures (8 levels)
const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// One block per hour, scaled between the day's lowest and highest temperature
pub struct TemperatureSparkline<'a> {
    temperatures: &'a [f64],
    min: f64,
    max: f64,
    /// Highlighted hour (index into temperatures)
    current_position: Option<usize>,
    style: Style,
    marker_style: Style,
}

impl<'a> TemperatureSparkline<'a> {
    pub fn new(temperatures: &'a [f64]) -> Self {
        let min = temperatures.iter().copied().fold(f64::INFINITY, f64::min);
        let max = temperatures.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self {
            temperatures,
            min,
            max,
            current_position: None,
            style: Style::default().fg(Color::Cyan),
            marker_style: Style::default().fg(Color::Yellow),
        }
    }

    pub fn current_position(mut self, pos: usize) -> Self {
        self.current_position = Some(pos);
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn marker_style(mut self, style: Style) -> Self {
        self.marker_style = style;
        self
    }

    fn temperature_to_block(&self, temperature: f64) -> char {
        let span = self.max - self.min;
        // A flat day draws a flat middle line.
        if !span.is_finite() || span <= f64::EPSILON {
            return BLOCKS[3];
        }
        let normalized = ((temperature - self.min) / span).clamp(0.0, 1.0);
        let index = ((normalized * 7.0).round() as usize).min(7);
        BLOCKS[index]
    }
}

impl<'a> Widget for TemperatureSparkline<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let width = area.width as usize;

        for (i, temperature) in self.temperatures.iter().take(width).enumerate() {
            let block = self.temperature_to_block(*temperature);
            let x = area.x + i as u16;
            let y = area.y;

            let style = if self.current_position == Some(i) {
                self.marker_style
            } else {
                self.style
            };

            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_char(block).set_style(style);
            }
        }
    }
}
