//! Map layers and legends
//!
//! Base layers provide the background imagery and come in a light and a dark
//! variant. Weather overlays are semi-transparent tile layers served by the
//! `/api/map_tile/{layer}/{z}/{x}/{y}/` proxy.

use crate::theme::Theme;

/// Background imagery variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseLayer {
    Light,
    Dark,
}

impl BaseLayer {
    pub fn for_theme(theme: Theme) -> BaseLayer {
        match theme {
            Theme::Light => BaseLayer::Light,
            Theme::Dark => BaseLayer::Dark,
        }
    }

    /// Tile template of the background imagery
    pub fn url_template(&self) -> &'static str {
        match self {
            BaseLayer::Light => "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}.png",
            BaseLayer::Dark => "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}.png",
        }
    }
}

/// Weather overlay tile layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherOverlay {
    Temperature,
    Precipitation,
    Wind,
    Clouds,
    Pressure,
}

/// Opacity the overlays are drawn with
pub const OVERLAY_OPACITY: f64 = 0.6;

impl WeatherOverlay {
    /// Switcher order
    pub fn all() -> &'static [WeatherOverlay] {
        &[
            WeatherOverlay::Temperature,
            WeatherOverlay::Precipitation,
            WeatherOverlay::Wind,
            WeatherOverlay::Clouds,
            WeatherOverlay::Pressure,
        ]
    }

    /// Overlay attached when a map is created
    pub fn default_overlay() -> WeatherOverlay {
        WeatherOverlay::Temperature
    }

    /// Layer name in the tile proxy path
    pub fn layer_name(&self) -> &'static str {
        match self {
            WeatherOverlay::Temperature => "temp_new",
            WeatherOverlay::Precipitation => "precipitation_new",
            WeatherOverlay::Wind => "wind_new",
            WeatherOverlay::Clouds => "clouds_new",
            WeatherOverlay::Pressure => "pressure_new",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WeatherOverlay::Temperature => "Temperature",
            WeatherOverlay::Precipitation => "Precipitation",
            WeatherOverlay::Wind => "Wind Speed",
            WeatherOverlay::Clouds => "Clouds",
            WeatherOverlay::Pressure => "Pressure",
        }
    }

    /// Scale shown in the legend while this overlay is highlighted
    pub fn legend(&self) -> Legend {
        match self {
            WeatherOverlay::Temperature => Legend {
                unit: "°C",
                stops: &[
                    (-40.0, (130, 22, 146)),
                    (-20.0, (32, 140, 236)),
                    (0.0, (35, 221, 221)),
                    (20.0, (252, 128, 20)),
                    (40.0, (194, 20, 20)),
                ],
            },
            WeatherOverlay::Precipitation => Legend {
                unit: "mm/h",
                stops: &[
                    (0.0, (225, 200, 100)),
                    (1.0, (200, 150, 150)),
                    (10.0, (120, 120, 190)),
                    (140.0, (20, 20, 255)),
                ],
            },
            WeatherOverlay::Wind => Legend {
                unit: "m/s",
                stops: &[
                    (0.0, (255, 255, 255)),
                    (15.0, (176, 128, 226)),
                    (50.0, (116, 76, 172)),
                    (200.0, (13, 17, 38)),
                ],
            },
            WeatherOverlay::Clouds => Legend {
                unit: "%",
                stops: &[
                    (0.0, (255, 255, 255)),
                    (50.0, (210, 210, 210)),
                    (100.0, (130, 130, 130)),
                ],
            },
            WeatherOverlay::Pressure => Legend {
                unit: "hPa",
                stops: &[
                    (950.0, (0, 115, 255)),
                    (1000.0, (176, 247, 32)),
                    (1030.0, (240, 184, 0)),
                    (1070.0, (198, 0, 0)),
                ],
            },
        }
    }

    /// Proxy path of one tile of this overlay
    pub fn tile_path(&self, tile: TileCoord) -> String {
        format!(
            "/api/map_tile/{}/{}/{}/{}/",
            self.layer_name(),
            tile.z,
            tile.x,
            tile.y
        )
    }
}

/// Color scale of an overlay: value stops with RGB colors, ascending
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Legend {
    pub unit: &'static str,
    pub stops: &'static [(f64, (u8, u8, u8))],
}

impl Legend {
    /// Color at `value`, interpolated between neighbouring stops
    pub fn color_at(&self, value: f64) -> (u8, u8, u8) {
        let Some(&(first_value, first_color)) = self.stops.first() else {
            return (0, 0, 0);
        };
        if value <= first_value {
            return first_color;
        }

        for pair in self.stops.windows(2) {
            let (low, low_color) = pair[0];
            let (high, high_color) = pair[1];
            if value <= high {
                let t = (value - low) / (high - low);
                return (
                    lerp(low_color.0, high_color.0, t),
                    lerp(low_color.1, high_color.1, t),
                    lerp(low_color.2, high_color.2, t),
                );
            }
        }

        self.stops[self.stops.len() - 1].1
    }

    /// Lowest and highest value on the scale
    pub fn range(&self) -> (f64, f64) {
        match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (first.0, last.0),
            _ => (0.0, 0.0),
        }
    }
}

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8
}

/// Slippy-map tile address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    /// Tile containing a point, using the Web Mercator tiling scheme
    pub fn containing(latitude: f64, longitude: f64, zoom: u8) -> TileCoord {
        let n = 2f64.powi(zoom as i32);
        // Web Mercator is undefined at the poles.
        let lat = latitude.clamp(-85.0511, 85.0511).to_radians();

        let x = ((longitude + 180.0) / 360.0 * n).floor();
        let y = ((1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * n).floor();

        let max = n - 1.0;
        TileCoord {
            z: zoom,
            x: x.clamp(0.0, max) as u32,
            y: y.clamp(0.0, max) as u32,
        }
    }

    /// Longitude/latitude bounds of the tile: (west, south, east, north)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let n = 2f64.powi(self.z as i32);
        let lon = |x: f64| x / n * 360.0 - 180.0;
        let lat = |y: f64| {
            let merc = std::f64::consts::PI * (1.0 - 2.0 * y / n);
            merc.sinh().atan().to_degrees()
        };
        let x = self.x as f64;
        let y = self.y as f64;
        (lon(x), lat(y + 1.0), lon(x + 1.0), lat(y))
    }
}
