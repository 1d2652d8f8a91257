//! Core data models for the weather news client
//!
//! This module contains the types returned by the weather news API: weather
//! reports with hourly and daily forecasts, news articles, and coordinates.

pub mod location;
pub mod news;
pub mod weather;

pub use location::{GeolocationError, Geolocator};
pub use news::{NewsClient, NewsError};
pub use weather::{condition_from_icon, WeatherClient, WeatherError};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Toronto, used whenever the user's position cannot be determined
    pub const DEFAULT: Coordinate = Coordinate {
        latitude: 43.6532,
        longitude: -79.3832,
    };

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns true if both components are finite and inside the valid ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Weather report for a single city as returned by `get_weather_data`
/// and `get_user_location`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// City the report is for
    pub city_name: String,
    /// Short condition text (e.g. "light rain")
    #[serde(default)]
    pub description: String,
    /// Current temperature in Celsius
    #[serde(deserialize_with = "number_or_string")]
    pub temperature: f64,
    /// Icon code for the current condition (e.g. "10d")
    #[serde(default)]
    pub icon: String,
    /// Wind speed in m/s
    #[serde(default)]
    pub wind_speed: f64,
    /// Relative humidity percentage
    #[serde(default)]
    pub humidity: f64,
    #[serde(default)]
    pub hourly_forecast: Vec<HourlyForecast>,
    /// Sea-level pressure in hPa
    #[serde(default)]
    pub pressure: Option<f64>,
    /// Local sunrise time ("HH:MM" or "N/A")
    #[serde(default)]
    pub sunrise: Option<String>,
    /// Local sunset time ("HH:MM" or "N/A")
    #[serde(default)]
    pub sunset: Option<String>,
    /// Local wall-clock time in the city
    #[serde(default)]
    pub city_time: Option<String>,
    /// UTC offset of the city in seconds
    #[serde(default)]
    pub timezone: Option<i64>,
    #[serde(default)]
    pub daily_forecast: Vec<DailyForecast>,
}

/// Forecast for a single hour of the current day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    /// Hour label ("HH:MM")
    pub time: String,
    #[serde(deserialize_with = "number_or_string")]
    pub temperature: f64,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Forecast summary for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub maxtemp: f64,
    pub mintemp: f64,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub icon: String,
}

/// A single news article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    /// Some sources publish articles without a summary
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
}

/// News categories served by `get_news`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsTopic {
    Tornado,
    Storm,
    Flood,
}

impl NewsTopic {
    /// All topics in display order
    pub fn all() -> &'static [NewsTopic] {
        &[NewsTopic::Tornado, NewsTopic::Storm, NewsTopic::Flood]
    }

    /// Value sent as the `query` parameter
    pub fn query(&self) -> &'static str {
        match self {
            NewsTopic::Tornado => "tornado",
            NewsTopic::Storm => "storm",
            NewsTopic::Flood => "flood",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NewsTopic::Tornado => "Tornado News",
            NewsTopic::Storm => "Storm News",
            NewsTopic::Flood => "Flood News",
        }
    }
}

/// Coarse weather condition used to pick a glyph for an icon code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherCondition {
    Clear,
    PartlyCloudy,
    Cloudy,
    Rain,
    Showers,
    Thunderstorm,
    Snow,
    Fog,
}

impl WeatherCondition {
    pub fn glyph(&self) -> &'static str {
        match self {
            WeatherCondition::Clear => "\u{2600}",        // ☀
            WeatherCondition::PartlyCloudy => "\u{26C5}", // ⛅
            WeatherCondition::Cloudy => "\u{2601}",       // ☁
            WeatherCondition::Rain => "\u{1F327}",        // 🌧
            WeatherCondition::Showers => "\u{1F326}",     // 🌦
            WeatherCondition::Thunderstorm => "\u{26C8}", // ⛈
            WeatherCondition::Snow => "\u{2744}",         // ❄
            WeatherCondition::Fog => "\u{1F32B}",         // 🌫
        }
    }
}

/// Accepts temperatures sent either as JSON numbers or numeric strings.
fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s
            .trim()
            .trim_end_matches("°C")
            .trim()
            .parse::<f64>()
            .map_err(serde::de::Error::custom),
    }
}
