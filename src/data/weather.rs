//! Weather API client
//!
//! This module fetches weather reports, search suggestions and the weather
//! for the user's resolved location from the weather news API, and maps its
//! failure shapes onto [`WeatherError`].

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::{WeatherCondition, WeatherReport};

/// Upper bound for a single API request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Message shown when the API gives no reason for a 404
const DEFAULT_NOT_FOUND: &str = "City not found";

/// Errors that can occur when fetching weather data
#[derive(Debug, Error)]
pub enum WeatherError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The city could not be resolved
    #[error("{0}")]
    NotFound(String),

    /// The server answered with a non-success status
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
}

impl WeatherError {
    /// Returns true for the "city unresolvable" class of errors
    pub fn is_not_found(&self) -> bool {
        matches!(self, WeatherError::NotFound(_))
    }
}

/// Error body returned by the API on failure
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error_message: Option<String>,
    error: Option<String>,
}

/// Response of `search_suggestions`
#[derive(Debug, Deserialize)]
struct SuggestionsResponse {
    success: bool,
    #[serde(default)]
    suggestions: Vec<String>,
}

/// Client for the weather endpoints of the weather news API
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
}

impl WeatherClient {
    /// Create a new WeatherClient talking to the given API root
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a new WeatherClient with a custom HTTP client
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the weather report for a city
    ///
    /// # Returns
    /// * `Ok(WeatherReport)` - Weather for the city
    /// * `Err(WeatherError::NotFound)` - On a 404 or an `error_message` body
    /// * `Err(WeatherError)` - If the request or parsing fails
    pub async fn fetch_weather(&self, city_name: &str) -> Result<WeatherReport, WeatherError> {
        let url = format!("{}/api/get_weather_data/", self.base_url);
        debug!(city = city_name, "fetching weather");

        let response = self
            .client
            .get(&url)
            .query(&[("city_name", city_name)])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        parse_weather_response(status, &text)
    }

    /// Fetch the weather for the location the server resolves for this client
    pub async fn fetch_user_location(&self) -> Result<WeatherReport, WeatherError> {
        let url = format!("{}/api/get_user_location/", self.base_url);
        debug!("fetching weather for user location");

        let response = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        parse_weather_response(status, &text)
    }

    /// Fetch city name suggestions for a partial query
    ///
    /// A `{success: false}` answer yields an empty list.
    pub async fn search_suggestions(&self, query: &str) -> Result<Vec<String>, WeatherError> {
        let url = format!("{}/api/search_suggestions/", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("city_name", query)])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(server_error(status, &text));
        }
        parse_suggestions(&text)
    }
}

/// Classifies a `get_weather_data` response into a report or an error
fn parse_weather_response(status: StatusCode, body: &str) -> Result<WeatherReport, WeatherError> {
    if status == StatusCode::NOT_FOUND {
        let message = error_message(body).unwrap_or_else(|| DEFAULT_NOT_FOUND.to_string());
        return Err(WeatherError::NotFound(message));
    }

    if !status.is_success() {
        return Err(server_error(status, body));
    }

    // A 200 carrying an error body is how the legacy endpoints report
    // unresolvable cities.
    if let Some(message) = error_message(body) {
        return Err(WeatherError::NotFound(message));
    }

    Ok(serde_json::from_str(body)?)
}

/// Parses a `search_suggestions` body
fn parse_suggestions(body: &str) -> Result<Vec<String>, WeatherError> {
    let response: SuggestionsResponse = serde_json::from_str(body)?;
    if !response.success {
        debug!("suggestion lookup rejected by server");
        return Ok(Vec::new());
    }
    Ok(response.suggestions)
}

fn server_error(status: StatusCode, body: &str) -> WeatherError {
    let message = error_message(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unexpected response")
            .to_string()
    });
    warn!(status = status.as_u16(), %message, "weather API error");
    WeatherError::Server {
        status: status.as_u16(),
        message,
    }
}

fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed.error_message.or(parsed.error)
}

/// Map an icon reference to a coarse condition
///
/// Accepts both OpenWeatherMap codes ("01d", "10n") used for current
/// conditions and weatherapi.com icon URLs (".../day/113.png") used in
/// forecasts. Unknown icons map to Cloudy.
pub fn condition_from_icon(icon: &str) -> WeatherCondition {
    let name = icon.rsplit('/').next().unwrap_or(icon);
    let stem = name.trim_end_matches(".png");

    if let Ok(code) = stem.parse::<u16>() {
        return weatherapi_code_to_condition(code);
    }

    match stem.get(..2) {
        Some("01") => WeatherCondition::Clear,
        Some("02") => WeatherCondition::PartlyCloudy,
        Some("03") | Some("04") => WeatherCondition::Cloudy,
        Some("09") => WeatherCondition::Showers,
        Some("10") => WeatherCondition::Rain,
        Some("11") => WeatherCondition::Thunderstorm,
        Some("13") => WeatherCondition::Snow,
        Some("50") => WeatherCondition::Fog,
        _ => WeatherCondition::Cloudy,
    }
}

/// Map weatherapi.com condition icon numbers to a condition
///
/// - 113: Sunny / clear
/// - 116: Partly cloudy
/// - 119, 122: Cloudy / overcast
/// - 143, 248, 260: Mist / fog
/// - 176, 263-314, 353-359: Rain and drizzle
/// - 182-185, 317-320, 362-365: Sleet and freezing rain
/// - 179, 227, 230, 323-350, 368-377: Snow and ice
/// - 200, 386-395: Thunder
fn weatherapi_code_to_condition(code: u16) -> WeatherCondition {
    match code {
        113 => WeatherCondition::Clear,
        116 => WeatherCondition::PartlyCloudy,
        119 | 122 => WeatherCondition::Cloudy,
        143 | 248 | 260 => WeatherCondition::Fog,
        176 | 263..=314 | 353..=359 => WeatherCondition::Rain,
        182..=185 | 317..=320 | 362..=365 => WeatherCondition::Showers,
        179 | 227 | 230 | 323..=350 | 368..=377 => WeatherCondition::Snow,
        200 | 386..=395 => WeatherCondition::Thunderstorm,
        _ => WeatherCondition::Cloudy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_RESPONSE: &str = r#"{
        "city_name": "Toronto",
        "temperature": 21.4,
        "description": "clear sky",
        "icon": "01d",
        "wind_speed": 3.6,
        "humidity": 40,
        "hourly_forecast": []
    }"#;

    #[test]
    fn test_parse_valid_response() {
        let report = parse_weather_response(StatusCode::OK, VALID_RESPONSE).unwrap();
        assert_eq!(report.city_name, "Toronto");
        assert_eq!(report.icon, "01d");
    }

    #[test]
    fn test_404_is_not_found() {
        let err = parse_weather_response(StatusCode::NOT_FOUND, r#"{"error_message": "City Not Found"}"#)
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "City Not Found");
    }

    #[test]
    fn test_404_without_body_uses_default_message() {
        let err = parse_weather_response(StatusCode::NOT_FOUND, "<html>nope</html>").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), DEFAULT_NOT_FOUND);
    }

    #[test]
    fn test_error_message_on_success_status_is_not_found() {
        let err = parse_weather_response(StatusCode::OK, r#"{"error_message": "Unknown city"}"#)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_503_is_server_error() {
        let err = parse_weather_response(
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"error": "Service temporarily unavailable, try again later."}"#,
        )
        .unwrap_err();

        match err {
            WeatherError::Server { status, message } => {
                assert_eq!(status, 503);
                assert!(message.contains("temporarily unavailable"));
            }
            other => panic!("expected server error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_success_body_is_parse_error() {
        let err = parse_weather_response(StatusCode::OK, "not json").unwrap_err();
        assert!(matches!(err, WeatherError::ParseError(_)));
    }

    #[test]
    fn test_parse_suggestions() {
        let body = r#"{"success": true, "suggestions": ["Toronto", "Torino"]}"#;
        assert_eq!(parse_suggestions(body).unwrap(), vec!["Toronto", "Torino"]);
    }

    #[test]
    fn test_parse_rejected_suggestions_is_empty() {
        assert!(parse_suggestions(r#"{"success": false}"#).unwrap().is_empty());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = WeatherClient::new("http://localhost:8000/");
        assert_eq!(client.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_condition_from_owm_codes() {
        assert_eq!(condition_from_icon("01d"), WeatherCondition::Clear);
        assert_eq!(condition_from_icon("02n"), WeatherCondition::PartlyCloudy);
        assert_eq!(condition_from_icon("04d"), WeatherCondition::Cloudy);
        assert_eq!(condition_from_icon("09d"), WeatherCondition::Showers);
        assert_eq!(condition_from_icon("10n"), WeatherCondition::Rain);
        assert_eq!(condition_from_icon("11d"), WeatherCondition::Thunderstorm);
        assert_eq!(condition_from_icon("13d"), WeatherCondition::Snow);
        assert_eq!(condition_from_icon("50d"), WeatherCondition::Fog);
    }

    #[test]
    fn test_condition_from_weatherapi_urls() {
        assert_eq!(
            condition_from_icon("//cdn.weatherapi.com/weather/64x64/day/113.png"),
            WeatherCondition::Clear
        );
        assert_eq!(
            condition_from_icon("//cdn.weatherapi.com/weather/64x64/night/296.png"),
            WeatherCondition::Rain
        );
        assert_eq!(
            condition_from_icon("//cdn.weatherapi.com/weather/64x64/day/389.png"),
            WeatherCondition::Thunderstorm
        );
        assert_eq!(
            condition_from_icon("//cdn.weatherapi.com/weather/64x64/day/338.png"),
            WeatherCondition::Snow
        );
    }

    #[test]
    fn test_unknown_icon_defaults_to_cloudy() {
        assert_eq!(condition_from_icon(""), WeatherCondition::Cloudy);
        assert_eq!(condition_from_icon("zz"), WeatherCondition::Cloudy);
    }
}
