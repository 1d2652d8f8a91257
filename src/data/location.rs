//! One-shot geolocation lookup
//!
//! Resolves the machine's approximate position from its public IP address.
//! The lookup is best effort: it is bounded by a timeout and every failure
//! is reported as a [`GeolocationError`] so the caller can fall back to
//! [`Coordinate::DEFAULT`].

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::Coordinate;

/// IP geolocation service
const DEFAULT_ENDPOINT: &str = "https://ipapi.co/json/";

/// Upper bound for the whole lookup
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur while locating the user
#[derive(Debug, Error)]
pub enum GeolocationError {
    #[error("Geolocation timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Failed to parse location: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The service answered without usable coordinates (rate limit, private IP, ...)
    #[error("Location unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Deserialize)]
struct LocationResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

/// Looks up the current position once
#[derive(Debug, Clone)]
pub struct Geolocator {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl Default for Geolocator {
    fn default() -> Self {
        Self::new()
    }
}

impl Geolocator {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Use a different lookup service
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Bound the lookup by a different timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Request the current position, giving up after the configured timeout
    pub async fn locate(&self) -> Result<Coordinate, GeolocationError> {
        debug!(endpoint = %self.endpoint, "requesting position");

        let lookup = async {
            let response = self.client.get(&self.endpoint).send().await?;
            let text = response.text().await?;
            parse_location(&text)
        };

        match tokio::time::timeout(self.timeout, lookup).await {
            Ok(result) => result,
            Err(_) => Err(GeolocationError::Timeout(self.timeout)),
        }
    }

    /// Request the current position, falling back to the default coordinate
    pub async fn locate_or_default(&self) -> Coordinate {
        match self.locate().await {
            Ok(coordinate) => {
                info!(
                    latitude = coordinate.latitude,
                    longitude = coordinate.longitude,
                    "position resolved"
                );
                coordinate
            }
            Err(e) => {
                warn!(error = %e, "geolocation failed, using default position");
                Coordinate::DEFAULT
            }
        }
    }
}

fn parse_location(body: &str) -> Result<Coordinate, GeolocationError> {
    let response: LocationResponse = serde_json::from_str(body)?;

    if response.error {
        return Err(GeolocationError::Unavailable(
            response.reason.unwrap_or_else(|| "unknown reason".to_string()),
        ));
    }

    match (response.latitude, response.longitude) {
        (Some(latitude), Some(longitude)) => {
            let coordinate = Coordinate::new(latitude, longitude);
            if coordinate.is_valid() {
                Ok(coordinate)
            } else {
                Err(GeolocationError::Unavailable(format!(
                    "out of range: {}, {}",
                    latitude, longitude
                )))
            }
        }
        _ => Err(GeolocationError::Unavailable(
            "missing coordinates".to_string(),
        )),
    }
}
